//! HTTP client for the UniSphere report, dashboard and chat endpoints.

use std::time::Duration;

use futures::future::{try_join, try_join_all};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, info};
use unisphere_core::model::RecordId;
use unisphere_core::{
    AssessmentView, ChatReply, ChatRequest, ChatSession, ComparisonData, ModelError, ReportView,
    RfpBids, RfpDetail, RiskAssessment, SentimentAnalysis, assessment_view, build_report,
};

/// Notification shown for any report load failure.
pub const REPORT_LOAD_FAILED: &str = "Failed to load report data. Please try again.";

/// Notification shown for any dashboard load failure.
pub const DASHBOARD_LOAD_FAILED: &str = "Failed to load dashboard data. Please try again.";

/// Notification shown for any risk or sentiment load failure.
pub const ASSESSMENT_LOAD_FAILED: &str = "Failed to load bid assessment. Please try again.";

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Both halves of a report, fetched together.
#[derive(Debug, Clone)]
pub struct ReportData {
    pub rfp: RfpDetail,
    pub comparison: ComparisonData,
}

impl ReportData {
    pub fn view(&self) -> ReportView {
        build_report(&self.rfp, &self.comparison)
    }
}

/// Client for the UniSphere JSON API.
pub struct ReportClient {
    client: reqwest::Client,
    base_url: String,
}

impl ReportClient {
    /// Create a client for the given base URL.
    ///
    /// `base_url` should be like `http://localhost:5000` (no trailing slash).
    pub fn new(base_url: String) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create a client whose requests give up after `timeout`.
    pub fn with_timeout(base_url: String, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn parse<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, FetchError> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(FetchError::Server {
                status: status.as_u16(),
                body,
            });
        }
        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, FetchError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "GET");
        let resp = self.client.get(&url).send().await?;
        Self::parse(resp).await
    }

    /// `GET /api/rfp/{id}`
    pub async fn fetch_rfp(&self, rfp_id: RecordId) -> Result<RfpDetail, FetchError> {
        let detail: RfpDetail = self.get_json(&format!("/api/rfp/{rfp_id}")).await?;
        info!(
            rfp_id,
            requirements = detail.requirements.len(),
            specifications = detail.technical_specifications.len(),
            "fetched RFP detail"
        );
        Ok(detail)
    }

    /// `GET /api/reports/comparison/{id}`
    pub async fn fetch_comparison(&self, rfp_id: RecordId) -> Result<ComparisonData, FetchError> {
        let data: ComparisonData = self
            .get_json(&format!("/api/reports/comparison/{rfp_id}"))
            .await?;
        info!(rfp_id, bids = data.bids.len(), "fetched bid comparison");
        Ok(data)
    }

    /// Fetch RFP detail and bid comparison concurrently.
    ///
    /// Either request failing fails the whole load; nothing partial is returned.
    pub async fn load_report(&self, rfp_id: RecordId) -> Result<ReportData, FetchError> {
        let (rfp, comparison) =
            try_join(self.fetch_rfp(rfp_id), self.fetch_comparison(rfp_id)).await?;
        Ok(ReportData { rfp, comparison })
    }

    /// `GET /api/rfp/{id}/bids`
    pub async fn fetch_rfp_bids(&self, rfp_id: RecordId) -> Result<RfpBids, FetchError> {
        let bids: RfpBids = self.get_json(&format!("/api/rfp/{rfp_id}/bids")).await?;
        info!(rfp_id, bids = bids.bids.len(), "fetched RFP bids");
        Ok(bids)
    }

    /// Bid lists for every RFP in `rfp_ids`, in the same order.
    pub async fn load_dashboard(&self, rfp_ids: &[RecordId]) -> Result<Vec<RfpBids>, FetchError> {
        try_join_all(rfp_ids.iter().map(|&id| self.fetch_rfp_bids(id))).await
    }

    /// `GET /api/risk/assessment/{bid_id}`
    pub async fn fetch_risk(&self, bid_id: RecordId) -> Result<RiskAssessment, FetchError> {
        let risk: RiskAssessment = self
            .get_json(&format!("/api/risk/assessment/{bid_id}"))
            .await?;
        info!(bid_id, score = ?risk.overall_risk_score, "fetched risk assessment");
        Ok(risk)
    }

    /// `GET /api/sentiment/analysis/{bid_id}`
    pub async fn fetch_sentiment(&self, bid_id: RecordId) -> Result<SentimentAnalysis, FetchError> {
        let sentiment: SentimentAnalysis = self
            .get_json(&format!("/api/sentiment/analysis/{bid_id}"))
            .await?;
        info!(bid_id, "fetched sentiment analysis");
        Ok(sentiment)
    }

    /// Risk and sentiment for one bid, fetched concurrently.
    pub async fn load_assessment(&self, bid_id: RecordId) -> Result<AssessmentView, FetchError> {
        let (risk, sentiment) =
            try_join(self.fetch_risk(bid_id), self.fetch_sentiment(bid_id)).await?;
        Ok(assessment_view(&risk, &sentiment))
    }

    /// `POST /api/chatbot`
    pub async fn ask(&self, request: &ChatRequest) -> Result<ChatReply, FetchError> {
        let url = format!("{}/api/chatbot", self.base_url);
        info!(url = %url, history = request.chat_history.len(), "sending chat message");
        let resp = self.client.post(&url).json(request).send().await?;
        let reply: ChatReply = Self::parse(resp).await?;
        if let Some(provider) = &reply.provider_info {
            debug!(provider = %provider.provider, success = provider.success, "chat reply");
        }
        Ok(reply)
    }

    /// Run one chat exchange and hand the session back with the reply text.
    ///
    /// Transport and server failures become the apology reply; only an
    /// empty message is an error.
    pub async fn send_chat(
        &self,
        session: ChatSession,
        message: &str,
    ) -> Result<(ChatSession, String), ModelError> {
        let request = session.prepare(message)?;
        let outcome = self.ask(&request).await;
        Ok(session.complete(&request, outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use unisphere_core::chat::CHAT_ERROR_REPLY;
    use unisphere_core::tier::{RiskLevel, SentimentLevel, Tier};

    const RFP_JSON: &str = r#"{
        "rfp": {"id": 1, "title": "Case Management System", "agency": "DOJ", "project_id": "DOJ-1"},
        "requirements": [
            {"id": 10, "category": "Security", "priority": "Must-have",
             "description": "Encrypt data at rest", "section": "4.2"}
        ],
        "technical_specifications": []
    }"#;

    const COMPARISON_JSON: &str = r#"{
        "rfp": {"id": 1, "title": "Case Management System", "agency": "DOJ"},
        "bids": [
            {"id": 2, "vendor_name": "VendorB", "total_score": 60,
             "requirement_compliance": {}, "technical_compliance": {},
             "strengths": [], "weaknesses": ["No on-site support"]},
            {"id": 1, "vendor_name": "VendorA", "total_score": 85,
             "requirement_compliance": {"10": {"score": 90}}, "technical_compliance": {},
             "strengths": ["FedRAMP authorized"], "weaknesses": []}
        ],
        "requirement_categories": {
            "Security": [{"id": 10, "description": "Encrypt data at rest", "priority": "Must-have"}]
        },
        "technical_categories": {}
    }"#;

    type Requests = Arc<Mutex<Vec<String>>>;

    async fn read_request(socket: &mut TcpStream) -> String {
        let mut data = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap_or(0);
            if n == 0 {
                break;
            }
            data.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&data);
            if let Some(header_end) = text.find("\r\n\r\n") {
                let content_length = text[..header_end]
                    .lines()
                    .filter_map(|line| line.split_once(':'))
                    .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
                    .and_then(|(_, v)| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if data.len() >= header_end + 4 + content_length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&data).into_owned()
    }

    /// Serve canned `(path, status, body)` responses; unknown paths get 404.
    async fn serve(routes: Vec<(&'static str, u16, &'static str)>) -> (String, Requests) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests: Requests = Arc::default();
        let seen = Arc::clone(&requests);
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let routes = routes.clone();
                let seen = Arc::clone(&seen);
                tokio::spawn(async move {
                    let request = read_request(&mut socket).await;
                    let path = request.split_whitespace().nth(1).unwrap_or("/").to_string();
                    seen.lock().unwrap().push(request);
                    let (status, body) = routes
                        .iter()
                        .find(|(p, _, _)| *p == path)
                        .map(|&(_, s, b)| (s, b))
                        .unwrap_or((404, r#"{"error": "not found"}"#));
                    let response = format!(
                        "HTTP/1.1 {status} Status\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                        body.len()
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });
        (format!("http://{addr}"), requests)
    }

    fn client(base_url: String) -> ReportClient {
        let http = reqwest::Client::builder().no_proxy().build().unwrap();
        ReportClient::with_client(http, base_url)
    }

    #[test]
    fn client_trims_trailing_slash() {
        let client = ReportClient::new("http://localhost:5000/".into());
        assert_eq!(client.base_url(), "http://localhost:5000");
    }

    #[tokio::test]
    async fn load_report_fetches_both_endpoints() {
        let (url, requests) = serve(vec![
            ("/api/rfp/1", 200, RFP_JSON),
            ("/api/reports/comparison/1", 200, COMPARISON_JSON),
        ])
        .await;
        let data = client(url).load_report(1).await.unwrap();
        assert_eq!(data.rfp.rfp.title, "Case Management System");
        assert_eq!(data.comparison.bids.len(), 2);
        assert_eq!(requests.lock().unwrap().len(), 2);

        let report = data.view();
        assert_eq!(report.ranking[0].vendor_name, "VendorA");
        assert_eq!(report.ranking[0].badge.tier, Tier::Success);
        assert_eq!(report.ranking[1].badge.tier, Tier::Info);
        let row = &report.comparison_tables[0].rows[0];
        assert_eq!(row.cells[0].text(), "90");
        assert_eq!(row.cells[1].text(), "N/A");
        assert_eq!(report.gaps[0].title, "VendorB - Identified Gaps");
    }

    #[tokio::test]
    async fn non_success_status_fails_the_load() {
        let (url, _) = serve(vec![
            ("/api/rfp/1", 200, RFP_JSON),
            ("/api/reports/comparison/1", 500, r#"{"error": "boom"}"#),
        ])
        .await;
        let err = client(url).load_report(1).await.unwrap_err();
        match err {
            FetchError::Server { status, body } => {
                assert_eq!(status, 500);
                assert!(body.contains("boom"));
            }
            other => panic!("expected server error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_body_is_a_json_error() {
        let (url, _) = serve(vec![("/api/rfp/3", 200, r#"{"requirements": "#)]).await;
        let err = client(url).fetch_rfp(3).await.unwrap_err();
        assert!(matches!(err, FetchError::Json(_)));
    }

    #[tokio::test]
    async fn unreachable_server_is_an_http_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let err = client(format!("http://{addr}")).fetch_comparison(1).await.unwrap_err();
        assert!(matches!(err, FetchError::Http(_)));
    }

    #[tokio::test]
    async fn dashboard_keeps_request_order() {
        let (url, _) = serve(vec![
            ("/api/rfp/1/bids", 200, r#"{"rfp": {"id": 1, "title": "One"},
                "bids": [{"id": 1, "vendor_name": "A", "total_score": 90}]}"#),
            ("/api/rfp/2/bids", 200, r#"{"rfp": {"id": 2, "title": "Two"},
                "bids": [{"id": 2, "vendor_name": "B", "total_score": 70}]}"#),
        ])
        .await;
        let lists = client(url).load_dashboard(&[2, 1]).await.unwrap();
        assert_eq!(lists[0].rfp.title, "Two");
        assert_eq!(lists[1].rfp.title, "One");
    }

    #[tokio::test]
    async fn dashboard_fails_if_any_rfp_fails() {
        let (url, _) = serve(vec![(
            "/api/rfp/1/bids",
            200,
            r#"{"rfp": {"id": 1, "title": "One"}, "bids": []}"#,
        )])
        .await;
        assert!(client(url).load_dashboard(&[1, 9]).await.is_err());
    }

    #[tokio::test]
    async fn chat_round_trip_carries_history() {
        let (url, requests) = serve(vec![(
            "/api/chatbot",
            200,
            r#"{"response": "There are 3 must-have requirements.",
                "provider_info": {"provider": "openai", "success": true}}"#,
        )])
        .await;
        let client = client(url);
        let session = ChatSession::with_context(Some(1), None);
        let (session, reply) = client.send_chat(session, "How many?").await.unwrap();
        assert_eq!(reply, "There are 3 must-have requirements.");
        let (session, _) = client.send_chat(session, "And should-have?").await.unwrap();
        assert_eq!(session.len(), 4);

        let requests = requests.lock().unwrap();
        assert!(requests[0].starts_with("POST /api/chatbot"));
        assert!(requests[0].contains(r#""chat_history":[]"#));
        assert!(requests[1].contains(r#""rfp_id":1"#));
        assert!(requests[1].contains(r#""content":"How many?""#));
    }

    #[tokio::test]
    async fn chat_failure_yields_apology() {
        let (url, _) = serve(vec![("/api/chatbot", 503, "{}")]).await;
        let (session, reply) = client(url)
            .send_chat(ChatSession::new(), "Hello")
            .await
            .unwrap();
        assert_eq!(reply, CHAT_ERROR_REPLY);
        assert_eq!(session.len(), 2);
    }

    #[tokio::test]
    async fn assessment_combines_risk_and_sentiment() {
        let (url, requests) = serve(vec![
            ("/api/risk/assessment/7", 200, r#"{"bid_id": 7, "vendor_name": "VendorA",
                "overall_risk_score": 80, "risk_categories": []}"#),
            ("/api/sentiment/analysis/7", 200, r#"{"bid_id": 7, "vendor_name": "VendorA",
                "overall_sentiment": "neutral", "confidence_score": 70}"#),
        ])
        .await;
        let view = client(url).load_assessment(7).await.unwrap();
        assert_eq!(view.vendor_name, "VendorA");
        assert_eq!(view.risk, Some(RiskLevel::Low));
        assert_eq!(view.risk_score, Some(80));
        assert_eq!(view.sentiment, Some(SentimentLevel::Medium));
        assert_eq!(requests.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn assessment_fails_when_bid_is_unknown() {
        let (url, _) = serve(vec![(
            "/api/risk/assessment/9",
            200,
            r#"{"bid_id": 9, "overall_risk_score": 40}"#,
        )])
        .await;
        let err = client(url).load_assessment(9).await.unwrap_err();
        assert!(matches!(err, FetchError::Server { status: 404, .. }));
    }

    #[tokio::test]
    async fn empty_chat_message_sends_nothing() {
        let (url, requests) = serve(vec![]).await;
        let result = client(url).send_chat(ChatSession::new(), "  ").await;
        assert!(matches!(result, Err(ModelError::EmptyMessage)));
        assert!(requests.lock().unwrap().is_empty());
    }
}
