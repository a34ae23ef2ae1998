//! Risk and sentiment assessments of a single bid.

use serde::{Deserialize, Serialize};

use crate::model::{RecordId, clamp_score, nullable};
use crate::tier::{RiskLevel, SentimentLevel};
use crate::view::round_score;

/// Response of `GET /api/risk/assessment/{bid_id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub bid_id: RecordId,
    #[serde(default, deserialize_with = "nullable")]
    pub vendor_name: String,
    #[serde(default)]
    pub assessment_date: Option<String>,
    #[serde(default)]
    pub overall_risk_score: Option<f64>,
}

/// Overall sentiment, either scored 0..100 or worded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Sentiment {
    Score(f64),
    Label(String),
}

impl Sentiment {
    pub fn level(&self) -> Option<SentimentLevel> {
        match self {
            Self::Score(score) => Some(SentimentLevel::from_score(*score)),
            Self::Label(label) => SentimentLevel::from_label(label),
        }
    }
}

/// Response of `GET /api/sentiment/analysis/{bid_id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentAnalysis {
    pub bid_id: RecordId,
    #[serde(default, deserialize_with = "nullable")]
    pub vendor_name: String,
    #[serde(default)]
    pub analysis_date: Option<String>,
    #[serde(default)]
    pub overall_sentiment: Option<Sentiment>,
}

/// Risk and sentiment of one bid, ready to display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessmentView {
    pub bid_id: RecordId,
    pub vendor_name: String,
    pub risk_score: Option<i64>,
    pub risk: Option<RiskLevel>,
    /// Present only when the sentiment was scored rather than worded.
    pub sentiment_score: Option<i64>,
    pub sentiment: Option<SentimentLevel>,
}

pub fn assessment_view(risk: &RiskAssessment, sentiment: &SentimentAnalysis) -> AssessmentView {
    let risk_score = risk.overall_risk_score.map(clamp_score);
    let vendor_name = if risk.vendor_name.is_empty() {
        sentiment.vendor_name.clone()
    } else {
        risk.vendor_name.clone()
    };
    AssessmentView {
        bid_id: risk.bid_id,
        vendor_name,
        risk_score: risk_score.map(round_score),
        risk: risk_score.map(RiskLevel::from_score),
        sentiment_score: match &sentiment.overall_sentiment {
            Some(Sentiment::Score(score)) => Some(round_score(clamp_score(*score))),
            _ => None,
        },
        sentiment: sentiment.overall_sentiment.as_ref().and_then(Sentiment::level),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scored_assessment_maps_to_levels() {
        let risk: RiskAssessment = serde_json::from_str(
            r#"{"bid_id": 3, "vendor_name": "Acme", "overall_risk_score": 64.6,
                "risk_categories": null, "recommendations": ["Add staff"]}"#,
        )
        .unwrap();
        let sentiment: SentimentAnalysis = serde_json::from_str(
            r#"{"bid_id": 3, "vendor_name": "Acme", "overall_sentiment": 78,
                "confidence_score": 0.85}"#,
        )
        .unwrap();
        let view = assessment_view(&risk, &sentiment);
        assert_eq!(view.vendor_name, "Acme");
        assert_eq!(view.risk_score, Some(65));
        assert_eq!(view.risk, Some(RiskLevel::Medium));
        assert_eq!(view.sentiment_score, Some(78));
        assert_eq!(view.sentiment, Some(SentimentLevel::High));
    }

    #[test]
    fn worded_sentiment_and_missing_risk() {
        let risk: RiskAssessment = serde_json::from_str(
            r#"{"bid_id": 4, "vendor_name": null, "overall_risk_score": null}"#,
        )
        .unwrap();
        let sentiment: SentimentAnalysis = serde_json::from_str(
            r#"{"bid_id": 4, "vendor_name": "Initech", "overall_sentiment": "negative"}"#,
        )
        .unwrap();
        let view = assessment_view(&risk, &sentiment);
        assert_eq!(view.vendor_name, "Initech");
        assert_eq!(view.risk, None);
        assert_eq!(view.risk_score, None);
        assert_eq!(view.sentiment_score, None);
        assert_eq!(view.sentiment, Some(SentimentLevel::Low));
    }

    #[test]
    fn risk_score_is_clamped_before_levelling() {
        let risk = RiskAssessment {
            bid_id: 1,
            vendor_name: "A".into(),
            assessment_date: None,
            overall_risk_score: Some(130.0),
        };
        let sentiment = SentimentAnalysis {
            bid_id: 1,
            vendor_name: String::new(),
            analysis_date: None,
            overall_sentiment: Some(Sentiment::Label("upbeat".into())),
        };
        let view = assessment_view(&risk, &sentiment);
        assert_eq!(view.risk_score, Some(100));
        assert_eq!(view.risk, Some(RiskLevel::Low));
        assert_eq!(view.sentiment, None);
    }
}
