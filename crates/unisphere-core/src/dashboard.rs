//! Cross-RFP dashboard summary.

use serde::{Deserialize, Serialize};

use crate::model::{Bid, RfpHeader};
use crate::view::{ChartData, ChartDataset, Paint, round_score};

/// Response of `GET /api/rfp/{id}/bids`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RfpBids {
    pub rfp: RfpHeader,
    #[serde(default)]
    pub bids: Vec<Bid>,
}

const PALETTE: [&str; 6] = [
    "rgba(75, 192, 192, 0.7)",
    "rgba(54, 162, 235, 0.7)",
    "rgba(153, 102, 255, 0.7)",
    "rgba(255, 159, 64, 0.7)",
    "rgba(255, 99, 132, 0.7)",
    "rgba(201, 203, 207, 0.7)",
];

/// Fill colour for the `index`-th bar, cycling through the palette.
pub fn chart_color(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

/// `chart_color` at full opacity.
pub fn border_color(fill: &str) -> String {
    fill.replace("0.7", "1")
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub total_bids: usize,
    /// Rounded mean over scored bids; 0 when no bid has a score.
    pub average_score: i64,
    pub scored_bids: usize,
    pub chart: ChartData,
}

pub fn summarize(lists: &[RfpBids]) -> DashboardSummary {
    let bids: Vec<&Bid> = lists.iter().flat_map(|l| l.bids.iter()).collect();
    let scores: Vec<f64> = bids.iter().filter_map(|b| b.total_score()).collect();
    let average_score = if scores.is_empty() {
        0
    } else {
        round_score(scores.iter().sum::<f64>() / scores.len() as f64)
    };

    let fills: Vec<String> = (0..bids.len()).map(|i| chart_color(i).to_string()).collect();
    let borders = fills.iter().map(|c| border_color(c)).collect();
    let chart = ChartData {
        labels: bids.iter().map(|b| b.vendor_name.clone()).collect(),
        datasets: vec![ChartDataset {
            label: "Bid Score".into(),
            data: bids.iter().map(|b| b.total_score().unwrap_or(0.0)).collect(),
            background_color: Paint::PerBar(fills),
            border_color: Paint::PerBar(borders),
            border_width: 1,
        }],
    };

    DashboardSummary {
        total_bids: bids.len(),
        average_score,
        scored_bids: scores.len(),
        chart,
    }
}
