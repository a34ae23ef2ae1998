//! Chart.js configuration output.

use serde_json::{Value, json};

use crate::view::ChartData;

/// Where the legend goes, or whether it shows at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Legend {
    Top,
    Hidden,
}

/// A `type: "bar"` config with a 0..100 "Score" axis.
pub fn bar_chart_config(data: &ChartData, legend: Legend) -> Value {
    let legend = match legend {
        Legend::Top => json!({ "position": "top" }),
        Legend::Hidden => json!({ "display": false }),
    };
    json!({
        "type": "bar",
        "data": data,
        "options": {
            "responsive": true,
            "maintainAspectRatio": false,
            "scales": {
                "y": {
                    "beginAtZero": true,
                    "max": 100,
                    "title": { "display": true, "text": "Score" }
                }
            },
            "plugins": { "legend": legend }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::{ChartDataset, Paint};

    fn sample() -> ChartData {
        ChartData {
            labels: vec!["Acme".into(), "Globex".into()],
            datasets: vec![ChartDataset {
                label: "Bid Score".into(),
                data: vec![88.0, 61.0],
                background_color: Paint::PerBar(vec!["a".into(), "b".into()]),
                border_color: Paint::Solid("c".into()),
                border_width: 1,
            }],
        }
    }

    #[test]
    fn config_carries_data_in_chartjs_shape() {
        let config = bar_chart_config(&sample(), Legend::Top);
        assert_eq!(config["type"], "bar");
        assert_eq!(config["data"]["labels"][1], "Globex");
        let dataset = &config["data"]["datasets"][0];
        assert_eq!(dataset["data"][0], 88.0);
        assert_eq!(dataset["backgroundColor"][1], "b");
        assert_eq!(dataset["borderColor"], "c");
        assert_eq!(dataset["borderWidth"], 1);
        assert_eq!(config["options"]["scales"]["y"]["max"], 100);
        assert_eq!(config["options"]["plugins"]["legend"]["position"], "top");
    }

    #[test]
    fn hidden_legend() {
        let config = bar_chart_config(&sample(), Legend::Hidden);
        assert_eq!(config["options"]["plugins"]["legend"]["display"], false);
    }
}
