//! Score bucketing shared by every score display.

use std::fmt;

use serde::Serialize;

use crate::model::{Priority, clamp_score};

/// Display bucket for a 0..100 score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Danger,
    Warning,
    Info,
    Success,
}

impl Tier {
    /// `>= 80` success, `>= 60` info, `>= 40` warning, anything lower danger.
    pub fn from_score(score: f64) -> Self {
        let score = clamp_score(score);
        if score >= 80.0 {
            Self::Success
        } else if score >= 60.0 {
            Self::Info
        } else if score >= 40.0 {
            Self::Warning
        } else {
            Self::Danger
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Danger => "danger",
            Self::Warning => "warning",
            Self::Info => "info",
            Self::Success => "success",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Priority {
    /// Badge tier for a requirement priority.
    pub fn tier(&self) -> Tier {
        match self {
            Self::MustHave => Tier::Danger,
            Self::ShouldHave => Tier::Warning,
            Self::NiceToHave | Self::Unknown => Tier::Info,
        }
    }
}

// ── Risk and sentiment ──

/// Vendor risk level from a 0..100 risk score (higher is safer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn from_score(score: f64) -> Self {
        let score = clamp_score(score);
        if score >= 75.0 {
            Self::Low
        } else if score >= 50.0 {
            Self::Medium
        } else {
            Self::High
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "Low Risk",
            Self::Medium => "Medium Risk",
            Self::High => "High Risk",
        }
    }

    pub fn tier(&self) -> Tier {
        match self {
            Self::Low => Tier::Success,
            Self::Medium => Tier::Warning,
            Self::High => Tier::Danger,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SentimentLevel {
    High,
    Medium,
    Low,
}

impl SentimentLevel {
    pub fn from_score(score: f64) -> Self {
        let score = clamp_score(score);
        if score >= 75.0 {
            Self::High
        } else if score >= 50.0 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    /// Level for a worded sentiment (`positive`, `neutral`, `negative`).
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "positive" => Some(Self::High),
            "neutral" => Some(Self::Medium),
            "negative" => Some(Self::Low),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::High => "High Sentiment",
            Self::Medium => "Medium Sentiment",
            Self::Low => "Low Sentiment",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_boundaries() {
        let cases = [
            (0.0, Tier::Danger),
            (39.0, Tier::Danger),
            (40.0, Tier::Warning),
            (59.0, Tier::Warning),
            (60.0, Tier::Info),
            (79.0, Tier::Info),
            (80.0, Tier::Success),
            (100.0, Tier::Success),
        ];
        for (score, tier) in cases {
            assert_eq!(Tier::from_score(score), tier, "score {score}");
        }
    }

    #[test]
    fn tier_is_monotonic() {
        let mut prev = Tier::from_score(0.0);
        for i in 0..=1000 {
            let tier = Tier::from_score(i as f64 / 10.0);
            assert!(tier >= prev, "tier dropped at {}", i as f64 / 10.0);
            prev = tier;
        }
    }

    #[test]
    fn out_of_range_scores_clamp() {
        assert_eq!(Tier::from_score(-10.0), Tier::Danger);
        assert_eq!(Tier::from_score(140.0), Tier::Success);
        assert_eq!(Tier::from_score(79.99), Tier::Info);
    }

    #[test]
    fn priority_badges() {
        assert_eq!(Priority::MustHave.tier(), Tier::Danger);
        assert_eq!(Priority::ShouldHave.tier(), Tier::Warning);
        assert_eq!(Priority::NiceToHave.tier(), Tier::Info);
    }

    #[test]
    fn risk_and_sentiment_levels() {
        assert_eq!(RiskLevel::from_score(75.0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(65.0).label(), "Medium Risk");
        assert_eq!(RiskLevel::from_score(49.0).tier(), Tier::Danger);
        assert_eq!(SentimentLevel::from_score(78.0), SentimentLevel::High);
        assert_eq!(SentimentLevel::from_score(50.0).label(), "Medium Sentiment");
        assert_eq!(SentimentLevel::from_score(10.0), SentimentLevel::Low);
        assert_eq!(SentimentLevel::from_label(" Positive"), Some(SentimentLevel::High));
        assert_eq!(SentimentLevel::from_label("negative"), Some(SentimentLevel::Low));
        assert_eq!(SentimentLevel::from_label("mixed"), None);
    }
}
