//! Report pipeline for UniSphere: wire types, aggregation, view-models and chart output.

pub mod aggregate;
pub mod assessment;
pub mod chart;
pub mod chat;
pub mod dashboard;
mod error;
pub mod export;
pub mod model;
pub mod tier;
pub mod view;

pub use aggregate::ComparisonView;
pub use assessment::{AssessmentView, RiskAssessment, SentimentAnalysis, assessment_view};
pub use chat::{ChatReply, ChatRequest, ChatSession};
pub use dashboard::{DashboardSummary, RfpBids};
pub use error::ModelError;
pub use model::{Bid, ComparisonData, Priority, Requirement, RfpDetail, RfpHeader, TechSpec};
pub use tier::Tier;
pub use view::{ReportView, build_report};
