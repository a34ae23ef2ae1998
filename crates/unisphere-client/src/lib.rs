//! Fetch layer: pulls RFP detail, bid comparisons, dashboard data and bid assessments from
//! the UniSphere API.

pub mod http;

pub use http::{
    ASSESSMENT_LOAD_FAILED, DASHBOARD_LOAD_FAILED, FetchError, REPORT_LOAD_FAILED, ReportClient,
    ReportData,
};
