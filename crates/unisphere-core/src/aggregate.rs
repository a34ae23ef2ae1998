//! Pure reductions over fetched report data.
//!
//! Nothing here formats or rounds for display beyond integer percentages;
//! that lives in [`crate::view`].

use serde::Serialize;
use tracing::debug;

use crate::model::{
    Bid, CategoryMap, ComparisonData, ComplianceMap, Priority, Requirement, TechSpec,
};

/// `count / total` as a whole percentage. Zero when `total` is zero.
pub fn percentage(count: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (count as f64 / total as f64 * 100.0).round() as u32
}

// ── Grouping ──

/// Partition `items` by the key `category` returns, in first-seen order.
pub fn group_by_category<T, F>(items: &[T], category: F) -> CategoryMap<T>
where
    T: Clone,
    F: Fn(&T) -> &str,
{
    let mut map = CategoryMap::new();
    for item in items {
        map.push(category(item), item.clone());
    }
    map
}

pub fn group_requirements(requirements: &[Requirement]) -> CategoryMap<Requirement> {
    group_by_category(requirements, |r| r.category.as_str())
}

pub fn group_specifications(specs: &[TechSpec]) -> CategoryMap<TechSpec> {
    group_by_category(specs, |s| s.category.as_str())
}

/// Whether `category` passes the category filter. Case-insensitive; `"all"`
/// passes everything.
pub fn category_matches(category: &str, filter: &str) -> bool {
    let filter = filter.trim().to_lowercase();
    filter == "all" || category.to_lowercase() == filter
}

// ── Tallies ──

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
    pub percentage: u32,
}

/// Requirement count per category, in first-seen order.
pub fn category_tally(requirements: &[Requirement]) -> Vec<CategoryCount> {
    let total = requirements.len();
    group_requirements(requirements)
        .iter()
        .map(|(category, items)| CategoryCount {
            category: category.to_string(),
            count: items.len(),
            percentage: percentage(items.len(), total),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriorityCount {
    pub priority: Priority,
    pub count: usize,
    pub percentage: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriorityTally {
    /// All requirements, including ones with an unrecognised priority.
    pub total: usize,
    /// One entry per [`Priority::BUCKETS`], in that order.
    pub buckets: Vec<PriorityCount>,
}

impl PriorityTally {
    pub fn get(&self, priority: Priority) -> Option<&PriorityCount> {
        self.buckets.iter().find(|b| b.priority == priority)
    }

    pub fn percentage_sum(&self) -> u32 {
        self.buckets.iter().map(|b| b.percentage).sum()
    }
}

pub fn priority_tally(requirements: &[Requirement]) -> PriorityTally {
    let total = requirements.len();
    let buckets = Priority::BUCKETS
        .iter()
        .map(|&priority| {
            let count = requirements
                .iter()
                .filter(|r| r.priority == priority)
                .count();
            PriorityCount {
                priority,
                count,
                percentage: percentage(count, total),
            }
        })
        .collect();
    PriorityTally { total, buckets }
}

// ── Ranking ──

/// Sort key for ranking: a missing score sorts as 0.
pub fn ranking_score(bid: &Bid) -> f64 {
    bid.total_score().unwrap_or(0.0)
}

/// Bids by descending total score. Equal scores keep fetch order.
pub fn rank_bids(bids: &[Bid]) -> Vec<&Bid> {
    let mut ranked: Vec<&Bid> = bids.iter().collect();
    ranked.sort_by(|a, b| ranking_score(b).total_cmp(&ranking_score(a)));
    ranked
}

// ── Compliance ──

/// Mean of the scores present in `compliance`.
///
/// Entries without a score count toward neither sum nor denominator, so a
/// map with no scored entries has no average.
pub fn average_score(compliance: &ComplianceMap) -> Option<f64> {
    let scores: Vec<f64> = compliance.values().filter_map(|e| e.score()).collect();
    if scores.is_empty() {
        return None;
    }
    Some(scores.iter().sum::<f64>() / scores.len() as f64)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ComplianceSummary {
    pub technical: Option<f64>,
    pub requirement: Option<f64>,
}

pub fn compliance_summary(bid: &Bid) -> ComplianceSummary {
    ComplianceSummary {
        technical: average_score(&bid.technical_compliance),
        requirement: average_score(&bid.requirement_compliance),
    }
}

// ── Cross-tabs ──

/// One row per item, one cell per bid (in the order given). `None` marks a
/// bid that has no score for that item.
pub fn cross_tab<T, F>(items: &[T], bids: &[&Bid], score: F) -> Vec<Vec<Option<f64>>>
where
    F: Fn(&Bid, &T) -> Option<f64>,
{
    items
        .iter()
        .map(|item| bids.iter().map(|bid| score(bid, item)).collect())
        .collect()
}

pub fn requirement_cross_tab(requirements: &[Requirement], bids: &[&Bid]) -> Vec<Vec<Option<f64>>> {
    cross_tab(requirements, bids, |bid, req| bid.requirement_score(req.id))
}

pub fn technical_cross_tab(specs: &[TechSpec], bids: &[&Bid]) -> Vec<Vec<Option<f64>>> {
    cross_tab(specs, bids, |bid, spec| bid.technical_score(spec.id))
}

// ── Comparison view ──

/// Comparison data with bids in ranking order.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonView {
    pub bids: Vec<Bid>,
    pub requirement_categories: CategoryMap<Requirement>,
    pub technical_categories: CategoryMap<TechSpec>,
}

impl ComparisonView {
    pub fn from_data(data: &ComparisonData) -> Self {
        let bids: Vec<Bid> = rank_bids(&data.bids).into_iter().cloned().collect();
        debug!(
            bids = bids.len(),
            requirement_categories = data.requirement_categories.len(),
            technical_categories = data.technical_categories.len(),
            "built comparison view"
        );
        Self {
            bids,
            requirement_categories: data.requirement_categories.clone(),
            technical_categories: data.technical_categories.clone(),
        }
    }

    pub fn ranked(&self) -> Vec<&Bid> {
        self.bids.iter().collect()
    }
}
