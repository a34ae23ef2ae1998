//! View-models: aggregates mapped to display-ready values.
//!
//! Every rounding, threshold and truncation rule of the report lives here.
//! The structures carry no output dependency; a binding layer walks them.

use serde::Serialize;

use crate::aggregate::{
    self, CategoryCount, ComparisonView, compliance_summary, priority_tally,
    requirement_cross_tab, technical_cross_tab,
};
use crate::model::{Bid, ComparisonData, Priority, RecordId, RfpDetail, RfpHeader, TechSpec};
use crate::tier::Tier;

/// Text shown for a score that does not exist.
pub const NOT_AVAILABLE: &str = "N/A";

/// Strengths and weaknesses shown per bid in the ranking list.
pub const MAX_HIGHLIGHTS: usize = 3;

/// Export line width before truncation.
pub const EXPORT_TEXT_LIMIT: usize = 70;

// ── Formatting ──

/// Whole-number display of a score.
pub fn round_score(score: f64) -> i64 {
    score.round() as i64
}

/// Integral values without a fractional part, others as-is.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// Cut `text` to `limit` characters and mark the cut with `...`.
pub fn truncate(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}

// ── Scores ──

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreBadge {
    pub text: String,
    pub tier: Tier,
}

impl ScoreBadge {
    pub fn new(score: f64) -> Self {
        Self {
            text: round_score(score).to_string(),
            tier: Tier::from_score(score),
        }
    }
}

/// A cross-tab cell: a scored badge, or nothing to show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ScoreCell {
    Score(ScoreBadge),
    Missing,
}

impl ScoreCell {
    pub fn from_score(score: Option<f64>) -> Self {
        match score {
            Some(s) => Self::Score(ScoreBadge::new(s)),
            None => Self::Missing,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Self::Score(badge) => &badge.text,
            Self::Missing => NOT_AVAILABLE,
        }
    }

    pub fn tier(&self) -> Option<Tier> {
        match self {
            Self::Score(badge) => Some(badge.tier),
            Self::Missing => None,
        }
    }
}

// ── Ranking list ──

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedBidView {
    pub rank: usize,
    pub bid_id: RecordId,
    pub vendor_name: String,
    /// Missing total scores display as 0 here, matching their rank position.
    pub badge: ScoreBadge,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    /// Only the leader starts expanded.
    pub expanded: bool,
}

pub fn ranking_view(ranked: &[&Bid]) -> Vec<RankedBidView> {
    ranked
        .iter()
        .enumerate()
        .map(|(i, bid)| RankedBidView {
            rank: i + 1,
            bid_id: bid.id,
            vendor_name: bid.vendor_name.clone(),
            badge: ScoreBadge::new(aggregate::ranking_score(bid)),
            strengths: bid.strengths.iter().take(MAX_HIGHLIGHTS).cloned().collect(),
            weaknesses: bid.weaknesses.iter().take(MAX_HIGHLIGHTS).cloned().collect(),
            expanded: i == 0,
        })
        .collect()
}

// ── Requirement and specification tables ──

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableView<R> {
    pub title: String,
    pub rows: Vec<R>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequirementRow {
    pub description: String,
    pub priority: Priority,
    pub priority_tier: Tier,
    pub section: String,
    /// Lowercased category, the key the category filter matches.
    pub filter_key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpecificationRow {
    pub name: String,
    pub description: String,
    pub requirements: String,
    pub mandatory: bool,
}

pub fn requirement_tables(rfp: &RfpDetail) -> Vec<TableView<RequirementRow>> {
    aggregate::group_requirements(&rfp.requirements)
        .iter()
        .map(|(category, reqs)| TableView {
            title: category.to_string(),
            rows: reqs
                .iter()
                .map(|r| RequirementRow {
                    description: r.description.clone(),
                    priority: r.priority,
                    priority_tier: r.priority.tier(),
                    section: r.section.clone(),
                    filter_key: r.category.to_lowercase(),
                })
                .collect(),
        })
        .collect()
}

/// Keep rows whose `filter_key` matches `filter`, dropping emptied tables.
pub fn filter_by_category(
    tables: Vec<TableView<RequirementRow>>,
    filter: &str,
) -> Vec<TableView<RequirementRow>> {
    tables
        .into_iter()
        .filter_map(|mut table| {
            table
                .rows
                .retain(|row| aggregate::category_matches(&row.filter_key, filter));
            (!table.rows.is_empty()).then_some(table)
        })
        .collect()
}

pub fn specification_tables(rfp: &RfpDetail) -> Vec<TableView<SpecificationRow>> {
    aggregate::group_specifications(&rfp.technical_specifications)
        .iter()
        .map(|(category, specs)| TableView {
            title: category.to_string(),
            rows: specs
                .iter()
                .map(|s| SpecificationRow {
                    name: s.name.clone(),
                    description: s.description.clone(),
                    requirements: spec_requirements_text(s),
                    mandatory: s.is_mandatory,
                })
                .collect(),
        })
        .collect()
}

/// `"Min: 10 GB, Max: 20 GB"`, the bare unit when there are no bounds, `"N/A"`
/// when there is nothing at all.
pub fn spec_requirements_text(spec: &TechSpec) -> String {
    let unit = spec
        .measurement_unit
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty());
    let bound = |label: &str, value: f64| match unit {
        Some(u) => format!("{label}: {} {u}", format_number(value)),
        None => format!("{label}: {}", format_number(value)),
    };

    let parts: Vec<String> = [("Min", spec.min_value), ("Max", spec.max_value)]
        .into_iter()
        .filter_map(|(label, value)| value.map(|v| bound(label, v)))
        .collect();

    if !parts.is_empty() {
        parts.join(", ")
    } else if let Some(u) = unit {
        u.to_string()
    } else {
        NOT_AVAILABLE.to_string()
    }
}

// ── Statistics panel ──

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriorityBar {
    pub priority: Priority,
    pub count: usize,
    pub percentage: u32,
    pub tier: Tier,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsView {
    pub categories: Vec<CategoryCount>,
    pub priorities: Vec<PriorityBar>,
}

pub fn stats_view(rfp: &RfpDetail) -> StatsView {
    let tally = priority_tally(&rfp.requirements);
    StatsView {
        categories: aggregate::category_tally(&rfp.requirements),
        priorities: tally
            .buckets
            .into_iter()
            .map(|b| PriorityBar {
                priority: b.priority,
                count: b.count,
                percentage: b.percentage,
                tier: b.priority.tier(),
            })
            .collect(),
    }
}

// ── Comparison tables ──

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub label: String,
    /// Badge next to the label ("Must-have", "Mandatory", ...).
    pub flag: Option<String>,
    pub cells: Vec<ScoreCell>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonTable {
    pub title: String,
    pub item_header: String,
    pub vendors: Vec<String>,
    pub rows: Vec<ComparisonRow>,
}

fn requirement_flag(priority: Priority) -> Option<String> {
    match priority {
        Priority::MustHave | Priority::ShouldHave => Some(priority.as_str().to_string()),
        Priority::NiceToHave | Priority::Unknown => None,
    }
}

pub fn comparison_tables(view: &ComparisonView) -> Vec<ComparisonTable> {
    let ranked = view.ranked();
    let vendors: Vec<String> = ranked.iter().map(|b| b.vendor_name.clone()).collect();
    let mut tables = Vec::new();

    for (category, reqs) in view.requirement_categories.iter() {
        let grid = requirement_cross_tab(reqs, &ranked);
        tables.push(ComparisonTable {
            title: format!("{category} Requirements"),
            item_header: "Requirement".into(),
            vendors: vendors.clone(),
            rows: reqs
                .iter()
                .zip(grid)
                .map(|(req, cells)| ComparisonRow {
                    label: req.description.clone(),
                    flag: requirement_flag(req.priority),
                    cells: cells.into_iter().map(ScoreCell::from_score).collect(),
                })
                .collect(),
        });
    }

    for (category, specs) in view.technical_categories.iter() {
        let grid = technical_cross_tab(specs, &ranked);
        tables.push(ComparisonTable {
            title: format!("{category} Specifications"),
            item_header: "Specification".into(),
            vendors: vendors.clone(),
            rows: specs
                .iter()
                .zip(grid)
                .map(|(spec, cells)| ComparisonRow {
                    label: format!("{}: {}", spec.name, spec.description),
                    flag: spec.is_mandatory.then(|| "Mandatory".to_string()),
                    cells: cells.into_iter().map(ScoreCell::from_score).collect(),
                })
                .collect(),
        });
    }

    tables
}

// ── Gap analysis ──

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GapSection {
    pub title: String,
    pub gaps: Vec<String>,
}

pub fn gap_analysis(ranked: &[&Bid]) -> Vec<GapSection> {
    ranked
        .iter()
        .filter(|bid| !bid.weaknesses.is_empty())
        .map(|bid| GapSection {
            title: format!("{} - Identified Gaps", bid.vendor_name),
            gaps: bid.weaknesses.clone(),
        })
        .collect()
}

// ── Chart data ──

/// One colour for the whole dataset, or one per bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Paint {
    Solid(String),
    PerBar(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartDataset {
    pub label: String,
    pub data: Vec<f64>,
    pub background_color: Paint,
    pub border_color: Paint,
    pub border_width: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<ChartDataset>,
}

impl ChartData {
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Report chart series: label, fill, border.
const COMPARISON_SERIES: [(&str, &str, &str); 3] = [
    ("Overall Score", "rgba(75, 192, 192, 0.7)", "rgba(75, 192, 192, 1)"),
    ("Technical Compliance", "rgba(54, 162, 235, 0.7)", "rgba(54, 162, 235, 1)"),
    ("Requirement Compliance", "rgba(255, 159, 64, 0.7)", "rgba(255, 159, 64, 1)"),
];

/// Overall, technical and requirement scores per ranked bid.
///
/// A bar needs a height, so a bid without scores draws at 0 while its table
/// cells read "N/A".
pub fn bid_comparison_chart(ranked: &[&Bid]) -> ChartData {
    let mut series: [Vec<f64>; 3] = Default::default();
    for bid in ranked {
        let summary = compliance_summary(bid);
        series[0].push(aggregate::ranking_score(bid));
        series[1].push(summary.technical.map(round_score).unwrap_or(0) as f64);
        series[2].push(summary.requirement.map(round_score).unwrap_or(0) as f64);
    }

    ChartData {
        labels: ranked.iter().map(|b| b.vendor_name.clone()).collect(),
        datasets: COMPARISON_SERIES
            .iter()
            .zip(series)
            .map(|(&(label, fill, border), data)| ChartDataset {
                label: label.into(),
                data,
                background_color: Paint::Solid(fill.into()),
                border_color: Paint::Solid(border.into()),
                border_width: 1,
            })
            .collect(),
    }
}

// ── Whole report ──

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportView {
    pub rfp: RfpHeader,
    pub requirement_tables: Vec<TableView<RequirementRow>>,
    pub specification_tables: Vec<TableView<SpecificationRow>>,
    /// Absent when the RFP has no requirements.
    pub stats: Option<StatsView>,
    pub ranking: Vec<RankedBidView>,
    pub comparison_tables: Vec<ComparisonTable>,
    pub gaps: Vec<GapSection>,
    /// Absent when there are no bids.
    pub chart: Option<ChartData>,
}

impl ReportView {
    pub fn has_bids(&self) -> bool {
        !self.ranking.is_empty()
    }

    /// Narrow the requirement tables to one category; `"all"` keeps every row.
    pub fn filter_category(mut self, filter: &str) -> Self {
        self.requirement_tables = filter_by_category(self.requirement_tables, filter);
        self
    }
}

/// Run the aggregation and mapping steps for one report.
pub fn build_report(rfp: &RfpDetail, comparison: &ComparisonData) -> ReportView {
    let view = ComparisonView::from_data(comparison);
    let ranked = view.ranked();
    let has_bids = !ranked.is_empty();

    ReportView {
        rfp: rfp.rfp.clone(),
        requirement_tables: requirement_tables(rfp),
        specification_tables: specification_tables(rfp),
        stats: (!rfp.requirements.is_empty()).then(|| stats_view(rfp)),
        ranking: ranking_view(&ranked),
        comparison_tables: if has_bids {
            comparison_tables(&view)
        } else {
            Vec::new()
        },
        gaps: gap_analysis(&ranked),
        chart: has_bids.then(|| bid_comparison_chart(&ranked)),
    }
}
