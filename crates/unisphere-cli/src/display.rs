//! Terminal rendering of report, dashboard and assessment view-models.
//!
//! This is the only place that knows how a view-model looks on screen. Every
//! function writes to any `io::Write` so the layout can be checked in tests.

use std::io::{self, Write};

use unisphere_core::chat::SUGGESTED_QUESTIONS;
use unisphere_core::view::{
    ComparisonTable, NOT_AVAILABLE, RankedBidView, RequirementRow, ScoreCell, SpecificationRow,
    StatsView, TableView,
};
use unisphere_core::{AssessmentView, DashboardSummary, ReportView, Tier};

const LABEL_WIDTH: usize = 26;
const CELL_WIDTH: usize = 14;
const MAX_ROW_LABEL: usize = 48;
const BAR_WIDTH: usize = 20;

// ── Public API ──

/// Write a full report: requirements, statistics, ranking, comparison, gaps.
pub fn write_report<W: Write>(out: &mut W, report: &ReportView) -> io::Result<()> {
    writeln!(out, "=== {} ===", report.rfp.title)?;
    if !report.rfp.agency.is_empty() {
        writeln!(out, "{}", report.rfp.agency)?;
    }
    writeln!(out)?;

    write_requirements(out, &report.requirement_tables)?;
    write_specifications(out, &report.specification_tables)?;
    if let Some(stats) = &report.stats {
        write_stats(out, stats)?;
    }

    if !report.has_bids() {
        writeln!(out, "Bid Summary")?;
        writeln!(out, "  No bids have been submitted for this RFP.")?;
        return Ok(());
    }

    write_ranking(out, &report.ranking)?;
    for table in &report.comparison_tables {
        write_comparison(out, table)?;
    }
    if !report.gaps.is_empty() {
        writeln!(out, "Gap Analysis")?;
        for section in &report.gaps {
            writeln!(out, "  {}", section.title)?;
            for gap in &section.gaps {
                writeln!(out, "    - {gap}")?;
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

pub fn write_dashboard<W: Write>(out: &mut W, summary: &DashboardSummary) -> io::Result<()> {
    writeln!(out, "=== Dashboard ===")?;
    writeln!(out, "  {:<LABEL_WIDTH$} {}", "total bids", summary.total_bids)?;
    writeln!(out, "  {:<LABEL_WIDTH$} {}", "average score", summary.average_score)?;
    writeln!(out)?;

    if summary.chart.is_empty() {
        writeln!(out, "  No bid data available.")?;
        return Ok(());
    }
    writeln!(out, "Bid Scores")?;
    if let Some(dataset) = summary.chart.datasets.first() {
        for (vendor, score) in summary.chart.labels.iter().zip(&dataset.data) {
            writeln!(out, "  {:<LABEL_WIDTH$} {} {:>3}", vendor, bar(*score as u32), score)?;
        }
    }
    Ok(())
}

pub fn write_assessment<W: Write>(out: &mut W, view: &AssessmentView) -> io::Result<()> {
    writeln!(out, "=== {} (bid {}) ===", view.vendor_name, view.bid_id)?;
    let risk = match (view.risk_score, view.risk) {
        (Some(score), Some(level)) => format!("{score}% {}", badge(level.label(), level.tier())),
        _ => NOT_AVAILABLE.to_string(),
    };
    writeln!(out, "  {:<LABEL_WIDTH$} {risk}", "risk")?;
    let sentiment = match (view.sentiment_score, view.sentiment) {
        (Some(score), Some(level)) => format!("{score}% {}", level.label()),
        (None, Some(level)) => level.label().to_string(),
        _ => NOT_AVAILABLE.to_string(),
    };
    writeln!(out, "  {:<LABEL_WIDTH$} {sentiment}", "sentiment")
}

pub fn write_suggestions<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "Recommended Questions:")?;
    for (i, question) in SUGGESTED_QUESTIONS.iter().enumerate() {
        writeln!(out, "  {:>2}. {question}", i + 1)?;
    }
    Ok(())
}

// ── Sections ──

fn write_requirements<W: Write>(
    out: &mut W,
    tables: &[TableView<RequirementRow>],
) -> io::Result<()> {
    if tables.is_empty() {
        return Ok(());
    }
    writeln!(out, "Requirements")?;
    for table in tables {
        writeln!(out, "  {}", table.title)?;
        for row in &table.rows {
            writeln!(
                out,
                "    {:<MAX_ROW_LABEL$} {:<14} {}",
                clip(&row.description),
                badge(row.priority.as_str(), row.priority_tier),
                row.section
            )?;
        }
    }
    writeln!(out)
}

fn write_specifications<W: Write>(
    out: &mut W,
    tables: &[TableView<SpecificationRow>],
) -> io::Result<()> {
    if tables.is_empty() {
        return Ok(());
    }
    writeln!(out, "Technical Specifications")?;
    for table in tables {
        writeln!(out, "  {}", table.title)?;
        for row in &table.rows {
            writeln!(
                out,
                "    {:<20} {:<30} mandatory: {}",
                row.name,
                row.requirements,
                if row.mandatory { "yes" } else { "no" }
            )?;
            if !row.description.is_empty() {
                writeln!(out, "      {}", row.description)?;
            }
        }
    }
    writeln!(out)
}

fn write_stats<W: Write>(out: &mut W, stats: &StatsView) -> io::Result<()> {
    writeln!(out, "Requirements by Category")?;
    for c in &stats.categories {
        writeln!(
            out,
            "  {:<LABEL_WIDTH$} {} {} ({}%)",
            c.category,
            bar(c.percentage),
            c.count,
            c.percentage
        )?;
    }
    writeln!(out)?;
    writeln!(out, "Requirements by Priority")?;
    for p in &stats.priorities {
        writeln!(
            out,
            "  {:<LABEL_WIDTH$} {} {} ({}%)",
            p.priority.as_str(),
            bar(p.percentage),
            p.count,
            p.percentage
        )?;
    }
    writeln!(out)
}

fn write_ranking<W: Write>(out: &mut W, ranking: &[RankedBidView]) -> io::Result<()> {
    writeln!(out, "Bid Summary")?;
    for bid in ranking {
        writeln!(
            out,
            "  #{:<3} {:<LABEL_WIDTH$} {}",
            bid.rank,
            bid.vendor_name,
            badge(&bid.badge.text, bid.badge.tier)
        )?;
        if !bid.expanded {
            continue;
        }
        if !bid.strengths.is_empty() {
            writeln!(out, "        Key Strengths")?;
            for s in &bid.strengths {
                writeln!(out, "          + {s}")?;
            }
        }
        if !bid.weaknesses.is_empty() {
            writeln!(out, "        Key Weaknesses")?;
            for w in &bid.weaknesses {
                writeln!(out, "          - {w}")?;
            }
        }
    }
    writeln!(out)
}

fn write_comparison<W: Write>(out: &mut W, table: &ComparisonTable) -> io::Result<()> {
    writeln!(out, "{}", table.title)?;
    write!(out, "  {:<MAX_ROW_LABEL$}", table.item_header)?;
    for vendor in &table.vendors {
        write!(out, " {:^CELL_WIDTH$}", clip_to(vendor, CELL_WIDTH))?;
    }
    writeln!(out)?;

    for row in &table.rows {
        let label = match &row.flag {
            Some(flag) => format!("{} [{flag}]", row.label),
            None => row.label.clone(),
        };
        write!(out, "  {:<MAX_ROW_LABEL$}", clip(&label))?;
        for cell in &row.cells {
            write!(out, " {:^CELL_WIDTH$}", cell_text(cell))?;
        }
        writeln!(out)?;
    }
    writeln!(out)
}

// ── Helpers ──

/// `"85 (success)"`
fn badge(text: &str, tier: Tier) -> String {
    format!("{text} ({tier})")
}

fn cell_text(cell: &ScoreCell) -> String {
    match cell {
        ScoreCell::Score(b) => badge(&b.text, b.tier),
        ScoreCell::Missing => cell.text().to_string(),
    }
}

/// Fixed-width progress bar for a 0..100 percentage.
fn bar(percentage: u32) -> String {
    let filled = (percentage.min(100) as usize * BAR_WIDTH).div_ceil(100);
    format!("[{}{}]", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}

fn clip(text: &str) -> String {
    clip_to(text, MAX_ROW_LABEL)
}

fn clip_to(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(3)).collect();
    format!("{kept}...")
}
