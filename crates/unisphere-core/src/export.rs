//! Plain-text report export.

use std::fmt::Write;

use chrono::NaiveDate;

use crate::view::{EXPORT_TEXT_LIMIT, ReportView, truncate};

pub const EXPORT_TITLE: &str = "UniSphere Analysis Report";

/// `UniSphere_Report_2026-10-16.txt`
pub fn default_file_name(date: NaiveDate) -> String {
    format!("UniSphere_Report_{}.txt", date.format("%Y-%m-%d"))
}

/// Render the bid summary of `report` as text.
///
/// Only the expanded bid lists its strengths and weaknesses.
pub fn render_text(report: &ReportView, generated: NaiveDate) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_report(&mut out, report, generated);
    out
}

fn write_report(out: &mut String, report: &ReportView, generated: NaiveDate) -> std::fmt::Result {
    writeln!(out, "{EXPORT_TITLE}")?;
    writeln!(out, "{}", report.rfp.title)?;
    writeln!(out, "Agency: {}", report.rfp.agency)?;
    writeln!(out, "Generated: {}", generated.format("%Y-%m-%d"))?;
    writeln!(out, "{}", "-".repeat(60))?;
    writeln!(out)?;
    writeln!(out, "Bid Summary")?;

    if !report.has_bids() {
        writeln!(out, "  No bids available")?;
        return Ok(());
    }

    for bid in &report.ranking {
        writeln!(
            out,
            "  {:<48} Score: {}",
            format!("{}. {}", bid.rank, bid.vendor_name),
            bid.badge.text
        )?;
        if !bid.expanded {
            continue;
        }
        for (header, items) in [("Strengths:", &bid.strengths), ("Weaknesses:", &bid.weaknesses)] {
            if items.is_empty() {
                continue;
            }
            writeln!(out, "    {header}")?;
            for item in items {
                writeln!(out, "      • {}", truncate(item, EXPORT_TEXT_LIMIT))?;
            }
        }
    }
    Ok(())
}
