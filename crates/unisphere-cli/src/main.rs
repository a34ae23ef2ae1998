mod config;
mod display;

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use unisphere_client::{
    ASSESSMENT_LOAD_FAILED, DASHBOARD_LOAD_FAILED, REPORT_LOAD_FAILED, ReportClient,
};
use unisphere_core::chart::{Legend, bar_chart_config};
use unisphere_core::export;
use unisphere_core::{ChatSession, ComparisonData, ReportView, RfpDetail, build_report, dashboard};

use config::Config;

#[derive(Parser)]
#[command(name = "unisphere", version, about = "Bid comparison reports for UniSphere RFPs")]
struct Cli {
    /// Base URL of the UniSphere API.
    #[arg(
        long,
        global = true,
        env = "UNISPHERE_API_URL",
        default_value = "http://localhost:5000"
    )]
    api_url: String,

    /// Per-request timeout in seconds.
    #[arg(long, global = true, env = "UNISPHERE_TIMEOUT_SECS", default_value_t = 30)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch and print the bid comparison report for an RFP.
    Report {
        rfp_id: u64,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Build the report from saved API responses instead of the network.
    Render {
        /// RFP detail JSON (`/api/rfp/{id}`).
        #[arg(long)]
        rfp: PathBuf,
        /// Bid comparison JSON (`/api/reports/comparison/{id}`).
        #[arg(long)]
        comparison: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Bid totals and average score across RFPs.
    Dashboard {
        #[arg(required = true)]
        rfp_ids: Vec<u64>,
        /// Write the bid score chart as a Chart.js config.
        #[arg(long)]
        chart_json: Option<PathBuf>,
    },
    /// Risk and sentiment levels for one bid.
    Assess {
        bid_id: u64,
        /// Print the assessment as JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Ask the UniSphere assistant questions, one per line on stdin.
    Chat {
        #[arg(long)]
        rfp_id: Option<u64>,
        #[arg(long)]
        bid_id: Option<u64>,
        /// Print recommended questions and exit.
        #[arg(long)]
        suggest: bool,
    },
}

#[derive(Args)]
struct OutputArgs {
    /// Show only requirements in this category (`all` for every category).
    #[arg(long, default_value = "all")]
    category: String,
    /// Print the report view-model as JSON instead of text.
    #[arg(long)]
    json: bool,
    /// Write the bid comparison chart as a Chart.js config.
    #[arg(long)]
    chart_json: Option<PathBuf>,
    /// Write a text export; without a path, `UniSphere_Report_<date>.txt`.
    #[arg(long)]
    export: Option<Option<PathBuf>>,
}

impl Default for OutputArgs {
    fn default() -> Self {
        Self {
            category: "all".into(),
            json: false,
            chart_json: None,
            export: None,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Report { rfp_id, output } => {
            let client = connect(&cli.api_url, cli.timeout_secs)?;
            let data = client.load_report(rfp_id).await.map_err(|e| {
                error!(rfp_id, error = %e, "error loading report data");
                anyhow::anyhow!(REPORT_LOAD_FAILED)
            })?;
            emit_report(&data.view(), &output)
        }
        Command::Render {
            rfp,
            comparison,
            output,
        } => {
            emit_report(&load_local(&rfp, &comparison)?, &output)
        }
        Command::Dashboard {
            rfp_ids,
            chart_json,
        } => {
            let client = connect(&cli.api_url, cli.timeout_secs)?;
            let lists = client.load_dashboard(&rfp_ids).await.map_err(|e| {
                error!(error = %e, "error fetching dashboard data");
                anyhow::anyhow!(DASHBOARD_LOAD_FAILED)
            })?;
            let summary = dashboard::summarize(&lists);
            display::write_dashboard(&mut io::stdout().lock(), &summary)?;
            if let Some(path) = chart_json {
                if summary.chart.is_empty() {
                    warn!("no bid data; chart not written");
                } else {
                    write_json(&path, &bar_chart_config(&summary.chart, Legend::Hidden))?;
                }
            }
            Ok(())
        }
        Command::Assess { bid_id, json } => {
            let client = connect(&cli.api_url, cli.timeout_secs)?;
            let view = client.load_assessment(bid_id).await.map_err(|e| {
                error!(bid_id, error = %e, "error loading bid assessment");
                anyhow::anyhow!(ASSESSMENT_LOAD_FAILED)
            })?;
            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                display::write_assessment(&mut io::stdout().lock(), &view)?;
            }
            Ok(())
        }
        Command::Chat {
            rfp_id,
            bid_id,
            suggest,
        } => {
            if suggest {
                return Ok(display::write_suggestions(&mut io::stdout().lock())?);
            }
            let client = connect(&cli.api_url, cli.timeout_secs)?;
            chat_loop(&client, ChatSession::with_context(rfp_id, bid_id)).await
        }
    }
}

fn connect(api_url: &str, timeout_secs: u64) -> anyhow::Result<ReportClient> {
    let config = Config::new(api_url, timeout_secs)?;
    info!(api_url = %config.api_url, timeout = ?config.timeout, "configuration loaded");
    Ok(ReportClient::with_timeout(config.api_url, config.timeout)?)
}

fn read(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

/// Build a report from saved `/api/rfp/{id}` and `/api/reports/comparison/{id}` bodies.
fn load_local(rfp: &Path, comparison: &Path) -> anyhow::Result<ReportView> {
    let detail = RfpDetail::from_json(&read(rfp)?)
        .with_context(|| format!("parsing {}", rfp.display()))?;
    let data = ComparisonData::from_json(&read(comparison)?)
        .with_context(|| format!("parsing {}", comparison.display()))?;
    Ok(build_report(&detail, &data))
}

fn write_json(path: &Path, value: &serde_json::Value) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), "wrote chart config");
    Ok(())
}

fn emit_report(report: &ReportView, output: &OutputArgs) -> anyhow::Result<()> {
    let report = report.clone().filter_category(&output.category);
    if report.requirement_tables.is_empty() && !output.category.trim().eq_ignore_ascii_case("all") {
        warn!(category = %output.category, "no requirements in category");
    }
    if output.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        display::write_report(&mut io::stdout().lock(), &report)?;
    }
    let today = chrono::Local::now().date_naive();
    write_files(&report, output, today, Path::new("."))?;
    Ok(())
}

/// Write the chart config and text export `output` asks for. A bare
/// `--export` lands in `dir` under the dated default name. Returns the
/// paths written.
fn write_files(
    report: &ReportView,
    output: &OutputArgs,
    today: NaiveDate,
    dir: &Path,
) -> anyhow::Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    if let Some(path) = &output.chart_json {
        match &report.chart {
            Some(chart) => {
                write_json(path, &bar_chart_config(chart, Legend::Top))?;
                written.push(path.clone());
            }
            None => warn!("no bids; chart not written"),
        }
    }

    if let Some(path) = &output.export {
        let path = path
            .clone()
            .unwrap_or_else(|| dir.join(export::default_file_name(today)));
        std::fs::write(&path, export::render_text(report, today))
            .with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), "report exported");
        written.push(path);
    }
    Ok(written)
}

async fn chat_loop(client: &ReportClient, mut session: ChatSession) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt()?;
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if matches!(line, "exit" | "quit") {
            break;
        }
        if !line.is_empty() {
            let (next, reply) = client.send_chat(session, line).await?;
            session = next;
            println!("UniSphere AI: {reply}");
        }
        prompt()?;
    }
    Ok(())
}

fn prompt() -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    write!(stdout, "> ")?;
    stdout.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const RFP_JSON: &str = r#"{"id": 3, "title": "Records Portal", "agency": "NARA",
        "requirements": [
            {"id": 1, "category": "Security", "priority": "Must-have", "description": "MFA"},
            {"id": 2, "category": "Usability", "priority": "Nice-to-have", "description": "Dark mode"}
        ]}"#;

    const COMPARISON_JSON: &str = r#"{"bids": [
        {"id": 1, "vendor_name": "Acme", "total_score": 72,
         "requirement_compliance": {"1": {"score": 80}, "2": null},
         "strengths": ["Mature SOC"], "weaknesses": []}]}"#;

    fn saved_report(dir: &TempDir) -> ReportView {
        let rfp = dir.path().join("rfp.json");
        let comparison = dir.path().join("comparison.json");
        std::fs::write(&rfp, RFP_JSON).unwrap();
        std::fs::write(&comparison, COMPARISON_JSON).unwrap();
        load_local(&rfp, &comparison).unwrap()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 9).unwrap()
    }

    #[test]
    fn render_builds_report_from_saved_files() {
        let tmp = TempDir::new().unwrap();
        let report = saved_report(&tmp);
        assert_eq!(report.rfp.title, "Records Portal");
        assert_eq!(report.ranking[0].vendor_name, "Acme");
        assert_eq!(report.requirement_tables.len(), 2);
    }

    #[test]
    fn render_reports_unreadable_input() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("missing.json");
        let bad = tmp.path().join("bad.json");
        std::fs::write(&bad, "{").unwrap();
        let err = load_local(&missing, &bad).unwrap_err();
        assert!(err.to_string().contains("reading"));
        let err = load_local(&bad, &bad).unwrap_err();
        assert!(err.to_string().contains("parsing"));
    }

    #[test]
    fn bare_export_uses_dated_name_in_dir() {
        let tmp = TempDir::new().unwrap();
        let report = saved_report(&tmp);
        let output = OutputArgs {
            export: Some(None),
            ..OutputArgs::default()
        };
        let written = write_files(&report, &output, date(), tmp.path()).unwrap();
        let expected = tmp.path().join("UniSphere_Report_2026-03-09.txt");
        assert_eq!(written, vec![expected.clone()]);
        let text = std::fs::read_to_string(expected).unwrap();
        assert!(text.contains("Records Portal"));
        assert!(text.contains("1. Acme"));
    }

    #[test]
    fn chart_json_is_written_to_given_path() {
        let tmp = TempDir::new().unwrap();
        let report = saved_report(&tmp);
        let chart = tmp.path().join("chart.json");
        let output = OutputArgs {
            chart_json: Some(chart.clone()),
            ..OutputArgs::default()
        };
        let written = write_files(&report, &output, date(), tmp.path()).unwrap();
        assert_eq!(written, vec![chart.clone()]);
        let config: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(chart).unwrap()).unwrap();
        assert_eq!(config["type"], "bar");
        assert_eq!(config["data"]["labels"][0], "Acme");
    }

    #[test]
    fn chart_is_skipped_without_bids() {
        let tmp = TempDir::new().unwrap();
        let rfp = RfpDetail::from_json(RFP_JSON).unwrap();
        let report = build_report(&rfp, &ComparisonData::default());
        let output = OutputArgs {
            chart_json: Some(tmp.path().join("chart.json")),
            ..OutputArgs::default()
        };
        assert!(write_files(&report, &output, date(), tmp.path()).unwrap().is_empty());
        assert!(!tmp.path().join("chart.json").exists());
    }

    #[test]
    fn category_flag_narrows_requirements() {
        let tmp = TempDir::new().unwrap();
        let report = saved_report(&tmp).filter_category("usability");
        assert_eq!(report.requirement_tables.len(), 1);
        assert_eq!(report.requirement_tables[0].rows[0].description, "Dark mode");
    }

    #[test]
    fn cli_parses_report_flags() {
        let cli = Cli::try_parse_from([
            "unisphere", "report", "7", "--category", "security", "--export",
        ])
        .unwrap();
        match cli.command {
            Command::Report { rfp_id, output } => {
                assert_eq!(rfp_id, 7);
                assert_eq!(output.category, "security");
                assert_eq!(output.export, Some(None));
                assert!(output.chart_json.is_none());
            }
            _ => panic!("expected report"),
        }
    }
}
