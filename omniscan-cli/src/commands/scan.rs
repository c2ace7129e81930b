//! `omniscan scan` command handler

use std::collections::BTreeMap;
use std::io::Write;
use std::time::Duration;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::info;

use omniscan_core::{Issue, OmniscanConfig, ScanOutcome};
use omniscan_engine::{ScanOptions, scan};

use crate::cli::ScanArgs;
use crate::commands::build_registry;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `scan` command.
pub async fn execute(
    args: ScanArgs,
    config: &OmniscanConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let registry = build_registry(config)?;

    // CLI selection wins over the configured default backend list
    let requested = if args.backends.is_empty() {
        config.process.backends.clone()
    } else {
        args.backends.clone()
    };

    let options = ScanOptions {
        mode: args.mode.into(),
        include_raw: args.raw || config.process.include_raw_output,
        process_timeout: Some(Duration::from_secs(config.process.timeout_secs)),
        remote_run_timeout: Duration::from_secs(config.semantic.run_timeout_secs),
    };

    info!(path = %args.path.display(), ?requested, "starting scan");

    let cancel = CancellationToken::new();
    let outcome = scan(&args.path, &requested, &registry, &options, cancel).await?;

    let report = ScanReport::from_outcome(args.path.display().to_string(), outcome);
    writer.render(&report)?;

    // Findings flip the exit code so CI pipelines can gate on it
    if report.summary.total > 0 {
        return Err(CliError::FindingsReported(format!(
            "found {} issues",
            report.summary.total
        )));
    }

    Ok(())
}

#[derive(Serialize)]
pub struct ScanReport {
    pub path: String,
    pub scan_id: String,
    pub backends: BTreeMap<String, String>,
    pub summary: SummaryEntry,
    pub findings: Vec<Issue>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub raw_outputs: BTreeMap<String, String>,
}

#[derive(Serialize)]
pub struct SummaryEntry {
    pub total: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub affected_files: usize,
}

impl ScanReport {
    fn from_outcome(path: String, outcome: ScanOutcome) -> Self {
        let backends = outcome
            .statuses
            .iter()
            .map(|(name, status)| (name.clone(), status.to_string()))
            .collect();
        let summary = SummaryEntry {
            total: outcome.summary.total_issues,
            high: outcome.summary.severity_counts.high,
            medium: outcome.summary.severity_counts.medium,
            low: outcome.summary.severity_counts.low,
            affected_files: outcome.summary.affected_files,
        };
        Self {
            path,
            scan_id: outcome.scan_id,
            backends,
            summary,
            findings: outcome.issues,
            raw_outputs: outcome.raw_outputs,
        }
    }

    fn any_backend_failed(&self) -> bool {
        self.backends
            .values()
            .any(|s| s.starts_with("error") || s == "timed out")
    }
}

impl Render for ScanReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Scan: {}", self.path.bold())?;
        writeln!(w, "Scan ID: {}", self.scan_id)?;
        writeln!(w)?;

        writeln!(w, "Backends:")?;
        for (name, status) in &self.backends {
            let status_str = if status.starts_with("error") || status == "timed out" {
                status.red().to_string()
            } else if status.starts_with("skipped") {
                status.yellow().to_string()
            } else {
                status.green().to_string()
            };
            writeln!(w, "  {name:<12} {status_str}")?;
        }
        writeln!(w)?;

        let summary_str = format!(
            "{} total (H:{} M:{} L:{}) across {} files",
            self.summary.total,
            self.summary.high,
            self.summary.medium,
            self.summary.low,
            self.summary.affected_files,
        );
        if self.summary.total > 0 {
            writeln!(w, "Issues: {}", summary_str.red().bold())?;
        } else {
            writeln!(w, "Issues: {}", summary_str.green().bold())?;
        }
        writeln!(w)?;

        if self.findings.is_empty() {
            if self.any_backend_failed() {
                writeln!(w, "{}", "No issues found, but some backends failed.".yellow())?;
            } else {
                writeln!(w, "{}", "No issues found.".green())?;
            }
        } else {
            writeln!(
                w,
                "{:<8} {:<8} {:<30} {:<6} {:<20} Message",
                "Severity", "Conf", "File", "Line", "Category"
            )?;
            writeln!(w, "{}", "-".repeat(100))?;
            for issue in &self.findings {
                writeln!(
                    w,
                    "{:<8} {:<8} {:<30} {:<6} {:<20} {}",
                    issue.severity.to_string(),
                    issue.confidence.to_string(),
                    truncate(&issue.source_file, 30),
                    issue.line_number,
                    truncate(&issue.category, 20),
                    issue.message,
                )?;
                if let Some(fix) = &issue.suggested_fix {
                    writeln!(w, "{:>17} fix: {}", "", fix)?;
                }
            }
        }

        if !self.raw_outputs.is_empty() {
            writeln!(w)?;
            for (name, raw) in &self.raw_outputs {
                writeln!(w, "--- raw output: {name} ---")?;
                writeln!(w, "{raw}")?;
            }
        }

        Ok(())
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
