//! `omniscan backends` command handler

use std::io::Write;

use serde::Serialize;

use omniscan_core::OmniscanConfig;

use crate::cli::BackendsArgs;
use crate::commands::build_registry;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `backends` command.
pub fn execute(
    _args: BackendsArgs,
    config: &OmniscanConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let registry = build_registry(config)?;

    let report = BackendsReport {
        backends: registry
            .all()
            .iter()
            .map(|entry| BackendEntry {
                name: entry.name().to_owned(),
                kind: entry.kind().to_string(),
                description: entry.description().to_owned(),
            })
            .collect(),
    };

    writer.render(&report)?;
    Ok(())
}

#[derive(Serialize)]
pub struct BackendsReport {
    pub backends: Vec<BackendEntry>,
}

#[derive(Serialize)]
pub struct BackendEntry {
    pub name: String,
    pub kind: String,
    pub description: String,
}

impl Render for BackendsReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "{:<12} {:<8} Description", "Name", "Kind")?;
        writeln!(w, "{}", "-".repeat(60))?;
        for backend in &self.backends {
            writeln!(
                w,
                "{:<12} {:<8} {}",
                backend.name, backend.kind, backend.description
            )?;
        }
        Ok(())
    }
}
