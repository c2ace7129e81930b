//! omniscan CLI entry point
//!
//! Parses arguments, loads configuration, initializes logging, then
//! dispatches to the subcommand handlers. Errors map to stable exit
//! codes via `CliError::exit_code()`.

mod cli;
mod commands;
mod error;
mod logging;
mod output;

use clap::Parser;

use omniscan_core::OmniscanConfig;

use crate::cli::{Cli, Commands};
use crate::error::CliError;
use crate::output::OutputWriter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("error: {e}");
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = load_config(&cli).await?;
    if let Some(level) = &cli.log_level {
        config.general.log_level = level.clone();
    }
    config.validate()?;

    logging::init_tracing(&config.general)?;

    let writer = OutputWriter::new(cli.output);
    match cli.command {
        Commands::Scan(args) => commands::scan::execute(args, &config, &writer).await,
        Commands::Backends(args) => commands::backends::execute(args, &config, &writer),
        Commands::Config(args) => {
            commands::config::execute(args, &cli.config, &config, &writer).await
        }
    }
}

/// Load configuration from the given file, falling back to defaults
/// (plus env overrides) when the default config file is absent.
async fn load_config(cli: &Cli) -> Result<OmniscanConfig, CliError> {
    if cli.config.exists() {
        return Ok(OmniscanConfig::load(&cli.config).await?);
    }

    // A config path the user asked for explicitly must exist
    if cli.config.as_os_str() != "omniscan.toml" {
        return Err(CliError::Config(format!(
            "config file not found: {}",
            cli.config.display()
        )));
    }

    let mut config = OmniscanConfig::default();
    config.apply_env_overrides();
    Ok(config)
}
