//! CLI argument parsing using clap derive API
//!
//! Purely declarative argument definitions, no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use omniscan_engine::ScanMode;

/// Omniscan -- multi-backend static analysis orchestrator.
///
/// Use `omniscan <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "omniscan", version, about, long_about = None)]
pub struct Cli {
    /// Path to the omniscan.toml configuration file.
    #[arg(short, long, default_value = "omniscan.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table / text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a scan over a target directory.
    Scan(ScanArgs),

    /// List registered backends.
    Backends(BackendsArgs),

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- scan ----

/// Run all (or selected) backends against a target directory.
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Directory to scan (default: current directory).
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Comma-separated backend names (default: all registered).
    #[arg(long, value_delimiter = ',')]
    pub backends: Vec<String>,

    /// Which backend kinds to run.
    #[arg(long, default_value = "full")]
    pub mode: ModeArg,

    /// Include each backend's native raw output in the report.
    #[arg(long)]
    pub raw: bool,
}

/// Backend kind filter.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ModeArg {
    /// Local process backends only.
    Process,
    /// Remote semantic backend only.
    Semantic,
    /// Everything enabled in config.
    Full,
}

impl From<ModeArg> for ScanMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Process => ScanMode::Process,
            ModeArg::Semantic => ScanMode::Semantic,
            ModeArg::Full => ScanMode::Full,
        }
    }
}

// ---- backends ----

/// List backends that would be available for a scan.
#[derive(Args, Debug)]
pub struct BackendsArgs {}

// ---- config ----

/// Inspect or validate the configuration file.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Load the configuration and report validation errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Restrict to one section (general, process, semantic).
        section: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn scan_args_parse_backend_list() {
        let cli = Cli::try_parse_from([
            "omniscan",
            "scan",
            "/tmp/project",
            "--backends",
            "bandit,eslint",
            "--mode",
            "process",
        ])
        .unwrap();

        let Commands::Scan(args) = cli.command else {
            panic!("expected scan command");
        };
        assert_eq!(args.backends, vec!["bandit", "eslint"]);
        assert!(matches!(args.mode, ModeArg::Process));
        assert!(!args.raw);
    }

    #[test]
    fn scan_defaults_to_current_directory_and_full_mode() {
        let cli = Cli::try_parse_from(["omniscan", "scan"]).unwrap();
        let Commands::Scan(args) = cli.command else {
            panic!("expected scan command");
        };
        assert_eq!(args.path, PathBuf::from("."));
        assert!(args.backends.is_empty());
        assert!(matches!(args.mode, ModeArg::Full));
    }
}
