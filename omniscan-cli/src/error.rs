//! CLI-specific error types and exit code mapping

use omniscan_core::OmniscanError;

/// CLI-specific error type.
///
/// Each variant carries enough context for a user-friendly message.
/// The `exit_code()` method maps errors to stable process exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// The scan completed and reported findings (non-zero exit by design of the scan command).
    #[error("{0}")]
    FindingsReported(String),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (file read, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from omniscan-core.
    #[error("{0}")]
    Core(#[from] OmniscanError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                            |
    /// |------|------------------------------------|
    /// | 0    | Success                            |
    /// | 1    | General / command error            |
    /// | 2    | Configuration error                |
    /// | 4    | Scan found issues                  |
    /// | 10   | IO error                           |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            Self::FindingsReported(_) => 4,
            Self::Io(_) => 10,
            Self::JsonSerialize(_) | Self::Command(_) => 1,
            Self::Core(e) => match e {
                OmniscanError::Config(_) => 2,
                OmniscanError::Io(_) => 10,
                _ => 1,
            },
        }
    }
}

impl From<omniscan_semantic::SemanticError> for CliError {
    fn from(e: omniscan_semantic::SemanticError) -> Self {
        Self::Config(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_exits_2() {
        let err = CliError::Config("bad value".to_owned());
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn findings_exit_4() {
        let err = CliError::FindingsReported("found 3 issues".to_owned());
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn io_error_exits_10() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        assert_eq!(CliError::Io(io_err).exit_code(), 10);
    }

    #[test]
    fn core_config_error_exits_2() {
        let core = OmniscanError::Config(omniscan_core::ConfigError::ParseFailed {
            reason: "bad toml".to_owned(),
        });
        assert_eq!(CliError::Core(core).exit_code(), 2);
    }

    #[test]
    fn command_error_exits_1() {
        assert_eq!(CliError::Command("nope".to_owned()).exit_code(), 1);
    }
}
