//! Error types for CLI operations.

use contracts::{ContractError, ErrorKind};
use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration could not be loaded or failed validation
    #[error("Failed to load configuration from {path}: {source}")]
    Config {
        path: String,
        #[source]
        source: ContractError,
    },

    /// A command-line value was rejected before anything ran
    #[error("Invalid argument: {0}")]
    InvalidArgument(#[source] ContractError),

    /// The pre-scaler or the pipeline reported a failure
    #[error("{operation} failed with {kind}: {message}")]
    RunFailed {
        operation: &'static str,
        kind: ErrorKind,
        message: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub fn config(path: impl Into<String>, source: ContractError) -> Self {
        Self::Config {
            path: path.into(),
            source,
        }
    }

    pub fn run_failed(operation: &'static str, error: &ContractError) -> Self {
        Self::RunFailed {
            operation,
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_failed_carries_kind_name() {
        let source = ContractError::Verification { missing: vec![] };
        let err = CliError::run_failed("Reconstruction", &source);
        assert!(err.to_string().starts_with("Reconstruction failed with VerificationError"));
    }
}
