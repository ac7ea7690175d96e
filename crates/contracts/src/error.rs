//! Layered error definitions
//!
//! Categorized by source: config / workspace / mode / external tool / verification

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Workspace Errors =====
    /// Required input directory absent or empty
    #[error("missing input '{}': {message}", path.display())]
    MissingInput { path: PathBuf, message: String },

    /// A directory or lock that must not exist already does
    #[error("conflict at '{}': {message}", path.display())]
    Conflict { path: PathBuf, message: String },

    // ===== Mode Errors =====
    /// Unrecognized mode name
    #[error("invalid {kind} mode '{value}', expected one of: {}", expected.join(", "))]
    InvalidMode {
        kind: &'static str,
        value: String,
        expected: Vec<&'static str>,
    },

    // ===== External Tool Errors =====
    /// Non-zero exit or launch failure of an external tool
    #[error("external process '{command}' failed ({}): {stderr}", describe_exit(*exit_code))]
    ExternalProcess {
        command: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    // ===== Verification Errors =====
    /// Expected artifacts absent after a nominally successful run
    #[error("verification failed, missing artifacts: {missing:?}")]
    Verification { missing: Vec<PathBuf> },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

fn describe_exit(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "no exit code".to_string(),
    }
}

/// Stable error kind names used in reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Config,
    MissingInput,
    Conflict,
    InvalidMode,
    ExternalProcess,
    Verification,
    Io,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Config => "ConfigError",
            Self::MissingInput => "MissingInputError",
            Self::Conflict => "ConflictError",
            Self::InvalidMode => "InvalidModeError",
            Self::ExternalProcess => "ExternalProcessError",
            Self::Verification => "VerificationError",
            Self::Io => "IoError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create missing input error
    pub fn missing_input(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::MissingInput {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create conflict error
    pub fn conflict(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Conflict {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create external process error
    pub fn external_process(
        command: impl Into<String>,
        exit_code: Option<i32>,
        stderr: impl Into<String>,
    ) -> Self {
        Self::ExternalProcess {
            command: command.into(),
            exit_code,
            stderr: stderr.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ConfigParse { .. } | Self::ConfigValidation { .. } => ErrorKind::Config,
            Self::MissingInput { .. } => ErrorKind::MissingInput,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::InvalidMode { .. } => ErrorKind::InvalidMode,
            Self::ExternalProcess { .. } => ErrorKind::ExternalProcess,
            Self::Verification { .. } => ErrorKind::Verification,
            Self::Io(_) => ErrorKind::Io,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names_are_stable() {
        let err = ContractError::missing_input("/tmp/ws/images", "not found");
        assert_eq!(err.kind(), ErrorKind::MissingInput);
        assert_eq!(err.kind().to_string(), "MissingInputError");

        let err = ContractError::external_process("colmap mapper", Some(3), "boom");
        assert_eq!(err.kind().as_str(), "ExternalProcessError");
        assert!(err.to_string().contains("exit code 3"), "got: {err}");
    }

    #[test]
    fn invalid_mode_lists_expected_values() {
        let err = ContractError::InvalidMode {
            kind: "matching",
            value: "Vocab".into(),
            expected: vec!["exhaustive", "sequential", "spatial"],
        };
        let msg = err.to_string();
        assert!(msg.contains("'Vocab'"), "got: {msg}");
        assert!(msg.contains("exhaustive, sequential, spatial"), "got: {msg}");
    }
}
