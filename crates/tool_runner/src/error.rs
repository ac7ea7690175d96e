//! Tool Runner error types

use contracts::ContractError;
use thiserror::Error;

/// Tool Runner specific error
#[derive(Debug, Error)]
pub enum RunnerError {
    /// The program could not be started
    #[error("failed to launch '{command}': {source}")]
    Launch {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Filesystem error while simulating a tool
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl RunnerError {
    pub fn launch(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::Launch {
            command: command.into(),
            source,
        }
    }
}

/// A launch failure is reported like any other failed external process.
impl From<RunnerError> for ContractError {
    fn from(err: RunnerError) -> Self {
        match err {
            RunnerError::Launch { command, source } => {
                ContractError::external_process(command, None, source.to_string())
            }
            RunnerError::Io(source) => ContractError::Io(source),
        }
    }
}

/// Result alias
pub type Result<T> = std::result::Result<T, RunnerError>;
