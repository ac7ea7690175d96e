//! # Tool Runner
//!
//! External command execution.
//!
//! Responsibilities:
//! - Launch external tools from a structured [`contracts::CommandSpec`]
//!   (program plus argument vector, no shell)
//! - Capture exit code, stdout and stderr in full
//! - Provide a mock runner that simulates COLMAP and `convert` for tests,
//!   with failure injection

pub mod error;
pub mod mock_runner;
pub mod runner;
pub mod system_runner;

pub use contracts::{CommandOutput, CommandSpec};
pub use error::{Result, RunnerError};
pub use mock_runner::{MockConfig, MockRunner};
pub use runner::CommandRunner;
pub use system_runner::SystemRunner;
