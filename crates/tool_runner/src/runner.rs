//! Command runner abstraction
//!
//! Defines the trait the pre-scaler and the pipeline use to run external
//! tools, supporting the real implementation and mock testing.

use std::future::Future;
use std::sync::Arc;

use contracts::{CommandOutput, CommandSpec};

use crate::error::Result;

/// Command runner trait
///
/// Runs one command to completion and returns what it produced. A non-zero
/// exit is a successful `run`; only a failure to launch is an `Err`.
pub trait CommandRunner: Send + Sync {
    /// Run `command` and wait for it to exit
    fn run(&self, command: &CommandSpec) -> impl Future<Output = Result<CommandOutput>> + Send;
}

impl<R: CommandRunner> CommandRunner for &R {
    fn run(&self, command: &CommandSpec) -> impl Future<Output = Result<CommandOutput>> + Send {
        (**self).run(command)
    }
}

impl<R: CommandRunner> CommandRunner for Arc<R> {
    fn run(&self, command: &CommandSpec) -> impl Future<Output = Result<CommandOutput>> + Send {
        (**self).run(command)
    }
}
