//! Real command runner
//!
//! Spawns the program with `tokio::process` and waits for it. Output is
//! captured whole; there is no streaming and no timeout.

use std::process::Stdio;

use contracts::{CommandOutput, CommandSpec};
use tokio::process::Command;
use tracing::{debug, instrument};

use crate::error::{Result, RunnerError};
use crate::runner::CommandRunner;

/// Runs commands as child processes of this one
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for SystemRunner {
    #[instrument(name = "system_runner_run", skip(self, command), fields(command = %command))]
    async fn run(&self, command: &CommandSpec) -> Result<CommandOutput> {
        let output = Command::new(command.program())
            .args(command.args())
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| RunnerError::launch(command.display(), source))?;

        let result = CommandOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        debug!(
            exit_code = ?result.exit_code,
            stdout_bytes = output.stdout.len(),
            stderr_bytes = output.stderr.len(),
            "command finished"
        );

        Ok(result)
    }
}
