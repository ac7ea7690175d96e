//! Mock command runner
//!
//! Records every invocation and simulates the tools' filesystem effects:
//! - `database_creator` touches the `--database_path` file
//! - `mapper` writes the three artifact files under `<--output_path>/0`
//! - `<in> -resize <geometry> <out>` copies `<in>` to `<out>`
//!
//! Failures are injected by subcommand or by file name.

use std::ffi::OsStr;
use std::path::Path;
use std::sync::Mutex;

use contracts::{CommandOutput, CommandSpec, ARTIFACT_FILES, RESULT_SUBDIR};
use tracing::instrument;

use crate::error::{Result, RunnerError};
use crate::runner::CommandRunner;

/// Mock runner configuration
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Subcommands (e.g. `spatial_matcher`) or file names (e.g. `b.jpg`)
    /// whose invocation exits non-zero
    pub fail_on: Vec<String>,
    /// Program names that cannot be launched
    pub missing_programs: Vec<String>,
    /// `mapper` exits zero but writes no artifacts
    pub skip_artifacts: bool,
    /// Exit code of injected failures
    pub failure_exit_code: i32,
    /// Stderr of injected failures
    pub failure_stderr: String,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            fail_on: Vec::new(),
            missing_programs: Vec::new(),
            skip_artifacts: false,
            failure_exit_code: 1,
            failure_stderr: "mock failure".to_string(),
        }
    }
}

/// Mock runner
pub struct MockRunner {
    config: MockConfig,
    invocations: Mutex<Vec<CommandSpec>>,
}

impl MockRunner {
    /// Create a runner where every tool succeeds
    pub fn new() -> Self {
        Self::with_config(MockConfig::default())
    }

    /// Create a runner with failure injection
    pub fn with_config(config: MockConfig) -> Self {
        Self {
            config,
            invocations: Mutex::new(Vec::new()),
        }
    }

    /// Shorthand for a runner failing on one subcommand or file name
    pub fn failing_on(token: impl Into<String>) -> Self {
        Self::with_config(MockConfig {
            fail_on: vec![token.into()],
            ..Default::default()
        })
    }

    /// Every command received, in order
    pub fn invocations(&self) -> Vec<CommandSpec> {
        self.invocations.lock().unwrap().clone()
    }

    pub fn invocation_count(&self) -> usize {
        self.invocations.lock().unwrap().len()
    }

    /// First argument of every command received, in order
    pub fn subcommands(&self) -> Vec<String> {
        self.invocations
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.subcommand().unwrap_or_default().to_string())
            .collect()
    }

    fn is_missing(&self, command: &CommandSpec) -> bool {
        let program = file_name(command.program());
        self.config.missing_programs.iter().any(|p| *p == program)
    }

    fn should_fail(&self, command: &CommandSpec) -> bool {
        let subcommand = command.subcommand().unwrap_or_default();
        self.config.fail_on.iter().any(|token| {
            token == subcommand || command.args().iter().any(|arg| file_name(arg) == *token)
        })
    }

    fn simulate(&self, command: &CommandSpec) -> Result<()> {
        match command.subcommand() {
            Some("database_creator") => {
                if let Some(db) = command.flag_value("--database_path") {
                    std::fs::write(db, b"")?;
                }
            }
            Some("mapper") if !self.config.skip_artifacts => {
                if let Some(sparse) = command.flag_value("--output_path") {
                    let model_dir = sparse.join(RESULT_SUBDIR);
                    std::fs::create_dir_all(&model_dir)?;
                    for name in ARTIFACT_FILES {
                        std::fs::write(model_dir.join(name), b"mock")?;
                    }
                }
            }
            _ if is_resize(command) => {
                let args = command.args();
                std::fs::copy(Path::new(&args[0]), Path::new(&args[3]))?;
            }
            _ => {}
        }
        Ok(())
    }
}

impl Default for MockRunner {
    fn default() -> Self {
        Self::new()
    }
}

/// `<in> -resize <geometry> <out>`
fn is_resize(command: &CommandSpec) -> bool {
    let args = command.args();
    args.len() == 4 && args[1] == "-resize"
}

fn file_name(path: &OsStr) -> String {
    Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

impl CommandRunner for MockRunner {
    #[instrument(name = "mock_runner_run", skip(self, command), fields(command = %command))]
    async fn run(&self, command: &CommandSpec) -> Result<CommandOutput> {
        self.invocations.lock().unwrap().push(command.clone());

        if self.is_missing(command) {
            return Err(RunnerError::launch(
                command.display(),
                std::io::Error::new(std::io::ErrorKind::NotFound, "program not found"),
            ));
        }

        if self.should_fail(command) {
            return Ok(CommandOutput {
                exit_code: Some(self.config.failure_exit_code),
                stdout: String::new(),
                stderr: self.config.failure_stderr.clone(),
            });
        }

        self.simulate(command)?;

        // convert is silent on success
        let stdout = match command.subcommand() {
            Some(sub) if !is_resize(command) => format!("{sub} finished"),
            _ => String::new(),
        };

        Ok(CommandOutput {
            exit_code: Some(0),
            stdout,
            stderr: String::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_records_invocations() {
        let runner = MockRunner::new();
        let spec = CommandSpec::new("colmap").arg("exhaustive_matcher");
        let output = runner.run(&spec).await.unwrap();

        assert!(output.success());
        assert_eq!(output.stdout, "exhaustive_matcher finished");
        assert_eq!(runner.subcommands(), vec!["exhaustive_matcher"]);
    }

    #[tokio::test]
    async fn test_mock_mapper_writes_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let sparse = dir.path().join("sparse");
        std::fs::create_dir_all(&sparse).unwrap();

        let runner = MockRunner::new();
        let spec = CommandSpec::new("colmap")
            .arg("mapper")
            .flag("--output_path", &sparse);
        runner.run(&spec).await.unwrap();

        for name in ARTIFACT_FILES {
            assert!(sparse.join("0").join(name).is_file(), "{name} missing");
        }
    }

    #[tokio::test]
    async fn test_mock_resize_copies_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("a.jpg");
        let output = dir.path().join("out.jpg");
        std::fs::write(&input, b"pixels").unwrap();

        let runner = MockRunner::new();
        let spec = CommandSpec::new("convert")
            .arg(&input)
            .arg("-resize")
            .arg("50%")
            .arg(&output);
        let result = runner.run(&spec).await.unwrap();

        assert!(result.success());
        assert!(result.stdout.is_empty());
        assert_eq!(std::fs::read(&output).unwrap(), b"pixels");
    }

    #[tokio::test]
    async fn test_mock_injected_failure_by_file_name() {
        let runner = MockRunner::with_config(MockConfig {
            fail_on: vec!["bad.png".into()],
            failure_stderr: "convert: corrupt image".into(),
            ..Default::default()
        });
        let spec = CommandSpec::new("convert")
            .arg("/in/bad.png")
            .arg("-resize")
            .arg("25%")
            .arg("/out/bad.png");
        let result = runner.run(&spec).await.unwrap();

        assert_eq!(result.exit_code, Some(1));
        assert_eq!(result.stderr, "convert: corrupt image");
    }

    #[tokio::test]
    async fn test_mock_missing_program() {
        let runner = MockRunner::with_config(MockConfig {
            missing_programs: vec!["colmap".into()],
            ..Default::default()
        });
        let spec = CommandSpec::new("/usr/local/bin/colmap").arg("database_creator");

        let err = runner.run(&spec).await.unwrap_err();
        assert!(matches!(err, RunnerError::Launch { .. }));
        assert_eq!(runner.invocation_count(), 1);
    }
}
