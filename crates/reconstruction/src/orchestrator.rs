//! Pipeline orchestrator
//!
//! Runs the stage table against one workspace. Each stage is awaited to
//! completion before the next one starts, and the first failure ends the
//! run. The outcome is always a [`PipelineReport`] carrying the full log.

use std::path::{Path, PathBuf};
use std::time::Instant;

use contracts::{
    ArtifactStatus, ContractError, MatchingMode, PipelineReport, PipelineState, RunLog,
    RunnerBlueprint, Stage, StageKind, StageRecord, Workspace,
};
use tool_runner::CommandRunner;
use tracing::{info, instrument, warn};

use crate::stages::build_stages;
use crate::verify::verify_artifacts;

/// Reconstruction pipeline
pub struct Orchestrator<R> {
    runner: R,
    colmap: String,
}

/// Everything accumulated while the pipeline runs
#[derive(Default)]
struct Progress {
    log: RunLog,
    reached: PipelineState,
    stages: Vec<StageRecord>,
    artifacts: Vec<ArtifactStatus>,
}

impl Progress {
    fn into_report(
        self,
        workspace: &Workspace,
        result: Result<PathBuf, ContractError>,
    ) -> PipelineReport {
        PipelineReport {
            workspace: workspace.root().to_path_buf(),
            reached: self.reached,
            log: self.log,
            stages: self.stages,
            artifacts: self.artifacts,
            result,
        }
    }
}

impl<R: CommandRunner> Orchestrator<R> {
    pub fn new(runner: R, colmap: impl Into<String>) -> Self {
        Self {
            runner,
            colmap: colmap.into(),
        }
    }

    pub fn from_blueprint(runner: R, blueprint: &RunnerBlueprint) -> Self {
        Self::new(runner, blueprint.tools.colmap.clone())
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Stages that [`Orchestrator::run`] would execute, without running them
    pub fn plan(&self, workspace: &Workspace, mode: MatchingMode) -> Vec<Stage> {
        build_stages(&self.colmap, workspace, mode)
    }

    /// Parse `mode` and run the pipeline
    ///
    /// An unknown mode name fails before any command is spawned.
    pub async fn run_with_mode_name(&self, workspace: &Workspace, mode: &str) -> PipelineReport {
        match mode.parse::<MatchingMode>() {
            Ok(mode) => self.run(workspace, mode).await,
            Err(e) => {
                let mut progress = Progress::default();
                progress.log.push(format!(
                    "Using workspace: {}",
                    workspace.root().display()
                ));
                progress.log.push(format!("Error: {e}"));
                warn!(error = %e, "rejected matching mode");
                progress.into_report(workspace, Err(e))
            }
        }
    }

    #[instrument(
        name = "reconstruction",
        skip(self, workspace),
        fields(workspace = %workspace.root().display(), mode = %mode)
    )]
    pub async fn run(&self, workspace: &Workspace, mode: MatchingMode) -> PipelineReport {
        let mut progress = Progress::default();
        progress
            .log
            .push(format!("Using workspace: {}", workspace.root().display()));

        let result = self.execute(workspace, mode, &mut progress).await;

        match &result {
            Ok(dir) => info!(result_dir = %dir.display(), "reconstruction succeeded"),
            Err(e) => warn!(
                kind = %e.kind(),
                reached = %progress.reached,
                error = %e,
                "reconstruction failed"
            ),
        }

        progress.into_report(workspace, result)
    }

    async fn execute(
        &self,
        workspace: &Workspace,
        mode: MatchingMode,
        progress: &mut Progress,
    ) -> Result<PathBuf, ContractError> {
        check_images(workspace, &mut progress.log).await?;

        for stage in build_stages(&self.colmap, workspace, mode) {
            if stage.kind == StageKind::Reconstruct {
                let sparse = workspace.sparse_dir();
                if let Err(e) = tokio::fs::create_dir_all(&sparse).await {
                    progress.log.push(format!(
                        "Error: could not create {}: {e}",
                        sparse.display()
                    ));
                    return Err(e.into());
                }
            }

            self.run_stage(&stage, progress).await?;
            progress.reached = stage.kind.completes();
        }

        let verification = verify_artifacts(workspace);
        progress.artifacts = verification.artifacts.clone();

        if verification.is_complete() {
            let result_dir = workspace.result_dir();
            progress.reached = PipelineState::Verified;
            progress
                .log
                .push("COLMAP reconstruction completed successfully!");
            progress
                .log
                .push(format!("Results are in: {}", result_dir.display()));
            Ok(result_dir)
        } else {
            progress
                .log
                .push("Error: COLMAP did not generate the expected output files.");
            for line in verification.status_lines() {
                progress.log.push(line);
            }
            Err(ContractError::Verification {
                missing: verification.missing(),
            })
        }
    }

    async fn run_stage(&self, stage: &Stage, progress: &mut Progress) -> Result<(), ContractError> {
        let description = stage.description();
        let command_line = stage.command.display();
        progress.log.push(format!("=== {description} ==="));
        progress.log.push(format!("Running: {command_line}"));

        let started = Instant::now();
        let outcome = self.runner.run(&stage.command).await;
        let duration = started.elapsed();

        let exit_code = outcome.as_ref().ok().and_then(|output| output.exit_code);
        progress.stages.push(StageRecord {
            kind: stage.kind,
            description,
            command_line: command_line.clone(),
            exit_code,
            duration,
        });

        let output = match outcome {
            Ok(output) => output,
            Err(e) => {
                progress.log.push(format!("Error: {e}"));
                progress.log.push(stage.kind.failure_message());
                return Err(e.into());
            }
        };

        if !output.stdout.is_empty() {
            progress.log.push("STDOUT:");
            progress.log.push(output.stdout.as_str());
        }
        if !output.stderr.is_empty() {
            progress.log.push("STDERR:");
            progress.log.push(output.stderr.as_str());
        }

        info!(
            stage = stage.kind.metric_label(),
            exit_code = ?output.exit_code,
            elapsed_ms = duration.as_millis() as u64,
            "stage finished"
        );

        if output.success() {
            Ok(())
        } else {
            progress.log.push(stage.kind.failure_message());
            Err(ContractError::external_process(
                command_line,
                output.exit_code,
                output.stderr,
            ))
        }
    }
}

/// `images/` must exist and hold at least one file
async fn check_images(workspace: &Workspace, log: &mut RunLog) -> Result<(), ContractError> {
    let images = workspace.images_dir();
    if !images.is_dir() {
        log.push("Error: The workspace does not contain an 'images' folder.");
        return Err(ContractError::missing_input(
            &images,
            "images directory not found",
        ));
    }

    match has_file(&images).await {
        Ok(true) => Ok(()),
        Ok(false) => {
            log.push("Error: The 'images' folder is empty.");
            Err(ContractError::missing_input(&images, "images directory is empty"))
        }
        Err(e) => {
            log.push(format!("Error: could not read {}: {e}", images.display()));
            Err(e.into())
        }
    }
}

async fn has_file(dir: &Path) -> std::io::Result<bool> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_file() {
            return Ok(true);
        }
    }
    Ok(false)
}
