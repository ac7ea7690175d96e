//! Run session - lock, pre-scale, reconstruct.
//!
//! One session covers one CLI invocation against one workspace. The logs of
//! the pre-scaler and the orchestrator are merged into a single log, in the
//! order the lines were produced.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use contracts::{
    ArtifactStatus, ContractError, PipelineState, PrescaleSummary, RunLog, RunnerBlueprint,
    ScalingMode, StageRecord, UnscaledPolicy, Workspace,
};
use prescaler::Prescaler;
use reconstruction::{Orchestrator, WorkspaceLock};
use tool_runner::CommandRunner;
use tracing::{info, instrument};

use crate::cli::{PrescaleArgs, RunArgs};
use crate::error::{CliError, Result};

/// Settings after merging configuration and command-line overrides
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub workspace: Workspace,
    /// Kept as text so an unknown name is reported in the run log
    pub matching: String,
    pub scaling: ScalingMode,
    pub unscaled_policy: UnscaledPolicy,
    pub colmap: String,
    pub convert: String,
    pub lock: bool,
}

impl SessionSettings {
    pub fn for_run(blueprint: &RunnerBlueprint, args: &RunArgs) -> Result<Self> {
        Ok(Self {
            workspace: Workspace::new(&args.workspace),
            matching: args
                .matching
                .clone()
                .unwrap_or_else(|| blueprint.pipeline.matching.to_string()),
            scaling: parse_or(args.scaling.as_deref(), blueprint.prescale.scaling)?,
            unscaled_policy: parse_or(
                args.unscaled_policy.as_deref(),
                blueprint.prescale.unscaled_policy,
            )?,
            colmap: args
                .tools
                .colmap
                .clone()
                .unwrap_or_else(|| blueprint.tools.colmap.clone()),
            convert: args
                .tools
                .convert
                .clone()
                .unwrap_or_else(|| blueprint.tools.convert.clone()),
            lock: args.lock || blueprint.pipeline.lock_workspace,
        })
    }

    pub fn for_prescale(blueprint: &RunnerBlueprint, args: &PrescaleArgs) -> Result<Self> {
        Ok(Self {
            workspace: Workspace::new(&args.workspace),
            matching: blueprint.pipeline.matching.to_string(),
            scaling: parse_or(args.scaling.as_deref(), blueprint.prescale.scaling)?,
            unscaled_policy: parse_or(
                args.unscaled_policy.as_deref(),
                blueprint.prescale.unscaled_policy,
            )?,
            colmap: blueprint.tools.colmap.clone(),
            convert: args
                .convert
                .clone()
                .unwrap_or_else(|| blueprint.tools.convert.clone()),
            lock: args.lock || blueprint.pipeline.lock_workspace,
        })
    }
}

fn parse_or<T>(value: Option<&str>, default: T) -> Result<T>
where
    T: std::str::FromStr<Err = ContractError>,
{
    match value {
        Some(text) => text.parse().map_err(CliError::InvalidArgument),
        None => Ok(default),
    }
}

/// Merged outcome of a session
#[derive(Debug)]
pub struct SessionReport {
    pub workspace: PathBuf,
    pub log: RunLog,
    /// Present when images were scaled
    pub prescale: Option<PrescaleSummary>,
    pub reached: PipelineState,
    pub stages: Vec<StageRecord>,
    pub artifacts: Vec<ArtifactStatus>,
    pub duration: Duration,
    /// Result directory on a full run, target image directory on a pre-scale
    pub result: std::result::Result<PathBuf, ContractError>,
}

impl SessionReport {
    fn new(workspace: &Workspace) -> Self {
        Self {
            workspace: workspace.root().to_path_buf(),
            log: RunLog::new(),
            prescale: None,
            reached: PipelineState::Start,
            stages: Vec::new(),
            artifacts: Vec::new(),
            duration: Duration::ZERO,
            result: Ok(workspace.root().to_path_buf()),
        }
    }

    fn finish(
        mut self,
        result: std::result::Result<PathBuf, ContractError>,
        started: Instant,
    ) -> Self {
        self.result = result;
        self.duration = started.elapsed();
        self
    }

    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// One CLI run against one workspace
pub struct Session<R> {
    runner: R,
    settings: SessionSettings,
}

impl<R: CommandRunner> Session<R> {
    pub fn new(runner: R, settings: SessionSettings) -> Self {
        Self { runner, settings }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Optional pre-scale followed by the reconstruction pipeline
    #[instrument(name = "session_run", skip(self), fields(workspace = %self.settings.workspace.root().display()))]
    pub async fn run(&self) -> SessionReport {
        let started = Instant::now();
        let workspace = &self.settings.workspace;
        let mut report = SessionReport::new(workspace);

        let _lock = match self.lock(&mut report.log) {
            Ok(lock) => lock,
            Err(e) => return report.finish(Err(e), started),
        };

        if !self.settings.scaling.is_noop() {
            if let Err(e) = self.prescale_into(&mut report).await {
                return report.finish(Err(e), started);
            }
        }

        let orchestrator = Orchestrator::new(&self.runner, self.settings.colmap.as_str());
        let pipeline = orchestrator
            .run_with_mode_name(workspace, &self.settings.matching)
            .await;
        observability::record_pipeline_report(&pipeline);

        report.log.extend(pipeline.log);
        report.reached = pipeline.reached;
        report.stages = pipeline.stages;
        report.artifacts = pipeline.artifacts;

        info!(success = pipeline.result.is_ok(), "session finished");
        report.finish(pipeline.result, started)
    }

    /// Pre-scaler alone
    #[instrument(name = "session_prescale", skip(self), fields(workspace = %self.settings.workspace.root().display()))]
    pub async fn prescale(&self) -> SessionReport {
        let started = Instant::now();
        let mut report = SessionReport::new(&self.settings.workspace);

        let _lock = match self.lock(&mut report.log) {
            Ok(lock) => lock,
            Err(e) => return report.finish(Err(e), started),
        };

        let result = self
            .prescale_into(&mut report)
            .await
            .map(|()| self.settings.workspace.images_dir());
        report.finish(result, started)
    }

    async fn prescale_into(&self, report: &mut SessionReport) -> std::result::Result<(), ContractError> {
        let prescaler = Prescaler::new(&self.runner, self.settings.convert.as_str())
            .with_unscaled_policy(self.settings.unscaled_policy);
        let outcome = prescaler
            .run(&self.settings.workspace, self.settings.scaling)
            .await;
        observability::record_prescale_report(&outcome);

        report.log.extend(outcome.log);
        report.prescale = outcome.result?;
        Ok(())
    }

    fn lock(&self, log: &mut RunLog) -> std::result::Result<Option<WorkspaceLock>, ContractError> {
        if !self.settings.lock {
            return Ok(None);
        }
        let images = self.settings.workspace.images_dir();
        if !images.is_dir() {
            log.push("Error: The workspace does not contain an 'images' folder.");
            return Err(ContractError::missing_input(
                &images,
                "images directory not found",
            ));
        }
        match WorkspaceLock::acquire(&self.settings.workspace) {
            Ok(lock) => Ok(Some(lock)),
            Err(e) => {
                log.push(format!("Error: {e}"));
                Err(e)
            }
        }
    }
}
