//! Prescaler - rebuilds `images/` at a reduced resolution.

use std::path::{Path, PathBuf};

use contracts::{
    is_supported_image, ContractError, PrescaleReport, PrescaleSummary, RunLog, RunnerBlueprint,
    ScalingMode, UnscaledPolicy, Workspace, LONGEST_EDGE_LIMIT,
};
use tool_runner::CommandRunner;
use tracing::{debug, info, instrument, warn};

use crate::resize::{resize_command, within_long_edge};

/// Image pre-scaler
pub struct Prescaler<R> {
    runner: R,
    convert: String,
    unscaled_policy: UnscaledPolicy,
}

/// What to do with one file from the backup directory
enum Action {
    Skip,
    Resize,
    Copy,
    Omit,
}

impl<R: CommandRunner> Prescaler<R> {
    pub fn new(runner: R, convert: impl Into<String>) -> Self {
        Self {
            runner,
            convert: convert.into(),
            unscaled_policy: UnscaledPolicy::default(),
        }
    }

    /// Tool path and unscaled policy taken from configuration
    pub fn from_blueprint(runner: R, blueprint: &RunnerBlueprint) -> Self {
        Self::new(runner, blueprint.tools.convert.clone())
            .with_unscaled_policy(blueprint.prescale.unscaled_policy)
    }

    pub fn with_unscaled_policy(mut self, policy: UnscaledPolicy) -> Self {
        self.unscaled_policy = policy;
        self
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Scale the workspace images according to `mode`
    #[instrument(
        name = "prescale",
        skip(self, workspace),
        fields(workspace = %workspace.root().display(), mode = ?mode)
    )]
    pub async fn run(&self, workspace: &Workspace, mode: ScalingMode) -> PrescaleReport {
        let mut log = RunLog::new();
        let result = self.execute(workspace, mode, &mut log).await;

        match &result {
            Ok(Some(summary)) => info!(
                processed = summary.processed,
                copied = summary.copied,
                omitted = summary.omitted,
                skipped = summary.skipped,
                "prescale finished"
            ),
            Ok(None) => debug!("prescale skipped"),
            Err(e) => warn!(kind = %e.kind(), error = %e, "prescale failed"),
        }

        PrescaleReport { log, result }
    }

    async fn execute(
        &self,
        workspace: &Workspace,
        mode: ScalingMode,
        log: &mut RunLog,
    ) -> Result<Option<PrescaleSummary>, ContractError> {
        let images = workspace.images_dir();
        let backup = workspace.images_backup_dir();

        if !images.is_dir() {
            log.push(format!(
                "Error: The workspace does not contain an 'images' folder: {}",
                images.display()
            ));
            return Err(ContractError::missing_input(&images, "images directory not found"));
        }

        let Some(geometry) = mode.resize_geometry() else {
            log.push("No scaling selected; using the original images.");
            return Ok(None);
        };

        if backup.exists() {
            log.push(format!(
                "Error: {} already exists. Restore or remove it before scaling again.",
                backup.display()
            ));
            return Err(ContractError::conflict(&backup, "backup directory already exists"));
        }

        log.push(format!("Scaling images: {}", mode.label()));

        if let Err(e) = tokio::fs::rename(&images, &backup).await {
            log.push(format!("Error: could not move {} aside: {e}", images.display()));
            return Err(e.into());
        }
        if let Err(e) = tokio::fs::create_dir(&images).await {
            log.push(format!("Error: could not create {}: {e}", images.display()));
            return Err(e.into());
        }
        log.push(format!("Original images moved to {}", backup.display()));

        let sources = match list_files(&backup).await {
            Ok(sources) => sources,
            Err(e) => {
                log.push(format!("Error: could not read {}: {e}", backup.display()));
                return Err(e.into());
            }
        };

        let mut summary = PrescaleSummary {
            mode,
            source_dir: backup.clone(),
            target_dir: images.clone(),
            ..Default::default()
        };

        for source in sources {
            let Some(name) = source.file_name().map(|n| n.to_os_string()) else {
                continue;
            };
            let display_name = name.to_string_lossy().into_owned();
            let target = images.join(&name);

            match self.action_for(&source, mode) {
                Action::Skip => {
                    debug!(file = %display_name, "unsupported extension, skipped");
                    summary.skipped += 1;
                }
                Action::Omit => {
                    log.push(format!(
                        "Omitted {display_name}: already within {LONGEST_EDGE_LIMIT}px"
                    ));
                    summary.omitted += 1;
                }
                Action::Copy => {
                    if let Err(e) = tokio::fs::copy(&source, &target).await {
                        log.push(format!("Error copying {display_name}: {e}"));
                        return Err(e.into());
                    }
                    summary.copied += 1;
                }
                Action::Resize => {
                    let command = resize_command(&self.convert, &source, &geometry, &target);
                    let output = match self.runner.run(&command).await {
                        Ok(output) => output,
                        Err(e) => {
                            log.push(format!("Error resizing {display_name}: {e}"));
                            return Err(e.into());
                        }
                    };

                    if !output.success() {
                        log.push(format!(
                            "Error resizing {display_name}: {}",
                            output.stderr.trim()
                        ));
                        return Err(ContractError::external_process(
                            command.display(),
                            output.exit_code,
                            output.stderr,
                        ));
                    }
                    summary.processed += 1;
                }
            }
        }

        log.push(format!(
            "Processed {} images from {} into {}",
            summary.processed,
            backup.display(),
            images.display()
        ));
        if summary.copied > 0 {
            log.push(format!("Copied {} images unchanged", summary.copied));
        }
        if summary.omitted > 0 {
            log.push(format!("Omitted {} images", summary.omitted));
        }
        if summary.skipped > 0 {
            log.push(format!(
                "Skipped {} files with unsupported extensions",
                summary.skipped
            ));
        }

        Ok(Some(summary))
    }

    fn action_for(&self, source: &Path, mode: ScalingMode) -> Action {
        if !is_supported_image(source) {
            return Action::Skip;
        }
        if mode != ScalingMode::LongestEdge1600 || self.unscaled_policy == UnscaledPolicy::Reencode
        {
            return Action::Resize;
        }

        // Unreadable headers go to the resize tool, which reports its own errors.
        match (within_long_edge(source), self.unscaled_policy) {
            (Some(true), UnscaledPolicy::Copy) => Action::Copy,
            (Some(true), UnscaledPolicy::Omit) => Action::Omit,
            _ => Action::Resize,
        }
    }
}

/// Regular files of `dir`, sorted by name
async fn list_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}
