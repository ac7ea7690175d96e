//! Reports returned by the pre-scaler and the reconstruction pipeline.
//!
//! A report always carries the log, whatever the outcome.

use std::path::PathBuf;

use crate::{ArtifactStatus, ContractError, PipelineState, RunLog, ScalingMode, StageRecord};

/// Result of one reconstruction pipeline run
#[derive(Debug)]
pub struct PipelineReport {
    pub workspace: PathBuf,
    /// Last state reached before success or failure
    pub reached: PipelineState,
    pub log: RunLog,
    pub stages: Vec<StageRecord>,
    /// Empty when the run stopped before verification
    pub artifacts: Vec<ArtifactStatus>,
    /// Result directory (`sparse/0`) on success
    pub result: Result<PathBuf, ContractError>,
}

impl PipelineReport {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn error(&self) -> Option<&ContractError> {
        self.result.as_ref().err()
    }

    pub fn log_text(&self) -> String {
        self.log.to_text()
    }
}

/// Counters and paths of a finished pre-scale
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrescaleSummary {
    pub mode: ScalingMode,
    /// Images written into the working directory by the resize tool
    pub processed: usize,
    /// Images copied verbatim under [`crate::UnscaledPolicy::Copy`]
    pub copied: usize,
    /// Images left out under [`crate::UnscaledPolicy::Omit`]
    pub omitted: usize,
    /// Files with unsupported extensions
    pub skipped: usize,
    pub source_dir: PathBuf,
    pub target_dir: PathBuf,
}

/// Result of one pre-scale request
#[derive(Debug)]
pub struct PrescaleReport {
    pub log: RunLog,
    /// `None` summary means nothing was done (no scaling requested)
    pub result: Result<Option<PrescaleSummary>, ContractError>,
}

impl PrescaleReport {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn error(&self) -> Option<&ContractError> {
        self.result.as_ref().err()
    }
}
