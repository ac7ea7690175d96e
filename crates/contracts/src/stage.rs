//! Reconstruction stages and pipeline states.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::{CommandSpec, MatchingMode};

/// Linear pipeline state, in the order states are reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub enum PipelineState {
    #[default]
    Start,
    DatabaseCreated,
    FeaturesExtracted,
    Matched,
    Reconstructed,
    Verified,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// The four external steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StageKind {
    CreateDatabase,
    ExtractFeatures,
    MatchFeatures(MatchingMode),
    Reconstruct,
}

impl StageKind {
    pub fn description(self) -> String {
        match self {
            Self::CreateDatabase => "Creating database".to_string(),
            Self::ExtractFeatures => "Extracting features".to_string(),
            Self::MatchFeatures(mode) => format!("Running {} matching", mode.label()),
            Self::Reconstruct => "Running sparse reconstruction".to_string(),
        }
    }

    /// Log line appended when the stage's command fails
    pub fn failure_message(self) -> &'static str {
        match self {
            Self::CreateDatabase => "Error during database creation.",
            Self::ExtractFeatures => "Error during feature extraction.",
            Self::MatchFeatures(_) => "Error during feature matching.",
            Self::Reconstruct => "Error during sparse reconstruction.",
        }
    }

    /// State entered once the stage exits zero
    pub fn completes(self) -> PipelineState {
        match self {
            Self::CreateDatabase => PipelineState::DatabaseCreated,
            Self::ExtractFeatures => PipelineState::FeaturesExtracted,
            Self::MatchFeatures(_) => PipelineState::Matched,
            Self::Reconstruct => PipelineState::Reconstructed,
        }
    }

    /// Short name for metrics labels
    pub fn metric_label(self) -> &'static str {
        match self {
            Self::CreateDatabase => "database_creator",
            Self::ExtractFeatures => "feature_extractor",
            Self::MatchFeatures(mode) => mode.matcher_subcommand(),
            Self::Reconstruct => "mapper",
        }
    }
}

/// A stage ready to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    pub kind: StageKind,
    pub command: CommandSpec,
}

impl Stage {
    pub fn new(kind: StageKind, command: CommandSpec) -> Self {
        Self { kind, command }
    }

    pub fn description(&self) -> String {
        self.kind.description()
    }
}

/// What happened when a stage ran
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageRecord {
    pub kind: StageKind,
    pub description: String,
    pub command_line: String,
    /// `None` when the command could not be launched or was killed
    pub exit_code: Option<i32>,
    pub duration: Duration,
}

impl StageRecord {
    pub fn succeeded(&self) -> bool {
        self.exit_code == Some(0)
    }
}
