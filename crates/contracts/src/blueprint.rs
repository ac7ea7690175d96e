//! RunnerBlueprint - Config Loader output
//!
//! Describes the external tools and the default modes for a run.

use serde::{Deserialize, Serialize};

use crate::{MatchingMode, ScalingMode, UnscaledPolicy};

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete runner configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunnerBlueprint {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// External tool locations
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Reconstruction defaults
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Pre-scaler defaults
    #[serde(default)]
    pub prescale: PrescaleConfig,
}

/// External binaries, resolved through `PATH` when not absolute
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// COLMAP executable
    #[serde(default = "default_colmap")]
    pub colmap: String,

    /// ImageMagick `convert` executable
    #[serde(default = "default_convert")]
    pub convert: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            colmap: default_colmap(),
            convert: default_convert(),
        }
    }
}

fn default_colmap() -> String {
    "colmap".to_string()
}

fn default_convert() -> String {
    "convert".to_string()
}

/// Reconstruction pipeline settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Matcher used when the caller does not pick one
    #[serde(default)]
    pub matching: MatchingMode,

    /// Hold an exclusive lock file in the workspace for the whole run
    #[serde(default)]
    pub lock_workspace: bool,
}

/// Pre-scaler settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrescaleConfig {
    /// Scaling applied before reconstruction
    #[serde(default)]
    pub scaling: ScalingMode,

    /// Handling of images already within the long-edge bound
    #[serde(default)]
    pub unscaled_policy: UnscaledPolicy,
}
