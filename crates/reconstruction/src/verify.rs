//! Artifact verification after the mapper stage.

use std::path::PathBuf;

use contracts::{ArtifactStatus, Workspace};

/// Presence of the three model files under `sparse/0/`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    pub artifacts: Vec<ArtifactStatus>,
}

impl Verification {
    pub fn is_complete(&self) -> bool {
        self.artifacts.iter().all(|a| a.found)
    }

    pub fn missing(&self) -> Vec<PathBuf> {
        self.artifacts
            .iter()
            .filter(|a| !a.found)
            .map(|a| a.path.clone())
            .collect()
    }

    /// `  <path>: Found` / `  <path>: Not found`, one per artifact
    pub fn status_lines(&self) -> Vec<String> {
        self.artifacts
            .iter()
            .map(|a| {
                let status = if a.found { "Found" } else { "Not found" };
                format!("  {}: {status}", a.path.display())
            })
            .collect()
    }
}

pub fn verify_artifacts(workspace: &Workspace) -> Verification {
    Verification {
        artifacts: workspace.artifact_status(),
    }
}
