//! # Reconstruction
//!
//! Sparse reconstruction pipeline driving the external COLMAP binary.
//!
//! Responsibilities:
//! - Build the fixed four-stage command table for a workspace
//! - Run the stages one after another, stopping at the first failure
//! - Verify the three model files under `sparse/0/`
//! - Optional advisory lock on the workspace
//!
//! ## Usage
//!
//! ```ignore
//! use reconstruction::Orchestrator;
//! use tool_runner::SystemRunner;
//!
//! let orchestrator = Orchestrator::new(SystemRunner::new(), "colmap");
//! let report = orchestrator.run(&workspace, MatchingMode::Sequential).await;
//! println!("{}", report.log);
//! ```

mod lock;
mod orchestrator;
mod stages;
mod verify;

pub use lock::WorkspaceLock;
pub use orchestrator::Orchestrator;
pub use stages::{build_stages, matcher_command};
pub use verify::{verify_artifacts, Verification};

// Re-export contracts types
pub use contracts::{MatchingMode, PipelineReport, PipelineState, Stage, StageKind, StageRecord};
