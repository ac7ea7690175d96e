//! # Contracts
//!
//! Shared data structures for the COLMAP runner: workspace layout, mode
//! enumerations, command specs, the run log and the reports returned by the
//! pre-scaler and the reconstruction pipeline.
//! Every other crate in the workspace depends on this one, never the reverse.
//!
//! ## Workspace layout
//! - `images/` input photos, `images_original/` pre-scaler backup
//! - `database.db` written by stage 1
//! - `sparse/0/{cameras.bin,images.bin,points3D.bin}` final artifacts

mod blueprint;
mod command;
mod error;
mod modes;
mod report;
mod run_log;
mod stage;
mod workspace;

pub use blueprint::*;
pub use command::{CommandOutput, CommandSpec};
pub use error::*;
pub use modes::*;
pub use report::*;
pub use run_log::RunLog;
pub use stage::*;
pub use workspace::*;
