//! Session orchestration module.

mod session;
mod stats;

pub use session::{Session, SessionReport, SessionSettings};
pub use stats::RunStats;
