//! Command implementations.

mod info;
mod output;
mod prescale;
mod run;
mod validate;

pub use info::run_info;
pub use prescale::run_prescale;
pub use run::run_pipeline;
pub use validate::run_validate;
