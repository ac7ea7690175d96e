//! `prescale` command implementation.

use std::path::Path;

use anyhow::Result;
use tool_runner::SystemRunner;
use tracing::{info, warn};

use super::output::print_report;
use super::run::load_blueprint;
use crate::cli::PrescaleArgs;
use crate::error::CliError;
use crate::pipeline::{Session, SessionSettings};

/// Execute the `prescale` command
pub async fn run_prescale(args: &PrescaleArgs, config: Option<&Path>) -> Result<()> {
    let blueprint = load_blueprint(config)?;
    let settings = SessionSettings::for_prescale(&blueprint, args)?;

    if settings.scaling.is_noop() {
        warn!("No scaling selected, images will be left as they are");
    }
    info!(
        workspace = %settings.workspace.root().display(),
        scaling = %settings.scaling,
        unscaled_policy = %settings.unscaled_policy,
        convert = %settings.convert,
        "Pre-scale configured"
    );

    let session = Session::new(SystemRunner::new(), settings);
    let report = session.prescale().await;

    print_report(&report, args.json)?;

    match &report.result {
        Ok(_) => Ok(()),
        Err(e) => Err(CliError::run_failed("Pre-scale", e).into()),
    }
}
