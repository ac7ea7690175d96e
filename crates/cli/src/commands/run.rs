//! `run` command implementation.

use std::path::Path;

use anyhow::{Context, Result};
use contracts::{MatchingMode, RunnerBlueprint};
use prescaler::resize_command;
use reconstruction::Orchestrator;
use serde::Serialize;
use tool_runner::SystemRunner;
use tracing::info;

use super::output::print_report;
use crate::cli::RunArgs;
use crate::error::CliError;
use crate::pipeline::{Session, SessionSettings};

/// Execute the `run` command
pub async fn run_pipeline(args: &RunArgs, config: Option<&Path>) -> Result<()> {
    let blueprint = load_blueprint(config)?;
    let settings = SessionSettings::for_run(&blueprint, args)?;

    info!(
        workspace = %settings.workspace.root().display(),
        matching = %settings.matching,
        scaling = %settings.scaling,
        colmap = %settings.colmap,
        lock = settings.lock,
        "Run configured"
    );

    // Dry run - print the commands and exit
    if args.dry_run {
        return print_plan(&settings, args.json);
    }

    if args.metrics_port != 0 {
        observability::init_metrics_only(args.metrics_port)?;
    }

    let session = Session::new(SystemRunner::new(), settings);
    let report = session.run().await;

    print_report(&report, args.json)?;

    match &report.result {
        Ok(dir) => {
            info!(
                result_dir = %dir.display(),
                duration_secs = report.duration.as_secs_f64(),
                "Reconstruction completed"
            );
            Ok(())
        }
        Err(e) => Err(CliError::run_failed("Reconstruction", e).into()),
    }
}

pub(crate) fn load_blueprint(config: Option<&Path>) -> Result<RunnerBlueprint> {
    if let Some(path) = config {
        info!(config = %path.display(), "Loading configuration");
    }
    config_loader::ConfigLoader::load_or_default(config).map_err(|e| {
        let path = config
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<defaults>".to_string());
        CliError::config(path, e).into()
    })
}

/// Planned commands for JSON output
#[derive(Serialize)]
struct Plan {
    workspace: String,
    scaling: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    resize_example: Option<String>,
    stages: Vec<PlannedStage>,
}

#[derive(Serialize)]
struct PlannedStage {
    description: String,
    command: String,
}

fn build_plan(settings: &SessionSettings) -> Result<Plan> {
    let mode: MatchingMode = settings
        .matching
        .parse()
        .map_err(CliError::InvalidArgument)?;
    let orchestrator = Orchestrator::new(SystemRunner::new(), settings.colmap.as_str());
    let workspace = &settings.workspace;

    let resize_example = settings.scaling.resize_geometry().map(|geometry| {
        resize_command(
            &settings.convert,
            &workspace.images_backup_dir().join("<image>"),
            &geometry,
            &workspace.images_dir().join("<image>"),
        )
        .display()
    });

    Ok(Plan {
        workspace: workspace.root().display().to_string(),
        scaling: settings.scaling.to_string(),
        resize_example,
        stages: orchestrator
            .plan(workspace, mode)
            .into_iter()
            .map(|stage| PlannedStage {
                description: stage.description(),
                command: stage.command.display(),
            })
            .collect(),
    })
}

fn print_plan(settings: &SessionSettings, json: bool) -> Result<()> {
    let plan = build_plan(settings)?;

    if json {
        let json = serde_json::to_string_pretty(&plan).context("Failed to serialize plan")?;
        println!("{}", json);
        return Ok(());
    }

    println!("\n=== Dry Run ===\n");
    println!("Workspace: {}", plan.workspace);
    println!("Scaling: {}", plan.scaling);
    if let Some(ref resize) = plan.resize_example {
        println!("  per image: {}", resize);
    }
    if settings.lock {
        println!("Lock: {}", settings.workspace.lock_path().display());
    }
    println!();
    for (i, stage) in plan.stages.iter().enumerate() {
        println!("{}. {}", i + 1, stage.description);
        println!("   {}", stage.command);
    }
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{ScalingMode, UnscaledPolicy, Workspace};

    fn settings() -> SessionSettings {
        SessionSettings {
            workspace: Workspace::new("/data/ws"),
            matching: "sequential".to_string(),
            scaling: ScalingMode::LongestEdge1600,
            unscaled_policy: UnscaledPolicy::Reencode,
            colmap: "colmap".to_string(),
            convert: "magick-convert".to_string(),
            lock: false,
        }
    }

    #[test]
    fn test_plan_lists_four_stages() {
        let plan = build_plan(&settings()).unwrap();

        assert_eq!(plan.stages.len(), 4);
        assert!(plan.stages[2].command.contains("sequential_matcher"));
        assert_eq!(
            plan.resize_example.as_deref(),
            Some("magick-convert '/data/ws/images_original/<image>' -resize '1600x1600>' '/data/ws/images/<image>'")
        );
    }

    #[test]
    fn test_plan_rejects_unknown_matching() {
        let mut settings = settings();
        settings.matching = "vocab_tree".to_string();
        assert!(build_plan(&settings).is_err());
    }

    #[test]
    fn test_missing_config_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        assert!(load_blueprint(Some(&missing)).is_err());
        assert!(load_blueprint(None).is_ok());
    }
}
