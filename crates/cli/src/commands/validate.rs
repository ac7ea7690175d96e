//! `validate` command implementation.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use contracts::RunnerBlueprint;
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    colmap: String,
    convert: String,
    matching: String,
    lock_workspace: bool,
    scaling: String,
    unscaled_policy: String,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs, config: Option<&Path>) -> Result<()> {
    info!(
        config = %config.map(|p| p.display().to_string()).unwrap_or_else(|| "<defaults>".into()),
        "Validating configuration"
    );

    let result = validate_config(config);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(config: Option<&Path>) -> ValidationResult {
    let config_path = config
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "<defaults>".to_string());

    // Check file exists
    if let Some(path) = config {
        if !path.exists() {
            return ValidationResult {
                valid: false,
                config_path,
                error: Some(format!("File not found: {}", path.display())),
                warnings: None,
                summary: None,
            };
        }
    }

    match config_loader::ConfigLoader::load_or_default(config) {
        Ok(blueprint) => {
            let warnings = collect_warnings(&blueprint);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    version: format!("{:?}", blueprint.version),
                    colmap: blueprint.tools.colmap.clone(),
                    convert: blueprint.tools.convert.clone(),
                    matching: blueprint.pipeline.matching.to_string(),
                    lock_workspace: blueprint.pipeline.lock_workspace,
                    scaling: blueprint.prescale.scaling.to_string(),
                    unscaled_policy: blueprint.prescale.unscaled_policy.to_string(),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(blueprint: &RunnerBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();

    for (key, program) in [
        ("tools.colmap", &blueprint.tools.colmap),
        ("tools.convert", &blueprint.tools.convert),
    ] {
        if find_program(program).is_none() {
            warnings.push(format!("{key} '{program}' was not found on this machine"));
        }
    }

    if !blueprint.prescale.scaling.is_noop() && blueprint.pipeline.lock_workspace {
        warnings.push(
            "pipeline.lock_workspace holds the lock across pre-scale and reconstruction"
                .to_string(),
        );
    }

    warnings
}

/// Resolve `program` the way the OS would: as a path when it contains a
/// separator, otherwise through `PATH`
fn find_program(program: &str) -> Option<PathBuf> {
    let candidate = Path::new(program);
    if candidate.components().count() > 1 {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }

    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(program))
        .find(|path| path.is_file())
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  COLMAP: {}", summary.colmap);
            println!("  convert: {}", summary.convert);
            println!("  Matching: {}", summary.matching);
            println!("  Lock workspace: {}", summary.lock_workspace);
            println!("  Scaling: {}", summary.scaling);
            println!("  Unscaled policy: {}", summary.unscaled_policy);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
