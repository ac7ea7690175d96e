//! Configuration validation
//!
//! Rules:
//! - tool names are non-empty and carry no surrounding whitespace
//! - tool names are single executables, not command lines

use contracts::{ContractError, RunnerBlueprint};

/// Validate a RunnerBlueprint
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(blueprint: &RunnerBlueprint) -> Result<(), ContractError> {
    validate_tool("tools.colmap", &blueprint.tools.colmap)?;
    validate_tool("tools.convert", &blueprint.tools.convert)?;
    Ok(())
}

fn validate_tool(field: &str, value: &str) -> Result<(), ContractError> {
    if value.trim().is_empty() {
        return Err(ContractError::config_validation(
            field,
            "tool executable cannot be empty",
        ));
    }

    if value.trim() != value {
        return Err(ContractError::config_validation(
            field,
            format!("tool executable '{value}' has leading or trailing whitespace"),
        ));
    }

    // Arguments cannot ride along in the program name: there is no shell.
    if value.starts_with('-') {
        return Err(ContractError::config_validation(
            field,
            format!("tool executable '{value}' looks like a flag"),
        ));
    }

    Ok(())
}
