//! Shared report output for `run` and `prescale`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use contracts::{ArtifactStatus, PipelineState, RunLog};
use serde::Serialize;

use crate::pipeline::{RunStats, SessionReport};

/// Session report for JSON output
#[derive(Serialize)]
struct ReportJson<'a> {
    success: bool,
    workspace: &'a PathBuf,
    reached: PipelineState,
    #[serde(skip_serializing_if = "Option::is_none")]
    result_dir: Option<&'a PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_kind: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    prescale: Option<PrescaleJson<'a>>,
    stages: Vec<StageJson<'a>>,
    artifacts: &'a [ArtifactStatus],
    duration_ms: u128,
    log: &'a RunLog,
}

#[derive(Serialize)]
struct PrescaleJson<'a> {
    mode: String,
    processed: usize,
    copied: usize,
    omitted: usize,
    skipped: usize,
    source_dir: &'a PathBuf,
    target_dir: &'a PathBuf,
}

#[derive(Serialize)]
struct StageJson<'a> {
    stage: &'static str,
    description: &'a str,
    command: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    exit_code: Option<i32>,
    duration_ms: u128,
}

fn to_json(report: &SessionReport) -> ReportJson<'_> {
    ReportJson {
        success: report.is_success(),
        workspace: &report.workspace,
        reached: report.reached,
        result_dir: report.result.as_ref().ok(),
        error_kind: report.result.as_ref().err().map(|e| e.kind().as_str()),
        error: report.result.as_ref().err().map(|e| e.to_string()),
        prescale: report.prescale.as_ref().map(|s| PrescaleJson {
            mode: s.mode.to_string(),
            processed: s.processed,
            copied: s.copied,
            omitted: s.omitted,
            skipped: s.skipped,
            source_dir: &s.source_dir,
            target_dir: &s.target_dir,
        }),
        stages: report
            .stages
            .iter()
            .map(|s| StageJson {
                stage: s.kind.metric_label(),
                description: &s.description,
                command: &s.command_line,
                exit_code: s.exit_code,
                duration_ms: s.duration.as_millis(),
            })
            .collect(),
        artifacts: &report.artifacts,
        duration_ms: report.duration.as_millis(),
        log: &report.log,
    }
}

/// Print the log (or the JSON report) and, in text mode, the statistics
pub fn print_report(report: &SessionReport, json: bool) -> Result<()> {
    if json {
        let json = serde_json::to_string_pretty(&to_json(report))
            .context("Failed to serialize run report")?;
        println!("{}", json);
    } else {
        println!("{}", report.log);
        RunStats::from_report(report).print_summary();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{Session, SessionSettings};
    use contracts::{ScalingMode, UnscaledPolicy, Workspace};
    use tool_runner::MockRunner;

    #[tokio::test]
    async fn test_json_report_shape() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("images")).unwrap();
        std::fs::write(dir.path().join("images/a.jpg"), b"a").unwrap();

        let settings = SessionSettings {
            workspace: Workspace::new(dir.path()),
            matching: "spatial".to_string(),
            scaling: ScalingMode::NoScaling,
            unscaled_policy: UnscaledPolicy::Reencode,
            colmap: "colmap".to_string(),
            convert: "convert".to_string(),
            lock: false,
        };
        let report = Session::new(MockRunner::new(), settings).run().await;

        let value = serde_json::to_value(to_json(&report)).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["reached"], "Verified");
        assert_eq!(value["stages"].as_array().unwrap().len(), 4);
        assert_eq!(value["stages"][2]["stage"], "spatial_matcher");
        assert_eq!(value["artifacts"].as_array().unwrap().len(), 3);
        assert!(value["log"].as_array().unwrap().len() > 4);
        assert!(value.get("error").is_none());
    }
}
