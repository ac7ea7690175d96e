//! Runner metrics
//!
//! Counters and histograms derived from the reports returned by the
//! pre-scaler and the reconstruction pipeline, plus an in-memory timing
//! aggregate for end-of-run summaries.

use std::fmt;
use std::time::Duration;

use contracts::{PipelineReport, PrescaleReport, StageRecord};
use metrics::{counter, gauge, histogram};

/// Record one finished (or failed) stage
pub fn record_stage(record: &StageRecord) {
    let stage = record.kind.metric_label();
    let status = if record.succeeded() { "success" } else { "failure" };

    counter!(
        "colmap_runner_stages_total",
        "stage" => stage,
        "status" => status
    )
    .increment(1);

    histogram!("colmap_runner_stage_duration_seconds", "stage" => stage)
        .record(record.duration.as_secs_f64());
}

/// Record every stage of a pipeline run and its outcome
pub fn record_pipeline_report(report: &PipelineReport) {
    for record in &report.stages {
        record_stage(record);
    }

    let outcome = match report.error() {
        None => "success",
        Some(e) => e.kind().as_str(),
    };
    counter!("colmap_runner_pipelines_total", "outcome" => outcome).increment(1);

    let found = report.artifacts.iter().filter(|a| a.found).count();
    gauge!("colmap_runner_artifacts_found").set(found as f64);
}

/// Record the counters of a pre-scale run
pub fn record_prescale_report(report: &PrescaleReport) {
    let outcome = match &report.result {
        Ok(Some(_)) => "success",
        Ok(None) => "noop",
        Err(e) => e.kind().as_str(),
    };
    counter!("colmap_runner_prescale_runs_total", "outcome" => outcome).increment(1);

    if let Ok(Some(summary)) = &report.result {
        for (action, count) in [
            ("resized", summary.processed),
            ("copied", summary.copied),
            ("omitted", summary.omitted),
            ("skipped", summary.skipped),
        ] {
            if count > 0 {
                counter!("colmap_runner_prescale_images_total", "action" => action)
                    .increment(count as u64);
            }
        }
    }
}

/// Per-stage wall-clock timing, in first-seen order
#[derive(Debug, Clone, Default)]
pub struct StageTimings {
    stages: Vec<(&'static str, RunningStats)>,
    total: Duration,
}

impl StageTimings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, record: &StageRecord) {
        let label = record.kind.metric_label();
        let seconds = record.duration.as_secs_f64();
        self.total += record.duration;

        match self.stages.iter_mut().find(|(name, _)| *name == label) {
            Some((_, stats)) => stats.push(seconds),
            None => {
                let mut stats = RunningStats::default();
                stats.push(seconds);
                self.stages.push((label, stats));
            }
        }
    }

    pub fn extend<'a>(&mut self, records: impl IntoIterator<Item = &'a StageRecord>) {
        for record in records {
            self.update(record);
        }
    }

    pub fn total(&self) -> Duration {
        self.total
    }

    pub fn summary(&self) -> TimingSummary {
        TimingSummary {
            stages: self
                .stages
                .iter()
                .map(|(name, stats)| (name.to_string(), StatsSummary::from(stats)))
                .collect(),
            total: self.total,
        }
    }
}

/// Timing summary
#[derive(Debug, Clone, Default)]
pub struct TimingSummary {
    pub stages: Vec<(String, StatsSummary)>,
    pub total: Duration,
}

impl fmt::Display for TimingSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Stage Timings (s) ===")?;
        for (stage, stats) in &self.stages {
            writeln!(f, "{stage}: {stats}")?;
        }
        writeln!(f, "Total: {:.3}s", self.total.as_secs_f64())
    }
}

/// Statistics summary
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
        }
    }
}

impl fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.count {
            0 => write!(f, "N/A"),
            1 => write!(f, "{:.3}", self.mean),
            n => write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3} (n={n})",
                self.min, self.max, self.mean
            ),
        }
    }
}

/// Online mean / min / max
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;
        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
            self.mean += (value - self.mean) / self.count as f64;
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
