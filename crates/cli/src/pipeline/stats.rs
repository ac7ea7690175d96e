//! Run statistics printed after a session.

use std::time::Duration;

use contracts::{PipelineState, PrescaleSummary};
use observability::StageTimings;

use super::SessionReport;

/// Statistics from one session
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    /// Wall-clock time of the whole session
    pub duration: Duration,

    /// Pre-scaler counters, when images were scaled
    pub prescale: Option<PrescaleSummary>,

    /// Last pipeline state reached
    pub reached: PipelineState,

    /// Artifacts found / expected
    pub artifacts_found: usize,
    pub artifacts_expected: usize,

    /// Per-stage timings
    pub timings: StageTimings,
}

impl RunStats {
    pub fn from_report(report: &SessionReport) -> Self {
        let mut timings = StageTimings::new();
        timings.extend(&report.stages);

        Self {
            duration: report.duration,
            prescale: report.prescale.clone(),
            reached: report.reached,
            artifacts_found: report.artifacts.iter().filter(|a| a.found).count(),
            artifacts_expected: report.artifacts.len(),
            timings,
        }
    }

    /// Share of the session spent inside external stages, as a percentage
    pub fn stage_share(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.timings.total().as_secs_f64() / self.duration.as_secs_f64() * 100.0
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                      Run Statistics                          ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Overview");
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Reached: {}", self.reached);
        println!(
            "   └─ Artifacts: {}/{}",
            self.artifacts_found, self.artifacts_expected
        );

        if let Some(ref summary) = self.prescale {
            println!("\n🖼  Pre-scale ({})", summary.mode);
            println!("   ├─ Resized: {}", summary.processed);
            println!("   ├─ Copied: {}", summary.copied);
            println!("   ├─ Omitted: {}", summary.omitted);
            println!("   └─ Skipped: {}", summary.skipped);
        }

        let timings = self.timings.summary();
        if !timings.stages.is_empty() {
            println!("\n⏱  Stages ({:.1}% of run)", self.stage_share());
            for (i, (stage, stats)) in timings.stages.iter().enumerate() {
                let prefix = if i == timings.stages.len() - 1 { "└─" } else { "├─" };
                println!("   {prefix} {stage}: {stats}s");
            }
        }

        println!();
    }
}
