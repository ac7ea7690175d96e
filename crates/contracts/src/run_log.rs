//! Append-only run log returned to the caller.

use std::fmt;

use serde::Serialize;

/// Ordered log lines accumulated across a run
///
/// Each pushed line is also emitted as a tracing event on the `run_log`
/// target, which is how it reaches the console.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RunLog {
    lines: Vec<String>,
}

impl RunLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: impl Into<String>) {
        let line = line.into();
        tracing::info!(target: "run_log", "{line}");
        self.lines.push(line);
    }

    /// Append every line of `other`, keeping order
    pub fn extend(&mut self, other: RunLog) {
        self.lines.extend(other.lines);
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// True when any line contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|line| line.contains(needle))
    }

    pub fn to_text(&self) -> String {
        self.lines.join("\n")
    }
}

impl fmt::Display for RunLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}
