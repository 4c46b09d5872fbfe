//! Per-stage row accounting.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Raw sources unified into one table.
    Bronze,
    /// Validated, de-duplicated tickets.
    Silver,
    /// Aggregates.
    Gold,
}

impl Stage {
    /// Get a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Stage::Bronze => "bronze",
            Stage::Silver => "silver",
            Stage::Gold => "gold",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Row counts around a single filtering step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterStep {
    /// Step name.
    pub name: String,
    /// Rows entering the step.
    pub rows_before: usize,
    /// Rows leaving the step.
    pub rows_after: usize,
}

impl FilterStep {
    /// Rows removed by this step.
    pub fn dropped(&self) -> usize {
        self.rows_before.saturating_sub(self.rows_after)
    }
}

/// What a stage did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageReport {
    /// The stage.
    pub stage: Stage,
    /// Rows the stage received (sum of source rows for bronze).
    pub input_rows: usize,
    /// Rows the stage produced.
    pub output_rows: usize,
    /// Filtering steps in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<FilterStep>,
    /// Files written by the stage.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<PathBuf>,
}

impl StageReport {
    /// Create an empty report.
    pub fn new(stage: Stage, input_rows: usize) -> Self {
        Self {
            stage,
            input_rows,
            output_rows: input_rows,
            steps: Vec::new(),
            outputs: Vec::new(),
        }
    }

    /// Record a filtering step; the output row count follows the last step.
    pub fn record_step(&mut self, name: impl Into<String>, rows_before: usize, rows_after: usize) {
        self.steps.push(FilterStep {
            name: name.into(),
            rows_before,
            rows_after,
        });
        self.output_rows = rows_after;
    }

    /// Look up a step by name.
    pub fn step(&self, name: &str) -> Option<&FilterStep> {
        self.steps.iter().find(|s| s.name == name)
    }

    /// Total rows dropped across all steps.
    pub fn total_dropped(&self) -> usize {
        self.steps.iter().map(FilterStep::dropped).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_steps() {
        let mut report = StageReport::new(Stage::Silver, 10);
        report.record_step("required_fields", 10, 8);
        report.record_step("time_range", 8, 7);

        assert_eq!(report.output_rows, 7);
        assert_eq!(report.total_dropped(), 3);
        assert_eq!(report.step("time_range").map(FilterStep::dropped), Some(1));
        assert!(report.step("missing").is_none());
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(Stage::Bronze.to_string(), "bronze");
        assert_eq!(format!("{}", Stage::Gold), "gold");
    }
}
