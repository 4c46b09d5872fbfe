//! Run-wide state threaded through the stages.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::report::{Observation, Severity, Stage, StageReport};

/// Where a run reads its inputs and writes its outputs.
///
/// All paths are relative to `data_dir` unless given as absolute paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataLayout {
    /// Root data directory.
    pub data_dir: PathBuf,
    /// Directory of raw delimited tables.
    pub raw_dir: PathBuf,
    /// The support-ticket log.
    pub ticket_log: PathBuf,
    /// Unified table.
    pub bronze_file: PathBuf,
    /// Clean table.
    pub silver_file: PathBuf,
    /// Directory receiving the aggregate tables.
    pub gold_dir: PathBuf,
}

impl Default for DataLayout {
    fn default() -> Self {
        Self::new("data")
    }
}

impl DataLayout {
    /// Standard layout under a data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            raw_dir: PathBuf::from("raw_csvs"),
            ticket_log: PathBuf::from("support_tickets.jsonl"),
            bronze_file: PathBuf::from("bronze/bronze.csv"),
            silver_file: PathBuf::from("silver/silver.csv"),
            gold_dir: PathBuf::from("gold"),
        }
    }

    /// Replace the data directory, keeping the relative layout.
    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.data_dir.join(path)
        }
    }

    pub fn raw_dir(&self) -> PathBuf {
        self.resolve(&self.raw_dir)
    }

    pub fn ticket_log_path(&self) -> PathBuf {
        self.resolve(&self.ticket_log)
    }

    pub fn bronze_path(&self) -> PathBuf {
        self.resolve(&self.bronze_file)
    }

    pub fn silver_path(&self) -> PathBuf {
        self.resolve(&self.silver_file)
    }

    pub fn gold_dir(&self) -> PathBuf {
        self.resolve(&self.gold_dir)
    }

    /// Path of a gold table by name.
    pub fn gold_table_path(&self, table: &str) -> PathBuf {
        self.gold_dir().join(format!("{}.csv", table))
    }
}

/// Run-wide state: paths, observations and stage reports.
///
/// Each stage receives the context explicitly; nothing is global.
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    /// Input and output locations.
    pub layout: DataLayout,
    /// Everything reported so far, in order.
    pub observations: Vec<Observation>,
    /// One report per completed stage.
    pub reports: Vec<StageReport>,
}

impl RunContext {
    /// Create a context for a layout.
    pub fn new(layout: DataLayout) -> Self {
        Self {
            layout,
            observations: Vec::new(),
            reports: Vec::new(),
        }
    }

    /// Record an observation and log it.
    pub fn observe(&mut self, observation: Observation) {
        match observation.severity {
            Severity::Warning => warn!(
                stage = %observation.stage,
                subject = %observation.subject,
                count = observation.count,
                "{}",
                observation.description
            ),
            Severity::Info => info!(
                stage = %observation.stage,
                subject = %observation.subject,
                count = observation.count,
                "{}",
                observation.description
            ),
        }
        self.observations.push(observation);
    }

    /// Record a completed stage, replacing any earlier report for it.
    pub fn record_report(&mut self, report: StageReport) {
        self.reports.retain(|r| r.stage != report.stage);
        self.reports.push(report);
    }

    /// The report for a stage, if it has run.
    pub fn report(&self, stage: Stage) -> Option<&StageReport> {
        self.reports.iter().find(|r| r.stage == stage)
    }

    /// Attach a written file to a stage's report.
    pub fn record_output(&mut self, stage: Stage, path: impl Into<PathBuf>) {
        if let Some(report) = self.reports.iter_mut().find(|r| r.stage == stage) {
            report.outputs.push(path.into());
        }
    }

    /// Warnings raised so far.
    pub fn warnings(&self) -> impl Iterator<Item = &Observation> {
        self.observations
            .iter()
            .filter(|o| o.severity == Severity::Warning)
    }

    /// Observations raised by one stage.
    pub fn observations_for(&self, stage: Stage) -> impl Iterator<Item = &Observation> {
        self.observations.iter().filter(move |o| o.stage == stage)
    }
}
