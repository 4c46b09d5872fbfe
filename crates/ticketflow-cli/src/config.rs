//! Configuration file loading.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use ticketflow::{CleanerConfig, DataLayout, PipelineConfig, PipelineError, UnifierConfig};

/// Settings for the summary chart.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Agents shown in the bar panel, busiest first.
    pub top_n: usize,
    /// File name inside the gold directory.
    pub file_name: String,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            top_n: 15,
            file_name: "summary_plot.svg".to_string(),
        }
    }
}

/// Everything a TOML config file can set.
///
/// ```toml
/// [layout]
/// data_dir = "data"
///
/// [unifier]
/// prefixes = ["raw_"]
///
/// [cleaner.sentiment_thresholds]
/// positive = 0.5
/// negative = -0.5
///
/// [chart]
/// top_n = 15
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub layout: DataLayout,
    pub unifier: UnifierConfig,
    pub cleaner: CleanerConfig,
    pub chart: ChartConfig,
}

impl AppConfig {
    /// Load a config file, or the defaults when no file is given.
    pub fn load(path: Option<&Path>) -> ticketflow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let text = fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))?;
        Self::parse(&text).map_err(|e| PipelineError::Config(format!("{}: {}", path.display(), e)))
    }

    fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Override the data directory when one was given on the command line.
    pub fn with_data_dir(mut self, data_dir: Option<PathBuf>) -> Self {
        if let Some(dir) = data_dir {
            self.layout.data_dir = dir;
        }
        self
    }

    /// The library configuration.
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            layout: self.layout.clone(),
            unifier: self.unifier.clone(),
            cleaner: self.cleaner.clone(),
        }
    }

    /// Where the chart is written.
    pub fn chart_path(&self) -> PathBuf {
        self.layout.gold_dir().join(&self.chart.file_name)
    }
}
