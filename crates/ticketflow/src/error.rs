//! Error types for the ticketflow library.

use std::path::PathBuf;
use thiserror::Error;

use crate::report::Stage;

/// Main error type for pipeline operations.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Error reading, writing or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed record in a semi-structured source.
    #[error("Parse error in '{path}' at line {line}: {message}")]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// Empty file or no data to process.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// None of the raw sources could be loaded.
    #[error("No usable sources in '{raw_dir}' (ticket log: '{ticket_log}')")]
    NoSources {
        raw_dir: PathBuf,
        ticket_log: PathBuf,
    },

    /// A stage turned non-empty input into an empty result.
    #[error("{stage} stage produced no rows from {input_rows} input rows")]
    EmptyStageResult { stage: Stage, input_rows: usize },

    /// An input table produced by an earlier stage is missing.
    #[error("Missing {stage} input '{path}'; run the previous stage first")]
    MissingStageInput { stage: Stage, path: PathBuf },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl PipelineError {
    /// Wrap an I/O error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;
