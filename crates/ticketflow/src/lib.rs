//! ticketflow: a bronze/silver/gold pipeline for support-ticket analytics.
//!
//! Raw delimited tables and a line-delimited JSON ticket log are unified into
//! one table, cleaned into one validated row per ticket, and summarized into
//! per-agent, per-status and per-sentiment aggregates.
//!
//! # Core Principles
//!
//! - **Inputs are never modified**: every stage writes a new table
//! - **Nothing is silently dropped**: rejected rows and skipped sources are
//!   recorded as observations with counts
//! - **Deterministic output**: the same inputs produce byte-identical files
//!
//! # Example
//!
//! ```no_run
//! use ticketflow::{DataLayout, Pipeline, PipelineConfig};
//!
//! let pipeline = Pipeline::with_config(PipelineConfig {
//!     layout: DataLayout::new("data"),
//!     ..Default::default()
//! });
//! let mut ctx = pipeline.context();
//! let outcome = pipeline.run(&mut ctx).unwrap();
//!
//! println!("Tickets: {}", outcome.silver_rows);
//! println!("Warnings: {}", ctx.warnings().count());
//! ```

pub mod context;
pub mod error;
pub mod input;
pub mod output;
pub mod report;
pub mod schema;
pub mod stage;

mod pipeline;

pub use crate::pipeline::{Pipeline, PipelineConfig, PipelineOutcome};
pub use context::{DataLayout, RunContext};
pub use error::{PipelineError, Result};
pub use input::{DataTable, SourceMetadata};
pub use report::{Observation, ObservationKind, Severity, Stage, StageReport};
pub use stage::{Aggregates, Aggregator, Cleaner, CleanerConfig, Unifier, UnifierConfig};
