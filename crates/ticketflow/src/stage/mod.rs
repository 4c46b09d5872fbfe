//! The three pipeline stages.
//!
//! - [`Unifier`] (bronze): raw tables and the ticket log into one table
//! - [`Cleaner`] (silver): validated, de-duplicated tickets with derived fields
//! - [`Aggregator`] (gold): grouped counts, averages and a summary

mod aggregate;
mod clean;
mod unify;

pub use aggregate::{tables, Aggregates, Aggregator, UNKNOWN_STATUS};
pub use clean::{steps, Cleaner, CleanerConfig, FLAG_UNEXPECTED_SENTIMENT, FLAG_UNEXPECTED_STATUS};
pub use unify::{SourceTable, Unifier, UnifierConfig};
