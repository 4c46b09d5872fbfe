//! Column naming, well-known fields, timestamps and categorical vocabularies.

pub mod fields;
mod naming;
mod timestamp;
mod vocabulary;

pub use naming::{normalize_column_name, normalize_headers};
pub(crate) use naming::unique_name;
pub use timestamp::{format_timestamp, parse_timestamp};
pub use vocabulary::{
    normalize_category, Category, SentimentThresholds, Vocabulary, SENTIMENT_LABELS, STATUS_VALUES,
};
