//! Categorical vocabularies for ticket status and sentiment.

use serde::{Deserialize, Serialize};

/// Sentiment labels that always appear in sentiment aggregates, in output order.
pub const SENTIMENT_LABELS: [&str; 3] = ["positive", "neutral", "negative"];

/// Ticket statuses the pipeline knows about.
pub const STATUS_VALUES: [&str; 7] = [
    "open",
    "pending",
    "in_progress",
    "on_hold",
    "escalated",
    "resolved",
    "closed",
];

/// Normalize a categorical value: trim, lowercase, and turn inner runs of
/// whitespace, hyphens or underscores into a single underscore.
///
/// ```
/// use ticketflow::schema::normalize_category;
///
/// assert_eq!(normalize_category("  In Progress "), "in_progress");
/// assert_eq!(normalize_category("POSITIVE"), "positive");
/// ```
pub fn normalize_category(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut pending_sep = false;

    for ch in value.trim().chars() {
        if ch.is_whitespace() || ch == '-' || ch == '_' {
            pending_sep = true;
            continue;
        }
        if pending_sep && !out.is_empty() {
            out.push('_');
        }
        pending_sep = false;
        out.extend(ch.to_lowercase());
    }

    out
}

/// Result of checking a value against a vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Category {
    /// Normalized value found in the vocabulary.
    Expected(String),
    /// Normalized value outside the vocabulary; kept as-is and flagged.
    Unexpected(String),
}

impl Category {
    /// The normalized value, expected or not.
    pub fn value(&self) -> &str {
        match self {
            Category::Expected(v) | Category::Unexpected(v) => v,
        }
    }

    /// Whether the value fell outside the vocabulary.
    pub fn is_unexpected(&self) -> bool {
        matches!(self, Category::Unexpected(_))
    }
}

/// A fixed set of allowed values for a categorical column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vocabulary {
    /// Allowed values in normalized form.
    pub values: Vec<String>,
}

impl Vocabulary {
    /// Create a vocabulary; values are normalized on the way in.
    pub fn new<S: AsRef<str>>(values: impl IntoIterator<Item = S>) -> Self {
        Self {
            values: values
                .into_iter()
                .map(|v| normalize_category(v.as_ref()))
                .collect(),
        }
    }

    /// Default ticket-status vocabulary.
    pub fn status() -> Self {
        Self::new(STATUS_VALUES)
    }

    /// Default sentiment vocabulary.
    pub fn sentiment() -> Self {
        Self::new(SENTIMENT_LABELS)
    }

    /// Normalize a raw value and classify it.
    pub fn classify(&self, raw: &str) -> Category {
        let value = normalize_category(raw);
        if self.values.iter().any(|v| *v == value) {
            Category::Expected(value)
        } else {
            Category::Unexpected(value)
        }
    }
}

/// Score cut-offs for deriving a sentiment label from a numeric score.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct SentimentThresholds {
    /// Scores at or above this are positive.
    pub positive: f64,
    /// Scores at or below this are negative.
    pub negative: f64,
}

impl Default for SentimentThresholds {
    fn default() -> Self {
        Self {
            positive: 0.5,
            negative: -0.5,
        }
    }
}

impl SentimentThresholds {
    /// Map a score to `positive`, `neutral` or `negative`.
    pub fn label(&self, score: f64) -> &'static str {
        if score >= self.positive {
            "positive"
        } else if score <= self.negative {
            "negative"
        } else {
            "neutral"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_category() {
        assert_eq!(normalize_category("Open"), "open");
        assert_eq!(normalize_category(" on-hold "), "on_hold");
        assert_eq!(normalize_category("In   Progress"), "in_progress");
        assert_eq!(normalize_category("__closed__"), "closed");
        assert_eq!(normalize_category(""), "");
    }

    #[test]
    fn test_normalize_category_idempotent() {
        for raw in ["In Progress", "NEGATIVE ", "on-hold", "weird--Value"] {
            let once = normalize_category(raw);
            assert_eq!(normalize_category(&once), once);
        }
    }

    #[test]
    fn test_classify() {
        let vocab = Vocabulary::status();
        assert_eq!(vocab.classify("RESOLVED"), Category::Expected("resolved".into()));
        assert_eq!(vocab.classify("Reopened"), Category::Unexpected("reopened".into()));
        assert!(vocab.classify("reopened").is_unexpected());
        assert_eq!(vocab.classify(" Pending ").value(), "pending");
    }

    #[test]
    fn test_sentiment_thresholds() {
        let t = SentimentThresholds::default();
        assert_eq!(t.label(0.5), "positive");
        assert_eq!(t.label(0.49), "neutral");
        assert_eq!(t.label(-0.5), "negative");
        assert_eq!(t.label(0.0), "neutral");
    }
}
