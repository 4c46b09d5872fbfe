//! Non-fatal events reported while the pipeline runs.

use serde::{Deserialize, Serialize};

use super::stage::Stage;

/// Kind of event observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObservationKind {
    /// A raw source could not be read or parsed and was skipped.
    SourceSkipped,
    /// An expected source was not present.
    SourceMissing,
    /// A file lost the tie-break against another file for the same table.
    SourceShadowed,
    /// Lines of a semi-structured source were not valid records.
    MalformedRecords,
    /// Rows dropped by a cleaning rule.
    RowsRejected,
    /// Values that could not be parsed and were set to null.
    ValuesCoerced,
    /// Values filled from a documented default.
    ValuesDefaulted,
    /// A categorical value outside the known vocabulary.
    UnexpectedCategory,
}

impl ObservationKind {
    /// Get a human-readable label for the observation kind.
    pub fn label(&self) -> &'static str {
        match self {
            ObservationKind::SourceSkipped => "Source Skipped",
            ObservationKind::SourceMissing => "Source Missing",
            ObservationKind::SourceShadowed => "Source Shadowed",
            ObservationKind::MalformedRecords => "Malformed Records",
            ObservationKind::RowsRejected => "Rows Rejected",
            ObservationKind::ValuesCoerced => "Values Coerced",
            ObservationKind::ValuesDefaulted => "Values Defaulted",
            ObservationKind::UnexpectedCategory => "Unexpected Category",
        }
    }
}

/// Severity level of an observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational only.
    Info,
    /// Something the operator should look at.
    Warning,
}

impl Severity {
    /// Get a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Info => "Info",
            Severity::Warning => "Warning",
        }
    }
}

/// A reported event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Stage that raised it.
    pub stage: Stage,
    /// What happened.
    #[serde(rename = "type")]
    pub kind: ObservationKind,
    /// Severity level.
    pub severity: Severity,
    /// File, column or rule the observation is about.
    pub subject: String,
    /// Human-readable description.
    pub description: String,
    /// Number of affected rows, lines or values.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

impl Observation {
    /// Create a new observation.
    pub fn new(
        stage: Stage,
        kind: ObservationKind,
        severity: Severity,
        subject: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            stage,
            kind,
            severity,
            subject: subject.into(),
            description: description.into(),
            count: None,
        }
    }

    /// Shorthand for a warning.
    pub fn warning(
        stage: Stage,
        kind: ObservationKind,
        subject: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self::new(stage, kind, Severity::Warning, subject, description)
    }

    /// Shorthand for an informational observation.
    pub fn info(
        stage: Stage,
        kind: ObservationKind,
        subject: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self::new(stage, kind, Severity::Info, subject, description)
    }

    /// Set the affected count.
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_observation() {
        let obs = Observation::warning(
            Stage::Silver,
            ObservationKind::UnexpectedCategory,
            "status",
            "Unexpected status 'reopened'",
        )
        .with_count(3);

        assert_eq!(obs.severity, Severity::Warning);
        assert_eq!(obs.subject, "status");
        assert_eq!(obs.count, Some(3));
    }

    #[test]
    fn test_serializes_kind_as_type() {
        let obs = Observation::info(Stage::Bronze, ObservationKind::SourceShadowed, "raw_orders.csv", "x");
        let json = serde_json::to_value(&obs).unwrap();

        assert_eq!(json["type"], "source_shadowed");
        assert_eq!(json["stage"], "bronze");
        assert!(json.get("count").is_none());
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Info < Severity::Warning);
    }
}
