//! Timestamp parsing into a canonical UTC form.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

/// Offset-aware formats tried after RFC 3339.
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"];

/// Naive formats, interpreted as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse a timestamp, returning `None` for anything unrecognized.
///
/// Accepts RFC 3339 (any offset), ISO date-times without an offset (taken
/// as UTC, `T` or space separated, optional fractional seconds) and plain
/// dates (midnight UTC).
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(value, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(dt.and_utc());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Canonical text form: RFC 3339 in UTC with a `Z` suffix; fractional
/// seconds only when present.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canonical(value: &str) -> Option<String> {
        parse_timestamp(value).map(|ts| format_timestamp(&ts))
    }

    #[test]
    fn test_parse_rfc3339() {
        assert_eq!(canonical("2024-01-05T10:00:00Z").as_deref(), Some("2024-01-05T10:00:00Z"));
        assert_eq!(
            canonical("2024-01-05T12:00:00+02:00").as_deref(),
            Some("2024-01-05T10:00:00Z")
        );
    }

    #[test]
    fn test_parse_naive_as_utc() {
        assert_eq!(canonical("2024-01-05T10:00:00").as_deref(), Some("2024-01-05T10:00:00Z"));
        assert_eq!(canonical("2024-01-05 10:00:00").as_deref(), Some("2024-01-05T10:00:00Z"));
        assert_eq!(canonical("2024-01-05 10:00").as_deref(), Some("2024-01-05T10:00:00Z"));
        assert_eq!(
            canonical("2024-01-05T10:00:00.250").as_deref(),
            Some("2024-01-05T10:00:00.250Z")
        );
    }

    #[test]
    fn test_parse_space_separated_offset() {
        assert_eq!(
            canonical("2024-01-05 10:00:00+00:00").as_deref(),
            Some("2024-01-05T10:00:00Z")
        );
    }

    #[test]
    fn test_parse_date_only() {
        assert_eq!(canonical("2024-01-05").as_deref(), Some("2024-01-05T00:00:00Z"));
    }

    #[test]
    fn test_unparsable() {
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("2024-13-45").is_none());
        assert!(parse_timestamp("05/01/2024").is_none());
    }

    #[test]
    fn test_canonical_form_reparses() {
        let ts = parse_timestamp("2024-03-01 08:15:30.5").unwrap();
        assert_eq!(parse_timestamp(&format_timestamp(&ts)), Some(ts));
    }
}
