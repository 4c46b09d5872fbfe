//! Line-delimited JSON reader for the support-ticket log.

use std::fs;
use std::path::Path;

use indexmap::{IndexMap, IndexSet};
use serde_json::Value;

use crate::error::{PipelineError, Result};
use crate::schema::{normalize_column_name, unique_name};
use super::parser::content_hash;
use super::source::{DataTable, SourceMetadata};

/// A line of the log that could not be turned into a record.
#[derive(Debug, Clone, PartialEq)]
pub struct MalformedLine {
    /// 1-based line number.
    pub line: usize,
    /// Why the line was rejected.
    pub message: String,
}

/// A parsed ticket log.
#[derive(Debug, Clone)]
pub struct TicketLog {
    /// Flattened records with normalized column names.
    pub table: DataTable,
    /// Metadata about the log file.
    pub metadata: SourceMetadata,
    /// Lines that were skipped.
    pub malformed: Vec<MalformedLine>,
}

/// Read a ticket log file.
///
/// Blank lines are ignored and malformed lines are skipped and reported. The
/// file as a whole is rejected only when every non-blank line is malformed.
pub fn read_ticket_log(path: impl AsRef<Path>, table: &str) -> Result<TicketLog> {
    let path = path.as_ref();
    let contents = fs::read(path).map_err(|e| PipelineError::io(path, e))?;
    let text = String::from_utf8_lossy(&contents);

    let (data, malformed, records) = parse_lines(&text);

    if records == 0 {
        if let Some(first) = malformed.first() {
            return Err(PipelineError::Parse {
                path: path.to_path_buf(),
                line: first.line,
                message: first.message.clone(),
            });
        }
    }

    let metadata = SourceMetadata::new(
        path.to_path_buf(),
        table,
        content_hash(&contents),
        contents.len() as u64,
        "jsonl",
    )
    .with_shape(&data);

    Ok(TicketLog {
        table: data,
        metadata,
        malformed,
    })
}

/// Parse log text into a table; returns the table, the skipped lines and
/// the number of records accepted.
pub(crate) fn parse_lines(text: &str) -> (DataTable, Vec<MalformedLine>, usize) {
    let mut columns: IndexSet<String> = IndexSet::new();
    let mut records: Vec<IndexMap<String, String>> = Vec::new();
    let mut malformed = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match serde_json::from_str::<Value>(line) {
            Ok(Value::Object(map)) => {
                let mut record = IndexMap::new();
                flatten_object(None, &map, &mut record);
                for key in record.keys() {
                    columns.insert(key.clone());
                }
                records.push(record);
            }
            Ok(other) => malformed.push(MalformedLine {
                line: idx + 1,
                message: format!("expected a JSON object, found {}", json_kind(&other)),
            }),
            Err(e) => malformed.push(MalformedLine {
                line: idx + 1,
                message: e.to_string(),
            }),
        }
    }

    let headers: Vec<String> = columns.into_iter().collect();
    let rows = records
        .iter()
        .map(|record| {
            headers
                .iter()
                .map(|h| record.get(h).cloned().unwrap_or_default())
                .collect()
        })
        .collect();

    let count = records.len();
    (DataTable::new(headers, rows), malformed, count)
}

/// Flatten nested objects into `parent_child` keys.
///
/// Keys that collide after normalization get `_2`, `_3`, ... suffixes in
/// the order they appear, as tabular headers do.
fn flatten_object(
    prefix: Option<&str>,
    map: &serde_json::Map<String, Value>,
    out: &mut IndexMap<String, String>,
) {
    for (key, value) in map {
        let mut name = normalize_column_name(key);
        if name.is_empty() {
            name = "field".to_string();
        }
        let name = match prefix {
            Some(p) => format!("{}_{}", p, name),
            None => name,
        };

        match value {
            Value::Object(inner) if !inner.is_empty() => flatten_object(Some(&name), inner, out),
            other => {
                let name = unique_name(&name, |c| out.contains_key(c));
                out.insert(name, cell_text(other));
            }
        }
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Object(o) if o.is_empty() => String::new(),
        other => other.to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lines_normalizes_and_unions_keys() {
        let text = r#"{"Ticket ID": "T1", "agentId": "A1"}
{"ticket_id": "T2", "Status": "Open"}
"#;
        let (table, malformed, count) = parse_lines(text);

        assert_eq!(count, 2);
        assert!(malformed.is_empty());
        assert_eq!(table.headers, vec!["ticket_id", "agent_id", "status"]);
        assert_eq!(table.rows[0], vec!["T1", "A1", ""]);
        assert_eq!(table.rows[1], vec!["T2", "", "Open"]);
    }

    #[test]
    fn test_nested_objects_are_flattened() {
        let text = r#"{"ticket_id": "T1", "sentiment": {"score": 0.7, "Label": "Positive"}, "tags": ["a", "b"], "meta": {}}"#;
        let (table, _, _) = parse_lines(text);

        assert_eq!(
            table.headers,
            vec!["ticket_id", "sentiment_score", "sentiment_label", "tags", "meta"]
        );
        assert_eq!(table.rows[0], vec!["T1", "0.7", "Positive", r#"["a","b"]"#, ""]);
    }

    #[test]
    fn test_colliding_keys_are_suffixed() {
        let text = r#"{"createdAt": "a", "created_at": "b", "sentiment": {"score": 0.2}, "sentiment_score": 0.9}"#;
        let (table, _, _) = parse_lines(text);

        assert_eq!(
            table.headers,
            vec!["created_at", "created_at_2", "sentiment_score", "sentiment_score_2"]
        );
        assert_eq!(table.rows[0], vec!["a", "b", "0.2", "0.9"]);
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let text = "{\"ticket_id\": \"T1\"}\nnot json\n\n[1, 2]\n{\"ticket_id\": null}\n";
        let (table, malformed, count) = parse_lines(text);

        assert_eq!(count, 2);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows[1], vec![""]);
        assert_eq!(malformed.len(), 2);
        assert_eq!(malformed[0].line, 2);
        assert_eq!(malformed[1].line, 4);
        assert!(malformed[1].message.contains("an array"));
    }

    #[test]
    fn test_read_ticket_log_rejects_fully_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("support_tickets.jsonl");
        fs::write(&path, "oops\nstill oops\n").unwrap();

        let err = read_ticket_log(&path, "support_tickets").unwrap_err();
        assert!(matches!(err, PipelineError::Parse { line: 1, .. }));
    }

    #[test]
    fn test_read_ticket_log_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("support_tickets.jsonl");
        fs::write(&path, "{\"a\": 1}\n{\"a\": 2, \"b\": true}\n").unwrap();

        let log = read_ticket_log(&path, "support_tickets").unwrap();
        assert_eq!(log.metadata.format, "jsonl");
        assert_eq!(log.metadata.row_count, 2);
        assert_eq!(log.metadata.column_count, 2);
        assert_eq!(log.table.rows[1], vec!["2", "true"]);
    }
}
