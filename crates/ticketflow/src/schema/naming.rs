//! Column-name normalization.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

/// `fooBar` / `HTTPStatus` boundaries: a capitalized word after any character.
static CAPITALIZED_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(.)([A-Z][a-z]+)").expect("valid regex"));

/// `orderID` / `line2Total` boundaries: lowercase or digit followed by uppercase.
static LOWER_UPPER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([a-z0-9])([A-Z])").expect("valid regex"));

/// Normalize a column name to lowercase `snake_case`.
///
/// Camel-case boundaries become underscores, every run of characters that is
/// not a letter or digit becomes a single underscore, and leading/trailing
/// separators are dropped. Already-normalized names are returned unchanged.
///
/// ```
/// use ticketflow::schema::normalize_column_name;
///
/// assert_eq!(normalize_column_name(" Customer Name "), "customer_name");
/// assert_eq!(normalize_column_name("orderID"), "order_id");
/// assert_eq!(normalize_column_name("HTTPStatus"), "http_status");
/// assert_eq!(normalize_column_name("order_id"), "order_id");
/// ```
pub fn normalize_column_name(name: &str) -> String {
    let trimmed = name.trim();
    let split = CAPITALIZED_WORD.replace_all(trimmed, "${1}_${2}");
    let split = LOWER_UPPER.replace_all(&split, "${1}_${2}");
    let lowered = split.to_lowercase();

    let mut out = String::with_capacity(lowered.len());
    let mut pending_sep = false;
    for ch in lowered.chars() {
        if ch.is_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.push(ch);
        } else {
            pending_sep = true;
        }
    }

    out
}

/// Normalize a full header row.
///
/// Empty names become `column_<n>` (1-based position). Names that collide
/// after normalization get `_2`, `_3`, ... suffixes in order of appearance.
pub fn normalize_headers<S: AsRef<str>>(headers: &[S]) -> Vec<String> {
    let mut used: HashSet<String> = HashSet::new();
    let mut out = Vec::with_capacity(headers.len());

    for (i, header) in headers.iter().enumerate() {
        let mut name = normalize_column_name(header.as_ref());
        if name.is_empty() {
            name = format!("column_{}", i + 1);
        }

        let candidate = unique_name(&name, |c| used.contains(c));
        used.insert(candidate.clone());
        out.push(candidate);
    }

    out
}

/// `name`, or `name_2`, `name_3`, ... for the first one not already taken.
pub(crate) fn unique_name(name: &str, taken: impl Fn(&str) -> bool) -> String {
    let mut candidate = name.to_string();
    let mut n = 2;
    while taken(&candidate) {
        candidate = format!("{}_{}", name, n);
        n += 1;
    }
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spaces_and_case() {
        assert_eq!(normalize_column_name("Customer Name"), "customer_name");
        assert_eq!(normalize_column_name("  Ticket ID  "), "ticket_id");
        assert_eq!(normalize_column_name("STATUS"), "status");
    }

    #[test]
    fn test_camel_and_pascal_case() {
        assert_eq!(normalize_column_name("createdAt"), "created_at");
        assert_eq!(normalize_column_name("FirstResponseAt"), "first_response_at");
        assert_eq!(normalize_column_name("agentID"), "agent_id");
        assert_eq!(normalize_column_name("getHTTPResponseCode"), "get_http_response_code");
    }

    #[test]
    fn test_mixed_delimiters() {
        assert_eq!(normalize_column_name("order-total ($)"), "order_total");
        assert_eq!(normalize_column_name("sentiment.score"), "sentiment_score");
        assert_eq!(normalize_column_name("a__b--c  d"), "a_b_c_d");
        assert_eq!(normalize_column_name("_private_"), "private");
    }

    #[test]
    fn test_embedded_digits() {
        assert_eq!(normalize_column_name("address2"), "address2");
        assert_eq!(normalize_column_name("Line2Total"), "line2_total");
        assert_eq!(normalize_column_name("2ndPlace"), "2nd_place");
    }

    #[test]
    fn test_idempotent_on_normalized_names() {
        for name in ["order_id", "line2_total", "sla_due_at", "x"] {
            assert_eq!(normalize_column_name(name), name);
        }
    }

    #[test]
    fn test_symbols_only_is_empty() {
        assert_eq!(normalize_column_name("  --  "), "");
        assert_eq!(normalize_column_name(""), "");
    }

    #[test]
    fn test_normalize_headers_dedupes_and_fills() {
        let headers = normalize_headers(&["Order ID", "order_id", "", "order_id_2", "OrderId"]);
        assert_eq!(
            headers,
            vec!["order_id", "order_id_2", "column_3", "order_id_2_2", "order_id_3"]
        );
    }
}
