//! Fuzz target for the pure normalization functions.
//!
//! Column names and categories must normalize idempotently, and timestamp
//! parsing must never panic on pathological input.

#![no_main]

use libfuzzer_sys::fuzz_target;
use ticketflow::schema::{
    format_timestamp, normalize_category, normalize_column_name, parse_timestamp,
};

fuzz_target!(|data: &[u8]| {
    let input = String::from_utf8_lossy(data);

    let name = normalize_column_name(&input);
    if name.is_ascii() {
        assert_eq!(normalize_column_name(&name), name);
    }

    let category = normalize_category(&input);
    if category.is_ascii() {
        assert_eq!(normalize_category(&category), category);
    }

    if let Some(ts) = parse_timestamp(&input) {
        let _ = format_timestamp(&ts);
    }
});
