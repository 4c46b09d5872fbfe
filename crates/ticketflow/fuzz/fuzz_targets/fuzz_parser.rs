//! Fuzz target for the delimited-table parser.
//!
//! The parser must never panic, whatever the delimiter guess.

#![no_main]

use libfuzzer_sys::fuzz_target;
use std::io::Write;
use ticketflow::input::Parser;

fuzz_target!(|data: &[u8]| {
    // Only process reasonable-sized inputs to avoid OOM
    if data.len() > 100_000 {
        return;
    }

    let parser = Parser::new();
    for delimiter in [b',', b'\t', b';', b'|'] {
        let _ = parser.parse_bytes(data, delimiter);
    }

    if let Ok(mut temp_file) = tempfile::NamedTempFile::with_suffix(".csv") {
        if temp_file.write_all(data).is_ok() {
            let _ = parser.parse_file(temp_file.path(), "fuzz");
        }
    }
});
