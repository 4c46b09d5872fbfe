//! Fuzz target for the ticket log reader and the cleaner behind it.
//!
//! Arbitrary log contents must either be rejected with an error or flow
//! through cleaning and aggregation without panicking.

#![no_main]

use libfuzzer_sys::fuzz_target;
use std::io::Write;
use ticketflow::input::read_ticket_log;
use ticketflow::{Aggregator, Cleaner, RunContext};

fuzz_target!(|data: &[u8]| {
    if data.len() > 50_000 {
        return;
    }

    let Ok(mut temp_file) = tempfile::NamedTempFile::with_suffix(".jsonl") else {
        return;
    };
    if temp_file.write_all(data).is_err() {
        return;
    }

    let Ok(log) = read_ticket_log(temp_file.path(), "support_tickets") else {
        return;
    };

    let mut ctx = RunContext::default();
    if let Ok(clean) = Cleaner::new().clean(&log.table, &mut ctx) {
        let aggregates = Aggregator::new().aggregate(&clean, &mut ctx);
        let _ = aggregates.to_tables();
    }
});
