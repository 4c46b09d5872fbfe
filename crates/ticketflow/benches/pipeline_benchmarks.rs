//! Pipeline performance benchmarks.
//!
//! Measures the parse, clean and aggregate paths across table sizes.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ticketflow::input::Parser;
use ticketflow::{Aggregator, Cleaner, DataTable, RunContext};

/// Generate a synthetic unified table of tickets.
///
/// Roughly one row in twenty repeats an earlier ticket and one in fifty has
/// an inverted time range, so every cleaning step has work to do.
fn generate_tickets(rows: usize) -> DataTable {
    let headers = [
        "ticket_id",
        "agent_id",
        "status",
        "sentiment",
        "created_at",
        "resolved_at",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    let statuses = ["Open", "closed", "Pending", "in progress", "reopened"];
    let sentiments = ["Positive", "neutral", "NEGATIVE", ""];

    let rows = (0..rows)
        .map(|i| {
            let id = if i % 20 == 19 { i - 1 } else { i };
            let minute = (i % 50) as u32;
            let resolved = match i % 50 {
                0 => "2024-03-01T00:00:00Z".to_string(),
                n if n % 3 == 0 => String::new(),
                _ => format!("2024-03-02T10:{:02}:00Z", (minute + 7) % 60),
            };
            vec![
                format!("T{:06}", id),
                format!("A{:02}", i % 37),
                statuses[i % statuses.len()].to_string(),
                sentiments[i % sentiments.len()].to_string(),
                format!("2024-03-02T09:{:02}:00", minute),
                resolved,
            ]
        })
        .collect();

    DataTable::new(headers, rows)
}

fn to_csv(table: &DataTable) -> String {
    let mut data = table.headers.join(",");
    data.push('\n');
    for row in &table.rows {
        data.push_str(&row.join(","));
        data.push('\n');
    }
    data
}

/// Benchmark parsing delimited input of various sizes.
fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_csv");

    for rows in [1_000, 10_000].iter() {
        let data = to_csv(&generate_tickets(*rows));

        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::new("rows", rows), &data, |b, data| {
            let parser = Parser::new();
            b.iter(|| black_box(parser.parse_bytes(data.as_bytes(), b',').unwrap()))
        });
    }

    group.finish();
}

/// Benchmark the silver stage.
fn bench_clean(c: &mut Criterion) {
    let mut group = c.benchmark_group("clean");

    for rows in [1_000, 10_000, 100_000].iter() {
        let table = generate_tickets(*rows);

        group.throughput(Throughput::Elements(*rows as u64));
        group.bench_with_input(BenchmarkId::new("rows", rows), &table, |b, table| {
            let cleaner = Cleaner::new();
            b.iter(|| black_box(cleaner.clean(table, &mut RunContext::default()).unwrap()))
        });
    }

    group.finish();
}

/// Benchmark the gold stage on already-clean tickets.
fn bench_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate");

    for rows in [1_000, 10_000, 100_000].iter() {
        let clean = Cleaner::new()
            .clean(&generate_tickets(*rows), &mut RunContext::default())
            .unwrap();

        group.throughput(Throughput::Elements(clean.row_count() as u64));
        group.bench_with_input(BenchmarkId::new("rows", rows), &clean, |b, clean| {
            let aggregator = Aggregator::new();
            b.iter(|| {
                let agg = aggregator.aggregate(clean, &mut RunContext::default());
                black_box(agg.to_tables())
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_parse, bench_clean, bench_aggregate);
criterion_main!(benches);
