//! Example: run the full pipeline over a data directory.
//!
//! Usage:
//!   cargo run --example run_pipeline -- <data_dir>
//!
//! The directory must contain `raw_csvs/` and/or `support_tickets.jsonl`.

use std::env;
use std::path::Path;

use ticketflow::{DataLayout, Pipeline, PipelineConfig, Severity};

fn main() -> ticketflow::Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: cargo run --example run_pipeline -- <data_dir>");
        std::process::exit(1);
    }

    let data_dir = Path::new(&args[1]);
    if !data_dir.is_dir() {
        eprintln!("Error: Directory not found: {}", data_dir.display());
        std::process::exit(1);
    }

    let separator = "=".repeat(80);
    println!("{}", separator);
    println!("ticketflow: {}", data_dir.display());
    println!("{}", separator);
    println!();

    let pipeline = Pipeline::with_config(PipelineConfig {
        layout: DataLayout::new(data_dir),
        ..Default::default()
    });
    let mut ctx = pipeline.context();
    let outcome = pipeline.run(&mut ctx)?;

    println!("## Stages");
    for report in &ctx.reports {
        println!(
            "  {:8} {:>8} -> {:<8}",
            report.stage, report.input_rows, report.output_rows
        );
        for step in &report.steps {
            println!(
                "           {:20} dropped {}",
                step.name,
                step.dropped()
            );
        }
    }
    println!();

    let warnings: Vec<_> = ctx
        .observations
        .iter()
        .filter(|o| o.severity == Severity::Warning)
        .collect();
    println!("## Warnings ({})", warnings.len());
    for obs in &warnings {
        println!("  [{}] {} - {}", obs.stage, obs.kind.label(), obs.description);
    }
    println!();

    let agg = &outcome.aggregates;
    println!("## Summary");
    println!("  Tickets: {}", agg.total_tickets);
    println!("  Agents: {}", agg.distinct_agents());
    for (agent, count) in agg.tickets_per_agent.iter().take(5) {
        println!("    {:12} {}", agent, count);
    }
    for (label, count) in &agg.tickets_by_sentiment {
        println!("  {:10} {}", label, count);
    }
    println!();

    println!("{}", separator);

    Ok(())
}
