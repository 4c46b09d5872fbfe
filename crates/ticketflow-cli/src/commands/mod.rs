//! CLI command implementations.

pub mod plot;
pub mod run;
pub mod stage;

use colored::Colorize;
use ticketflow::{Aggregates, RunContext, Severity, StageReport};

/// Print per-stage row counts, filtering steps and written files.
pub(crate) fn print_reports(ctx: &RunContext, verbose: bool) {
    for report in &ctx.reports {
        print_report(report, verbose);
    }
}

fn print_report(report: &StageReport, verbose: bool) {
    println!(
        "{} {} rows in, {} rows out",
        format!("{:>6}", report.stage.label()).cyan().bold(),
        report.input_rows.to_string().white(),
        report.output_rows.to_string().white().bold()
    );

    for step in &report.steps {
        let dropped = step.dropped();
        if dropped == 0 && !verbose {
            continue;
        }
        let dropped_text = if dropped > 0 {
            format!("-{}", dropped).red()
        } else {
            "0".normal()
        };
        println!(
            "       {:<20} {:>8} -> {:<8} ({})",
            step.name, step.rows_before, step.rows_after, dropped_text
        );
    }

    for path in &report.outputs {
        println!("       {} {}", "wrote".green(), path.display());
    }
}

/// Print warnings, and informational observations when verbose.
pub(crate) fn print_observations(ctx: &RunContext, verbose: bool) {
    let shown: Vec<_> = ctx
        .observations
        .iter()
        .filter(|o| verbose || o.severity == Severity::Warning)
        .collect();
    if shown.is_empty() {
        return;
    }

    println!();
    println!("{}", "Observations:".yellow().bold());
    for observation in shown {
        let label = match observation.severity {
            Severity::Warning => observation.kind.label().yellow(),
            Severity::Info => observation.kind.label().blue(),
        };
        println!(
            "  [{}] {} {}",
            observation.stage,
            label,
            observation.description
        );
    }
}

/// Print the headline figures of the gold stage.
pub(crate) fn print_aggregates(aggregates: &Aggregates) {
    println!();
    println!("{}", "Summary:".yellow().bold());
    println!(
        "  Tickets:        {}",
        aggregates.total_tickets.to_string().white().bold()
    );
    println!(
        "  Agents:         {}",
        aggregates.distinct_agents().to_string().white()
    );
    let average = match aggregates.overall_avg_response_time {
        Some(avg) => format!(
            "{} min over {} tickets",
            ticketflow::output::format_decimal(avg),
            aggregates.responses_measured
        ),
        None => "n/a".to_string(),
    };
    println!("  Avg response:   {}", average.white());

    let sentiment: Vec<String> = aggregates
        .tickets_by_sentiment
        .iter()
        .map(|(label, n)| format!("{} {}", label, n))
        .collect();
    println!("  Sentiment:      {}", sentiment.join(", "));
}
