//! Run command - all three stages, then the summary chart.

use colored::Colorize;
use ticketflow::Pipeline;
use tracing::warn;

use super::{print_aggregates, print_observations, print_reports};
use crate::chart::{self, ChartData};
use crate::config::AppConfig;

pub fn run(config: &AppConfig, no_plot: bool, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let pipeline = Pipeline::with_config(config.pipeline_config());
    let mut ctx = pipeline.context();

    println!(
        "{} {}",
        "Running pipeline in".cyan().bold(),
        ctx.layout.data_dir.display().to_string().white()
    );

    let result = pipeline.run(&mut ctx);
    print_reports(&ctx, verbose);
    print_observations(&ctx, verbose);
    let outcome = result?;

    print_aggregates(&outcome.aggregates);

    if no_plot {
        return Ok(());
    }

    // A chart failure never fails the run.
    let path = config.chart_path();
    let data = ChartData::from_aggregates(&outcome.aggregates);
    match chart::write_chart(&path, &data, config.chart.top_n) {
        Ok(()) => println!(
            "\n{} {}",
            "Wrote chart".green().bold(),
            path.display()
        ),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Chart not written");
            println!("\n{} {}", "Chart skipped:".yellow().bold(), e);
        }
    }

    Ok(())
}
