//! Plot command - render the summary chart from the gold tables on disk.

use colored::Colorize;

use crate::chart::{self, ChartData};
use crate::config::AppConfig;

pub fn run(config: &AppConfig, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let data = ChartData::load(&config.layout)?;
    let path = config.chart_path();

    if verbose {
        println!(
            "Plotting {} agents (top {}) and {} sentiment labels",
            data.agents.len(),
            config.chart.top_n,
            data.sentiment.len()
        );
    }

    chart::write_chart(&path, &data, config.chart.top_n)?;
    println!("{} {}", "Wrote chart".green().bold(), path.display());

    Ok(())
}
