//! Single-stage commands - each reads the previous stage's output from disk.

use colored::Colorize;
use ticketflow::{Pipeline, RunContext};

use super::{print_aggregates, print_observations, print_reports};
use crate::config::AppConfig;

type CommandResult = Result<(), Box<dyn std::error::Error>>;

fn start(config: &AppConfig, what: &str) -> (Pipeline, RunContext) {
    let pipeline = Pipeline::with_config(config.pipeline_config());
    let ctx = pipeline.context();
    println!(
        "{} {}",
        what.cyan().bold(),
        ctx.layout.data_dir.display().to_string().white()
    );
    (pipeline, ctx)
}

fn finish<T>(ctx: &RunContext, result: ticketflow::Result<T>, verbose: bool) -> Result<T, Box<dyn std::error::Error>> {
    print_reports(ctx, verbose);
    print_observations(ctx, verbose);
    Ok(result?)
}

pub fn unify(config: &AppConfig, verbose: bool) -> CommandResult {
    let (pipeline, mut ctx) = start(config, "Unifying raw sources in");
    let result = pipeline.run_bronze(&mut ctx);
    finish(&ctx, result, verbose)?;
    Ok(())
}

pub fn clean(config: &AppConfig, verbose: bool) -> CommandResult {
    let (pipeline, mut ctx) = start(config, "Cleaning bronze table in");
    let result = pipeline.run_silver_from_disk(&mut ctx);
    finish(&ctx, result, verbose)?;
    Ok(())
}

pub fn aggregate(config: &AppConfig, verbose: bool) -> CommandResult {
    let (pipeline, mut ctx) = start(config, "Aggregating silver table in");
    let result = pipeline.run_gold_from_disk(&mut ctx);
    let aggregates = finish(&ctx, result, verbose)?;
    print_aggregates(&aggregates);
    Ok(())
}
