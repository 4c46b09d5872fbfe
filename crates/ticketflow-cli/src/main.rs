//! ticketflow CLI - bronze/silver/gold pipeline for support-ticket analytics.

mod chart;
mod cli;
mod commands;
mod config;
mod logging;

use clap::Parser;
use cli::{Cli, Commands};
use config::AppConfig;

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load(cli.config.as_deref())?.with_data_dir(cli.data_dir);

    match cli.command {
        Commands::Run { no_plot } => commands::run::run(&config, no_plot, cli.verbose),
        Commands::Unify => commands::stage::unify(&config, cli.verbose),
        Commands::Clean => commands::stage::clean(&config, cli.verbose),
        Commands::Aggregate => commands::stage::aggregate(&config, cli.verbose),
        Commands::Plot => commands::plot::run(&config, cli.verbose),
    }
}
