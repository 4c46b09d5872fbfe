//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// ticketflow: bronze/silver/gold pipeline for support-ticket analytics
#[derive(Parser)]
#[command(name = "ticketflow")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output (debug logs and informational observations)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Data directory (overrides the config file)
    #[arg(short, long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Run all three stages, then render the summary chart
    Run {
        /// Skip the summary chart
        #[arg(long)]
        no_plot: bool,
    },

    /// Unify raw tables and the ticket log into the bronze table
    Unify,

    /// Clean the bronze table into the silver table
    Clean,

    /// Aggregate the silver table into the gold tables
    Aggregate,

    /// Render the summary chart from the gold tables
    Plot,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_with_global_flags() {
        let cli = Cli::try_parse_from(["ticketflow", "run", "--no-plot", "-v", "--data-dir", "/tmp/d"])
            .unwrap();

        assert_eq!(cli.command, Commands::Run { no_plot: true });
        assert!(cli.verbose);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/d")));
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_parse_single_stage() {
        let cli = Cli::try_parse_from(["ticketflow", "--config", "tf.toml", "clean"]).unwrap();

        assert_eq!(cli.command, Commands::Clean);
        assert_eq!(cli.config, Some(PathBuf::from("tf.toml")));
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["ticketflow"]).is_err());
    }
}
