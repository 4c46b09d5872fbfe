//! Stage orchestration and output files.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::context::{DataLayout, RunContext};
use crate::error::{PipelineError, Result};
use crate::input::DataTable;
use crate::output::{read_table, write_table};
use crate::report::Stage;
use crate::stage::{Aggregates, Aggregator, Cleaner, CleanerConfig, Unifier, UnifierConfig};

/// Configuration for a pipeline run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Input and output locations.
    pub layout: DataLayout,
    /// Bronze stage settings.
    pub unifier: UnifierConfig,
    /// Silver stage settings.
    pub cleaner: CleanerConfig,
}

/// Row counts and aggregates from a full run.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    /// Rows in the unified table.
    pub bronze_rows: usize,
    /// Rows in the clean table.
    pub silver_rows: usize,
    /// The gold aggregates.
    pub aggregates: Aggregates,
}

/// Runs the bronze, silver and gold stages and writes their outputs.
pub struct Pipeline {
    config: PipelineConfig,
    unifier: Unifier,
    cleaner: Cleaner,
    aggregator: Aggregator,
}

impl Pipeline {
    /// Create a pipeline with default configuration.
    pub fn new() -> Self {
        Self::with_config(PipelineConfig::default())
    }

    /// Create a pipeline with custom configuration.
    pub fn with_config(config: PipelineConfig) -> Self {
        let unifier = Unifier::with_config(config.unifier.clone());
        let cleaner = Cleaner::with_config(config.cleaner.clone());

        Self {
            config,
            unifier,
            cleaner,
            aggregator: Aggregator::new(),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// A fresh run context for this pipeline's layout.
    pub fn context(&self) -> RunContext {
        RunContext::new(self.config.layout.clone())
    }

    /// Run all three stages in order.
    pub fn run(&self, ctx: &mut RunContext) -> Result<PipelineOutcome> {
        let bronze = self.run_bronze(ctx)?;
        let silver = self.run_silver(&bronze, ctx)?;
        let aggregates = self.run_gold(&silver, ctx)?;

        Ok(PipelineOutcome {
            bronze_rows: bronze.row_count(),
            silver_rows: silver.row_count(),
            aggregates,
        })
    }

    /// Unify the raw sources and write the bronze table.
    pub fn run_bronze(&self, ctx: &mut RunContext) -> Result<DataTable> {
        let unified = self.unifier.run(ctx)?;
        let path = ctx.layout.bronze_path();
        write_stage_table(ctx, Stage::Bronze, &path, &unified)?;
        Ok(unified)
    }

    /// Clean a unified table and write the silver table.
    pub fn run_silver(&self, bronze: &DataTable, ctx: &mut RunContext) -> Result<DataTable> {
        let clean = self.cleaner.clean(bronze, ctx)?;
        let path = ctx.layout.silver_path();
        write_stage_table(ctx, Stage::Silver, &path, &clean)?;
        Ok(clean)
    }

    /// Aggregate a clean table and write the gold tables.
    pub fn run_gold(&self, silver: &DataTable, ctx: &mut RunContext) -> Result<Aggregates> {
        let aggregates = self.aggregator.aggregate(silver, ctx);
        for (name, table) in aggregates.to_tables() {
            let path = ctx.layout.gold_table_path(name);
            write_stage_table(ctx, Stage::Gold, &path, &table)?;
        }
        Ok(aggregates)
    }

    /// Run the silver stage on the bronze table already on disk.
    pub fn run_silver_from_disk(&self, ctx: &mut RunContext) -> Result<DataTable> {
        let bronze = read_stage_input(Stage::Silver, &ctx.layout.bronze_path())?;
        self.run_silver(&bronze, ctx)
    }

    /// Run the gold stage on the silver table already on disk.
    pub fn run_gold_from_disk(&self, ctx: &mut RunContext) -> Result<Aggregates> {
        let silver = read_stage_input(Stage::Gold, &ctx.layout.silver_path())?;
        self.run_gold(&silver, ctx)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

fn write_stage_table(ctx: &mut RunContext, stage: Stage, path: &Path, table: &DataTable) -> Result<()> {
    write_table(path, table)?;
    info!(
        stage = %stage,
        path = %path.display(),
        rows = table.row_count(),
        "Wrote table"
    );
    ctx.record_output(stage, path);
    Ok(())
}

fn read_stage_input(stage: Stage, path: &Path) -> Result<DataTable> {
    if !path.is_file() {
        return Err(PipelineError::MissingStageInput {
            stage,
            path: path.to_path_buf(),
        });
    }
    read_table(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_stage_input() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = Pipeline::with_config(PipelineConfig {
            layout: DataLayout::new(dir.path()),
            ..Default::default()
        });
        let mut ctx = pipeline.context();

        let err = pipeline.run_gold_from_disk(&mut ctx).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::MissingStageInput {
                stage: Stage::Gold,
                ..
            }
        ));
    }

    #[test]
    fn test_config_from_partial_json() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{"layout": {"data_dir": "/srv"}, "cleaner": {"dedupe_on_ticket_id": false}}"#)
                .unwrap();

        assert_eq!(config.layout.bronze_path(), Path::new("/srv/bronze/bronze.csv"));
        assert!(!config.cleaner.dedupe_on_ticket_id);
        assert_eq!(config.unifier.prefixes, vec!["raw_"]);
    }
}
