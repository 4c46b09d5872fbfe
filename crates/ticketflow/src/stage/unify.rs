//! Bronze stage: discover raw sources and union them into one table.

use std::fs;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::context::RunContext;
use crate::error::{PipelineError, Result};
use crate::input::{
    content_hash, read_ticket_log, DataTable, Parser, ParserConfig, ResolvedSource, SourceResolver,
};
use crate::report::{Observation, ObservationKind, Stage, StageReport};
use crate::schema::normalize_headers;

/// Configuration for the unifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UnifierConfig {
    /// Logical tables to load (None = every table found).
    pub tables: Option<Vec<String>>,
    /// File-name prefixes accepted in addition to the canonical name, in
    /// priority order.
    pub prefixes: Vec<String>,
    /// Parser configuration for delimited files.
    pub parser: ParserConfig,
}

impl Default for UnifierConfig {
    fn default() -> Self {
        Self {
            tables: None,
            prefixes: vec!["raw_".to_string()],
            parser: ParserConfig::default(),
        }
    }
}

/// A named input table.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceTable {
    /// Logical name of the source.
    pub name: String,
    /// Parsed rows with the source's own column names.
    pub table: DataTable,
}

impl SourceTable {
    pub fn new(name: impl Into<String>, table: DataTable) -> Self {
        Self {
            name: name.into(),
            table,
        }
    }
}

/// Loads raw sources and unions them into one table with normalized columns.
pub struct Unifier {
    config: UnifierConfig,
    resolver: SourceResolver,
    parser: Parser,
}

impl Unifier {
    /// Create a unifier with default configuration.
    pub fn new() -> Self {
        Self::with_config(UnifierConfig::default())
    }

    /// Create a unifier with custom configuration.
    pub fn with_config(config: UnifierConfig) -> Self {
        let resolver = SourceResolver::with_prefixes(&config.prefixes);
        let parser = Parser::with_config(config.parser.clone());
        Self {
            config,
            resolver,
            parser,
        }
    }

    /// Load every source the layout points at and unify them.
    pub fn run(&self, ctx: &mut RunContext) -> Result<DataTable> {
        info!(raw_dir = %ctx.layout.raw_dir().display(), "Starting bronze stage");

        let sources = self.load_sources(ctx)?;
        let unified = self.unify(&sources);

        let input_rows = sources.iter().map(|s| s.table.row_count()).sum();
        let mut report = StageReport::new(Stage::Bronze, input_rows);
        report.record_step("union", input_rows, unified.row_count());
        ctx.record_report(report);

        info!(
            sources = sources.len(),
            rows = unified.row_count(),
            columns = unified.column_count(),
            "Unified raw sources"
        );
        Ok(unified)
    }

    /// Discover and parse raw sources: delimited tables in sorted logical
    /// order, then the ticket log.
    ///
    /// Unreadable sources are skipped with a warning; the call fails only
    /// when nothing could be loaded.
    pub fn load_sources(&self, ctx: &mut RunContext) -> Result<Vec<SourceTable>> {
        let raw_dir = ctx.layout.raw_dir();
        let mut sources = Vec::new();

        let resolved = if raw_dir.is_dir() {
            self.resolver.discover(&raw_dir)?
        } else {
            ctx.observe(Observation::warning(
                Stage::Bronze,
                ObservationKind::SourceMissing,
                raw_dir.display().to_string(),
                format!("Raw directory not found: {}", raw_dir.display()),
            ));
            Vec::new()
        };

        for source in self.select(resolved, ctx) {
            report_shadowed(&source, ctx);

            match self.parser.parse_file(&source.path, &source.table) {
                Ok((table, metadata)) => {
                    debug!(
                        file = %metadata.file,
                        table = %metadata.table,
                        format = %metadata.format,
                        rows = metadata.row_count,
                        columns = metadata.column_count,
                        "Loaded table"
                    );
                    sources.push(SourceTable::new(source.table, table));
                }
                Err(e) => ctx.observe(Observation::warning(
                    Stage::Bronze,
                    ObservationKind::SourceSkipped,
                    source.path.display().to_string(),
                    format!("Failed to read {}: {}", source.path.display(), e),
                )),
            }
        }

        let log_path = ctx.layout.ticket_log_path();
        let log_name = log_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "tickets".to_string());

        if log_path.is_file() {
            match read_ticket_log(&log_path, &log_name) {
                Ok(log) => {
                    if !log.malformed.is_empty() {
                        let first = &log.malformed[0];
                        ctx.observe(
                            Observation::warning(
                                Stage::Bronze,
                                ObservationKind::MalformedRecords,
                                log.metadata.file.clone(),
                                format!(
                                    "Skipped {} malformed line(s) in {} (first at line {}: {})",
                                    log.malformed.len(),
                                    log.metadata.file,
                                    first.line,
                                    first.message
                                ),
                            )
                            .with_count(log.malformed.len()),
                        );
                    }
                    debug!(
                        file = %log.metadata.file,
                        rows = log.metadata.row_count,
                        columns = log.metadata.column_count,
                        "Loaded ticket log"
                    );
                    sources.push(SourceTable::new(log_name, log.table));
                }
                Err(e) => ctx.observe(Observation::warning(
                    Stage::Bronze,
                    ObservationKind::SourceSkipped,
                    log_path.display().to_string(),
                    format!("Failed to read {}: {}", log_path.display(), e),
                )),
            }
        } else {
            ctx.observe(Observation::warning(
                Stage::Bronze,
                ObservationKind::SourceMissing,
                log_path.display().to_string(),
                format!(
                    "Ticket log not found: {}; proceeding with tables only",
                    log_path.display()
                ),
            ));
        }

        if sources.is_empty() {
            return Err(PipelineError::NoSources {
                raw_dir,
                ticket_log: log_path,
            });
        }

        Ok(sources)
    }

    /// Apply the table allow-list, reporting listed tables that are absent.
    fn select(&self, resolved: Vec<ResolvedSource>, ctx: &mut RunContext) -> Vec<ResolvedSource> {
        let Some(ref allowed) = self.config.tables else {
            return resolved;
        };

        for table in allowed {
            if !resolved.iter().any(|r| &r.table == table) {
                ctx.observe(Observation::info(
                    Stage::Bronze,
                    ObservationKind::SourceMissing,
                    table.clone(),
                    format!("No file found for table '{}' (skipping)", table),
                ));
            }
        }

        resolved
            .into_iter()
            .filter(|r| allowed.iter().any(|t| *t == r.table))
            .collect()
    }

    /// Union source tables into one table with normalized column names.
    ///
    /// Columns appear in first-seen order; cells a source does not have are
    /// null. Rows keep their source order.
    pub fn unify(&self, sources: &[SourceTable]) -> DataTable {
        let mut columns: IndexSet<String> = IndexSet::new();

        let positions: Vec<Vec<usize>> = sources
            .iter()
            .map(|source| {
                normalize_headers(&source.table.headers)
                    .into_iter()
                    .map(|name| columns.insert_full(name).0)
                    .collect()
            })
            .collect();

        let width = columns.len();
        let total: usize = sources.iter().map(|s| s.table.row_count()).sum();
        let mut rows = Vec::with_capacity(total);

        for (source, targets) in sources.iter().zip(&positions) {
            for row in &source.table.rows {
                let mut out = vec![String::new(); width];
                for (value, &target) in row.iter().zip(targets) {
                    out[target] = value.clone();
                }
                rows.push(out);
            }
        }

        DataTable::new(columns.into_iter().collect(), rows)
    }
}

impl Default for Unifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Report files that lost the tie-break for their table.
fn report_shadowed(source: &ResolvedSource, ctx: &mut RunContext) {
    if source.shadowed.is_empty() {
        return;
    }

    let selected_hash = fs::read(&source.path).ok().map(|b| content_hash(&b));

    for path in &source.shadowed {
        let same = match (&selected_hash, fs::read(path).ok()) {
            (Some(selected), Some(bytes)) => *selected == content_hash(&bytes),
            _ => false,
        };

        let observation = if same {
            Observation::info(
                Stage::Bronze,
                ObservationKind::SourceShadowed,
                path.display().to_string(),
                format!(
                    "{} has the same content as {}; using {}",
                    path.display(),
                    source.path.display(),
                    source.path.display()
                ),
            )
        } else {
            Observation::warning(
                Stage::Bronze,
                ObservationKind::SourceShadowed,
                path.display().to_string(),
                format!(
                    "{} differs from {} for table '{}'; using {} ({})",
                    path.display(),
                    source.path.display(),
                    source.table,
                    source.path.display(),
                    source.strategy
                ),
            )
        };
        ctx.observe(observation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::DataLayout;

    fn table(headers: &[&str], rows: &[&[&str]]) -> DataTable {
        DataTable::new(
            headers.iter().map(|s| s.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn test_unify_aligns_normalized_columns() {
        let sources = vec![
            SourceTable::new("orders", table(&["Order ID", "customerId"], &[&["O1", "C1"]])),
            SourceTable::new(
                "customers",
                table(&["customer_id", "Customer Name"], &[&["C2", "Ann"]]),
            ),
        ];

        let unified = Unifier::new().unify(&sources);

        assert_eq!(unified.headers, vec!["order_id", "customer_id", "customer_name"]);
        assert_eq!(unified.rows[0], vec!["O1", "C1", ""]);
        assert_eq!(unified.rows[1], vec!["", "C2", "Ann"]);
    }

    #[test]
    fn test_unify_empty_input() {
        let unified = Unifier::new().unify(&[]);
        assert_eq!(unified.column_count(), 0);
        assert!(unified.is_empty());
    }

    #[test]
    fn test_load_sources_skips_unreadable_table() {
        let dir = tempfile::tempdir().unwrap();
        let raw = dir.path().join("raw_csvs");
        fs::create_dir_all(&raw).unwrap();
        fs::write(raw.join("orders.csv"), "id,total\n1,10\n").unwrap();
        fs::write(raw.join("stores.csv"), [0xff, 0xfe, b'\n', 0x00]).unwrap();
        fs::write(dir.path().join("support_tickets.jsonl"), "{\"ticket_id\": \"T1\"}\n").unwrap();

        let mut ctx = RunContext::new(DataLayout::new(dir.path()));
        let sources = Unifier::new().load_sources(&mut ctx).unwrap();

        let names: Vec<_> = sources.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["orders", "support_tickets"]);
        assert!(ctx
            .warnings()
            .any(|o| o.kind == ObservationKind::SourceSkipped && o.subject.ends_with("stores.csv")));
    }

    #[test]
    fn test_load_sources_without_anything_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = RunContext::new(DataLayout::new(dir.path()));

        let err = Unifier::new().load_sources(&mut ctx).unwrap_err();
        assert!(matches!(err, PipelineError::NoSources { .. }));
        assert_eq!(ctx.warnings().count(), 2);
    }

    #[test]
    fn test_allow_list_reports_missing_tables() {
        let dir = tempfile::tempdir().unwrap();
        let raw = dir.path().join("raw_csvs");
        fs::create_dir_all(&raw).unwrap();
        fs::write(raw.join("orders.csv"), "id\n1\n").unwrap();
        fs::write(raw.join("stores.csv"), "id\n2\n").unwrap();

        let unifier = Unifier::with_config(UnifierConfig {
            tables: Some(vec!["orders".into(), "customers".into()]),
            ..UnifierConfig::default()
        });
        let mut ctx = RunContext::new(DataLayout::new(dir.path()));
        let sources = unifier.load_sources(&mut ctx).unwrap();

        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].name, "orders");
        assert!(ctx
            .observations
            .iter()
            .any(|o| o.kind == ObservationKind::SourceMissing && o.subject == "customers"));
    }
}
