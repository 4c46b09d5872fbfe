//! Silver stage: validate, de-duplicate and derive ticket fields.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::context::RunContext;
use crate::error::{PipelineError, Result};
use crate::input::DataTable;
use crate::output::format_decimal;
use crate::report::{Observation, ObservationKind, Severity, Stage, StageReport};
use crate::schema::{
    fields, format_timestamp, parse_timestamp, Category, SentimentThresholds, Vocabulary,
};

/// Names of the cleaning steps, in the order they run.
pub mod steps {
    pub const REQUIRED_FIELDS: &str = "required_fields";
    pub const CREATED_TIMESTAMP: &str = "created_timestamp";
    pub const TIME_RANGE: &str = "time_range";
    pub const EXACT_DUPLICATES: &str = "exact_duplicates";
    pub const NATURAL_KEY: &str = "natural_key";
}

/// Flag added when a status is outside the vocabulary.
pub const FLAG_UNEXPECTED_STATUS: &str = "unexpected_status";
/// Flag added when a sentiment label is outside the vocabulary.
pub const FLAG_UNEXPECTED_SENTIMENT: &str = "unexpected_sentiment";

/// Configuration for the cleaner.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanerConfig {
    /// Ticket identifier; required and used as the natural key.
    pub ticket_id_column: String,
    /// Agent identifier; required.
    pub agent_id_column: String,
    /// Creation timestamp; required and parseable.
    pub created_column: String,
    /// Resolution timestamps; the first parseable one ends the response time.
    pub resolution_columns: Vec<String>,
    /// Other timestamps rewritten in canonical form when present.
    pub extra_timestamp_columns: Vec<String>,
    /// Ticket status.
    pub status_column: String,
    /// Known statuses.
    pub status_vocabulary: Vocabulary,
    /// Known sentiment labels.
    pub sentiment_vocabulary: Vocabulary,
    /// Cut-offs for deriving a label from a numeric score.
    pub sentiment_thresholds: SentimentThresholds,
    /// Collapse rows sharing a ticket identifier.
    pub dedupe_on_ticket_id: bool,
}

impl Default for CleanerConfig {
    fn default() -> Self {
        Self {
            ticket_id_column: fields::TICKET_ID.to_string(),
            agent_id_column: fields::AGENT_ID.to_string(),
            created_column: fields::CREATED_AT.to_string(),
            resolution_columns: vec![
                fields::RESOLVED_AT.to_string(),
                fields::FIRST_RESPONSE_AT.to_string(),
            ],
            extra_timestamp_columns: vec![
                "updated_at".to_string(),
                "sla_due_at".to_string(),
                "order_timestamp".to_string(),
                "last_delivery_at".to_string(),
            ],
            status_column: fields::STATUS.to_string(),
            status_vocabulary: Vocabulary::status(),
            sentiment_vocabulary: Vocabulary::sentiment(),
            sentiment_thresholds: SentimentThresholds::default(),
            dedupe_on_ticket_id: true,
        }
    }
}

/// Column positions resolved once per input table.
struct Columns {
    ticket: Option<usize>,
    agent: Option<usize>,
    created: Option<usize>,
    resolution: Vec<(String, usize)>,
    extra: Vec<(String, usize)>,
    status: Option<usize>,
    sentiment_label: Option<usize>,
    sentiment: Option<usize>,
    sentiment_score: Option<usize>,
}

/// A row that passed validation, with its parsed timestamps.
struct ValidRow {
    index: usize,
    created: DateTime<Utc>,
    resolved: Option<DateTime<Utc>>,
}

/// Tallies collected while deriving fields.
#[derive(Default)]
struct Tallies {
    coerced: BTreeMap<String, usize>,
    unexpected_status: BTreeMap<String, usize>,
    unexpected_sentiment: BTreeMap<String, usize>,
    sentiment_defaulted: usize,
}

impl Tallies {
    fn absorb(&mut self, other: Tallies) {
        let maps = [
            (&mut self.coerced, other.coerced),
            (&mut self.unexpected_status, other.unexpected_status),
            (&mut self.unexpected_sentiment, other.unexpected_sentiment),
        ];
        for (into, from) in maps {
            for (key, count) in from {
                *into.entry(key).or_default() += count;
            }
        }
        self.sentiment_defaulted += other.sentiment_defaulted;
    }
}

/// Output cells for a ticket, with the tallies they produced.
struct DerivedRow {
    cells: Vec<String>,
    tallies: Tallies,
}

/// Validates the unified table and produces one row per ticket.
pub struct Cleaner {
    config: CleanerConfig,
}

impl Cleaner {
    /// Create a cleaner with default configuration.
    pub fn new() -> Self {
        Self::with_config(CleanerConfig::default())
    }

    /// Create a cleaner with custom configuration.
    pub fn with_config(config: CleanerConfig) -> Self {
        Self { config }
    }

    /// Clean a unified table.
    ///
    /// Every input column is kept; `response_time_minutes`,
    /// `sentiment_label` and `quality_flags` are added (or overwritten).
    /// Fails with [`PipelineError::EmptyStageResult`] when non-empty input
    /// leaves no rows.
    pub fn clean(&self, input: &DataTable, ctx: &mut RunContext) -> Result<DataTable> {
        info!(rows = input.row_count(), "Starting silver stage");

        let cols = self.locate(input);
        let total = input.row_count();
        let mut report = StageReport::new(Stage::Silver, total);

        let required: Vec<usize> = (0..total)
            .filter(|&i| input.present(i, cols.ticket).is_some() && input.present(i, cols.agent).is_some())
            .collect();
        record_step(
            &mut report,
            ctx,
            steps::REQUIRED_FIELDS,
            total,
            required.len(),
            Severity::Info,
            &format!(
                "missing {} or {}",
                self.config.ticket_id_column, self.config.agent_id_column
            ),
        );

        let timed: Vec<(usize, DateTime<Utc>)> = required
            .iter()
            .filter_map(|&i| {
                input
                    .present(i, cols.created)
                    .and_then(parse_timestamp)
                    .map(|ts| (i, ts))
            })
            .collect();
        record_step(
            &mut report,
            ctx,
            steps::CREATED_TIMESTAMP,
            required.len(),
            timed.len(),
            Severity::Warning,
            &format!("missing or unparsable {}", self.config.created_column),
        );

        let mut valid = Vec::with_capacity(timed.len());
        for &(index, created) in &timed {
            let mut resolved = None;
            let mut inverted = false;
            for (_, col) in &cols.resolution {
                if let Some(ts) = input.present(index, Some(*col)).and_then(parse_timestamp) {
                    inverted |= ts < created;
                    resolved.get_or_insert(ts);
                }
            }
            if !inverted {
                valid.push(ValidRow {
                    index,
                    created,
                    resolved,
                });
            }
        }
        record_step(
            &mut report,
            ctx,
            steps::TIME_RANGE,
            timed.len(),
            valid.len(),
            Severity::Warning,
            "resolution timestamp earlier than creation",
        );

        // Duplicates are judged on canonical cells so a second pass finds none.
        let mut output = Self::output_table(input);
        let mut rows: Vec<DerivedRow> = valid
            .iter()
            .map(|row| self.derive_row(input, &cols, &output, row))
            .collect();

        let before = rows.len();
        let mut seen_rows: HashSet<Vec<String>> = HashSet::new();
        rows.retain(|r| seen_rows.insert(r.cells.clone()));
        record_step(
            &mut report,
            ctx,
            steps::EXACT_DUPLICATES,
            before,
            rows.len(),
            Severity::Info,
            "exact duplicate rows",
        );

        if self.config.dedupe_on_ticket_id {
            let before = rows.len();
            let mut seen_ids: HashSet<String> = HashSet::new();
            rows.retain(|r| {
                let id = cols.ticket.map(|c| r.cells[c].clone()).unwrap_or_default();
                seen_ids.insert(id)
            });
            record_step(
                &mut report,
                ctx,
                steps::NATURAL_KEY,
                before,
                rows.len(),
                Severity::Info,
                &format!("duplicate {}", self.config.ticket_id_column),
            );
        }

        ctx.record_report(report);

        if total > 0 && rows.is_empty() {
            return Err(PipelineError::EmptyStageResult {
                stage: Stage::Silver,
                input_rows: total,
            });
        }

        let mut tallies = Tallies::default();
        for row in rows {
            tallies.absorb(row.tallies);
            output.rows.push(row.cells);
        }
        self.report_tallies(&tallies, ctx);

        info!(
            rows_in = total,
            rows_out = output.row_count(),
            "Cleaned unified table"
        );
        Ok(output)
    }

    fn locate(&self, input: &DataTable) -> Columns {
        let c = &self.config;
        let named = |names: &[String]| -> Vec<(String, usize)> {
            names
                .iter()
                .filter_map(|n| input.column_index(n).map(|i| (n.clone(), i)))
                .collect()
        };

        Columns {
            ticket: input.column_index(&c.ticket_id_column),
            agent: input.column_index(&c.agent_id_column),
            created: input.column_index(&c.created_column),
            resolution: named(&c.resolution_columns),
            extra: named(&c.extra_timestamp_columns),
            status: input.column_index(&c.status_column),
            sentiment_label: input.column_index(fields::SENTIMENT_LABEL),
            sentiment: input.column_index(fields::SENTIMENT),
            sentiment_score: input.column_index(fields::SENTIMENT_SCORE),
        }
    }

    /// Empty output table: the input headers plus the derived columns.
    fn output_table(input: &DataTable) -> DataTable {
        let mut output = DataTable::with_headers(input.headers.clone());
        output.add_column(fields::RESPONSE_TIME_MINUTES, "");
        output.add_column(fields::SENTIMENT_LABEL, "");
        output.add_column(fields::QUALITY_FLAGS, "");
        output
    }

    /// Canonical output cells for one validated ticket.
    fn derive_row(
        &self,
        input: &DataTable,
        cols: &Columns,
        output: &DataTable,
        row: &ValidRow,
    ) -> DerivedRow {
        let i = row.index;
        let mut tallies = Tallies::default();
        let mut cells = input.rows[i].clone();
        cells.resize(output.column_count(), String::new());
        let mut flags: Vec<&str> = Vec::new();

        for col in [cols.ticket, cols.agent].into_iter().flatten() {
            cells[col] = input.present(i, Some(col)).unwrap_or_default().to_string();
        }
        if let Some(col) = cols.created {
            cells[col] = format_timestamp(&row.created);
        }
        for (name, col) in cols.resolution.iter().chain(&cols.extra) {
            cells[*col] = match input.present(i, Some(*col)) {
                Some(raw) => match parse_timestamp(raw) {
                    Some(ts) => format_timestamp(&ts),
                    None => {
                        *tallies.coerced.entry(name.clone()).or_default() += 1;
                        String::new()
                    }
                },
                None => String::new(),
            };
        }

        if let Some(col) = output.column_index(fields::RESPONSE_TIME_MINUTES) {
            cells[col] = row
                .resolved
                .map(|resolved| response_minutes(row.created, resolved))
                .map(format_decimal)
                .unwrap_or_default();
        }

        if let Some(col) = cols.status {
            let status = input
                .present(i, Some(col))
                .map(|raw| self.config.status_vocabulary.classify(raw))
                .filter(|status| !DataTable::is_null_value(status.value()));
            cells[col] = match status {
                Some(status) => {
                    if status.is_unexpected() {
                        flags.push(FLAG_UNEXPECTED_STATUS);
                        *tallies
                            .unexpected_status
                            .entry(status.value().to_string())
                            .or_default() += 1;
                    }
                    status.value().to_string()
                }
                None => String::new(),
            };
        }

        let sentiment = self.sentiment_of(input, i, cols, &mut tallies);
        if sentiment.is_unexpected() {
            flags.push(FLAG_UNEXPECTED_SENTIMENT);
            *tallies
                .unexpected_sentiment
                .entry(sentiment.value().to_string())
                .or_default() += 1;
        }
        if let Some(col) = output.column_index(fields::SENTIMENT_LABEL) {
            cells[col] = sentiment.value().to_string();
        }
        if let Some(col) = output.column_index(fields::QUALITY_FLAGS) {
            cells[col] = flags.join(";");
        }

        DerivedRow { cells, tallies }
    }

    /// Sentiment label from an explicit label, else from a score, else neutral.
    fn sentiment_of(&self, input: &DataTable, i: usize, cols: &Columns, tallies: &mut Tallies) -> Category {
        let sentiment_text = input.present(i, cols.sentiment);
        let sentiment_number = sentiment_text.and_then(|s| s.parse::<f64>().ok());

        let label = input
            .present(i, cols.sentiment_label)
            .or(sentiment_text.filter(|_| sentiment_number.is_none()))
            .map(|raw| self.config.sentiment_vocabulary.classify(raw))
            // Separator-only or null-like labels ("--", "none_") carry no label.
            .filter(|label| !DataTable::is_null_value(label.value()));
        if let Some(label) = label {
            return label;
        }

        let score = input
            .present(i, cols.sentiment_score)
            .and_then(|s| s.parse::<f64>().ok())
            .or(sentiment_number)
            .filter(|s| s.is_finite());
        match score {
            Some(score) => Category::Expected(self.config.sentiment_thresholds.label(score).to_string()),
            None => {
                tallies.sentiment_defaulted += 1;
                Category::Expected("neutral".to_string())
            }
        }
    }

    fn report_tallies(&self, tallies: &Tallies, ctx: &mut RunContext) {
        for (column, count) in &tallies.coerced {
            ctx.observe(
                Observation::warning(
                    Stage::Silver,
                    ObservationKind::ValuesCoerced,
                    column.clone(),
                    format!("{} unparsable value(s) in '{}' set to null", count, column),
                )
                .with_count(*count),
            );
        }

        if tallies.sentiment_defaulted > 0 {
            ctx.observe(
                Observation::info(
                    Stage::Silver,
                    ObservationKind::ValuesDefaulted,
                    fields::SENTIMENT_LABEL,
                    format!(
                        "{} ticket(s) without a sentiment label or score counted as neutral",
                        tallies.sentiment_defaulted
                    ),
                )
                .with_count(tallies.sentiment_defaulted),
            );
        }

        let unexpected = [
            (self.config.status_column.as_str(), &tallies.unexpected_status),
            (fields::SENTIMENT_LABEL, &tallies.unexpected_sentiment),
        ];
        for (column, values) in unexpected {
            for (value, count) in values {
                ctx.observe(
                    Observation::warning(
                        Stage::Silver,
                        ObservationKind::UnexpectedCategory,
                        column,
                        format!(
                            "Unexpected {} '{}' in {} row(s); kept and flagged",
                            column, value, count
                        ),
                    )
                    .with_count(*count),
                );
            }
        }
    }
}

impl Default for Cleaner {
    fn default() -> Self {
        Self::new()
    }
}

/// Minutes between two timestamps.
fn response_minutes(created: DateTime<Utc>, resolved: DateTime<Utc>) -> f64 {
    (resolved - created).num_milliseconds() as f64 / 60_000.0
}

fn record_step(
    report: &mut StageReport,
    ctx: &mut RunContext,
    name: &str,
    before: usize,
    after: usize,
    severity: Severity,
    reason: &str,
) {
    report.record_step(name, before, after);
    info!(step = name, before, after, "Cleaning step");

    let dropped = before - after;
    if dropped > 0 {
        ctx.observe(
            Observation::new(
                Stage::Silver,
                ObservationKind::RowsRejected,
                severity,
                name,
                format!("Dropped {} row(s): {}", dropped, reason),
            )
            .with_count(dropped),
        );
    }
}
