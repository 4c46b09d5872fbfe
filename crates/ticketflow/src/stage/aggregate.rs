//! Gold stage: grouped aggregates over the clean tickets.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::context::RunContext;
use crate::input::DataTable;
use crate::output::format_decimal;
use crate::report::{Observation, ObservationKind, Stage, StageReport};
use crate::schema::{fields, SENTIMENT_LABELS};

/// Names of the gold tables, in output order.
pub mod tables {
    pub const TICKETS_PER_AGENT: &str = "tickets_per_agent";
    pub const TICKETS_BY_STATUS: &str = "tickets_by_status";
    pub const TICKETS_BY_SENTIMENT: &str = "tickets_by_sentiment";
    pub const AVG_RESPONSE_TIME_PER_AGENT: &str = "avg_response_time_per_agent";
    pub const GOLD_SUMMARY: &str = "gold_summary";

    pub const ALL: [&str; 5] = [
        TICKETS_PER_AGENT,
        TICKETS_BY_STATUS,
        TICKETS_BY_SENTIMENT,
        AVG_RESPONSE_TIME_PER_AGENT,
        GOLD_SUMMARY,
    ];
}

/// Group key for tickets whose sentiment cell is null.
const NULL_SENTIMENT: &str = "neutral";

/// Group key for tickets without a status.
pub const UNKNOWN_STATUS: &str = "unknown";

/// Aggregates computed from the clean tickets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregates {
    /// Rows in the clean table.
    pub total_tickets: usize,
    /// Ticket count per agent, busiest first.
    pub tickets_per_agent: Vec<(String, usize)>,
    /// Ticket count per status, sorted by status.
    pub tickets_by_status: Vec<(String, usize)>,
    /// Ticket count per sentiment label: the expected labels first, then
    /// unexpected ones sorted.
    pub tickets_by_sentiment: Vec<(String, usize)>,
    /// Mean response time per agent, sorted by agent.
    pub avg_response_time_per_agent: Vec<(String, f64)>,
    /// Tickets with a response time.
    pub responses_measured: usize,
    /// Mean response time over all measured tickets.
    pub overall_avg_response_time: Option<f64>,
}

impl Aggregates {
    pub fn distinct_agents(&self) -> usize {
        self.tickets_per_agent.len()
    }

    /// Render the five gold tables, in output order.
    pub fn to_tables(&self) -> Vec<(&'static str, DataTable)> {
        vec![
            (
                tables::TICKETS_PER_AGENT,
                count_table(fields::AGENT_ID, &self.tickets_per_agent),
            ),
            (
                tables::TICKETS_BY_STATUS,
                count_table(fields::STATUS, &self.tickets_by_status),
            ),
            (
                tables::TICKETS_BY_SENTIMENT,
                count_table(fields::SENTIMENT_LABEL, &self.tickets_by_sentiment),
            ),
            (
                tables::AVG_RESPONSE_TIME_PER_AGENT,
                DataTable::new(
                    vec![
                        fields::AGENT_ID.to_string(),
                        fields::AVG_RESPONSE_TIME_MINUTES.to_string(),
                    ],
                    self.avg_response_time_per_agent
                        .iter()
                        .map(|(agent, avg)| vec![agent.clone(), format_decimal(*avg)])
                        .collect(),
                ),
            ),
            (tables::GOLD_SUMMARY, self.summary_table()),
        ]
    }

    /// Long-format summary: one `(metric, key, value)` row per figure.
    pub fn summary_table(&self) -> DataTable {
        let mut table = DataTable::with_headers(["metric", "key", "value"]);
        let mut push = |metric: &str, key: &str, value: String| {
            table.push_row(vec![metric.to_string(), key.to_string(), value]);
        };

        push("total_tickets", "", self.total_tickets.to_string());
        push("distinct_agents", "", self.distinct_agents().to_string());
        push(
            "tickets_with_response_time",
            "",
            self.responses_measured.to_string(),
        );
        push(
            fields::AVG_RESPONSE_TIME_MINUTES,
            "overall",
            self.overall_avg_response_time
                .map(format_decimal)
                .unwrap_or_default(),
        );

        let groups = [
            (tables::TICKETS_BY_STATUS, &self.tickets_by_status),
            (tables::TICKETS_BY_SENTIMENT, &self.tickets_by_sentiment),
            (tables::TICKETS_PER_AGENT, &self.tickets_per_agent),
        ];
        for (metric, counts) in groups {
            for (key, count) in counts {
                push(metric, key, count.to_string());
            }
        }
        for (agent, avg) in &self.avg_response_time_per_agent {
            push(tables::AVG_RESPONSE_TIME_PER_AGENT, agent, format_decimal(*avg));
        }

        table
    }
}

fn count_table(key: &str, counts: &[(String, usize)]) -> DataTable {
    DataTable::new(
        vec![key.to_string(), fields::TICKETS_COUNT.to_string()],
        counts
            .iter()
            .map(|(k, n)| vec![k.clone(), n.to_string()])
            .collect(),
    )
}

/// Computes the gold aggregates.
#[derive(Debug, Clone, Copy, Default)]
pub struct Aggregator;

impl Aggregator {
    pub fn new() -> Self {
        Self
    }

    /// Aggregate a clean table.
    ///
    /// A missing agent or status column yields an empty group list; a missing
    /// sentiment column yields zero counts for the expected labels. A null
    /// sentiment cell counts as neutral.
    pub fn aggregate(&self, clean: &DataTable, ctx: &mut RunContext) -> Aggregates {
        info!(rows = clean.row_count(), "Starting gold stage");

        let agent_col = clean.column_index(fields::AGENT_ID);
        let status_col = clean.column_index(fields::STATUS);
        let sentiment_col = clean.column_index(fields::SENTIMENT_LABEL);
        let response_col = clean.column_index(fields::RESPONSE_TIME_MINUTES);

        let mut per_agent: BTreeMap<&str, usize> = BTreeMap::new();
        let mut by_status: BTreeMap<&str, usize> = BTreeMap::new();
        let mut by_sentiment: BTreeMap<&str, usize> = BTreeMap::new();
        let mut response: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
        let mut measured = 0usize;
        let mut response_sum = 0.0;
        let mut unreadable = 0usize;

        for row in 0..clean.row_count() {
            let agent = clean.present(row, agent_col);
            if let Some(agent) = agent {
                *per_agent.entry(agent).or_default() += 1;
            }
            if status_col.is_some() {
                let status = clean.present(row, status_col).unwrap_or(UNKNOWN_STATUS);
                *by_status.entry(status).or_default() += 1;
            }
            if sentiment_col.is_some() {
                let label = clean.present(row, sentiment_col).unwrap_or(NULL_SENTIMENT);
                *by_sentiment.entry(label).or_default() += 1;
            }

            let Some(raw) = clean.present(row, response_col) else {
                continue;
            };
            match raw.parse::<f64>() {
                Ok(minutes) if minutes.is_finite() => {
                    measured += 1;
                    response_sum += minutes;
                    if let Some(agent) = agent {
                        let entry = response.entry(agent).or_insert((0.0, 0));
                        entry.0 += minutes;
                        entry.1 += 1;
                    }
                }
                _ => unreadable += 1,
            }
        }

        if unreadable > 0 {
            ctx.observe(
                Observation::warning(
                    Stage::Gold,
                    ObservationKind::ValuesCoerced,
                    fields::RESPONSE_TIME_MINUTES,
                    format!("{} unreadable response time(s) ignored", unreadable),
                )
                .with_count(unreadable),
            );
        }

        let mut tickets_per_agent: Vec<(String, usize)> = per_agent
            .into_iter()
            .map(|(agent, n)| (agent.to_string(), n))
            .collect();
        // BTreeMap order breaks ties by agent id
        tickets_per_agent.sort_by(|a, b| b.1.cmp(&a.1));

        let tickets_by_status = by_status
            .into_iter()
            .map(|(status, n)| (status.to_string(), n))
            .collect();

        let mut tickets_by_sentiment: Vec<(String, usize)> = SENTIMENT_LABELS
            .iter()
            .map(|label| (label.to_string(), by_sentiment.remove(label).unwrap_or(0)))
            .collect();
        tickets_by_sentiment.extend(
            by_sentiment
                .into_iter()
                .map(|(label, n)| (label.to_string(), n)),
        );

        let avg_response_time_per_agent = response
            .into_iter()
            .map(|(agent, (sum, n))| (agent.to_string(), sum / n as f64))
            .collect();

        let aggregates = Aggregates {
            total_tickets: clean.row_count(),
            tickets_per_agent,
            tickets_by_status,
            tickets_by_sentiment,
            avg_response_time_per_agent,
            responses_measured: measured,
            overall_avg_response_time: (measured > 0).then(|| response_sum / measured as f64),
        };

        ctx.record_report(StageReport::new(Stage::Gold, clean.row_count()));

        debug!(
            agents = aggregates.distinct_agents(),
            statuses = aggregates.tickets_by_status.len(),
            measured = aggregates.responses_measured,
            "Computed aggregates"
        );
        aggregates
    }
}
