//! Summary chart rendered as a standalone SVG document.
//!
//! Left panel: horizontal bars for the busiest agents. Right panel: a
//! sentiment donut with a `label: count (pct%)` legend.

use std::f64::consts::PI;
use std::fmt::Write as _;
use std::path::Path;

use ticketflow::output::{read_table, write_bytes};
use ticketflow::stage::tables;
use ticketflow::{Aggregates, DataLayout, DataTable, PipelineError, Stage};

const WIDTH: f64 = 1200.0;
const HEIGHT: f64 = 600.0;
const PANEL_SPLIT: f64 = 700.0;
const BAR_COLOR: &str = "#4c72b0";

/// Counts the chart is drawn from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartData {
    /// Tickets per agent, busiest first.
    pub agents: Vec<(String, usize)>,
    /// Tickets per sentiment label.
    pub sentiment: Vec<(String, usize)>,
}

impl ChartData {
    pub fn from_aggregates(aggregates: &Aggregates) -> Self {
        Self {
            agents: aggregates.tickets_per_agent.clone(),
            sentiment: aggregates.tickets_by_sentiment.clone(),
        }
    }

    /// Read the counts back from the gold tables on disk.
    pub fn load(layout: &DataLayout) -> ticketflow::Result<Self> {
        Ok(Self {
            agents: read_counts(&layout.gold_table_path(tables::TICKETS_PER_AGENT))?,
            sentiment: read_counts(&layout.gold_table_path(tables::TICKETS_BY_SENTIMENT))?,
        })
    }
}

/// Read a two-column `(key, count)` table.
fn read_counts(path: &Path) -> ticketflow::Result<Vec<(String, usize)>> {
    if !path.is_file() {
        return Err(PipelineError::MissingStageInput {
            stage: Stage::Gold,
            path: path.to_path_buf(),
        });
    }

    let table: DataTable = read_table(path)?;
    let mut counts = Vec::with_capacity(table.row_count());
    for (i, row) in table.rows.iter().enumerate() {
        let key = row.first().cloned().unwrap_or_default();
        let raw = row.get(1).map(String::as_str).unwrap_or_default();
        let count = raw.trim().parse::<usize>().map_err(|e| PipelineError::Parse {
            path: path.to_path_buf(),
            line: i + 2,
            message: format!("invalid count '{}': {}", raw, e),
        })?;
        counts.push((key, count));
    }
    Ok(counts)
}

/// Render and write the chart.
pub fn write_chart(path: &Path, data: &ChartData, top_n: usize) -> ticketflow::Result<()> {
    write_bytes(path, render_svg(data, top_n).as_bytes())
}

/// Fill color for a sentiment label.
pub fn sentiment_color(label: &str) -> &'static str {
    match label {
        "positive" => "#2ca02c",
        "neutral" => "#ff7f0e",
        "negative" => "#1f77b4",
        _ => "#7f7f7f",
    }
}

/// Render the chart as an SVG document.
pub fn render_svg(data: &ChartData, top_n: usize) -> String {
    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="sans-serif">"#,
        w = WIDTH,
        h = HEIGHT
    );
    let _ = writeln!(svg, r#"<rect width="100%" height="100%" fill="white"/>"#);

    render_agent_bars(&mut svg, &data.agents, top_n);
    render_sentiment_donut(&mut svg, &data.sentiment);

    svg.push_str("</svg>\n");
    svg
}

fn render_agent_bars(svg: &mut String, agents: &[(String, usize)], top_n: usize) {
    let shown = &agents[..agents.len().min(top_n)];
    title(svg, PANEL_SPLIT / 2.0, &format!("Tickets per agent (top {})", top_n));

    let max = shown.iter().map(|(_, n)| *n).max().unwrap_or(0);
    if shown.is_empty() || max == 0 {
        placeholder(svg, PANEL_SPLIT / 2.0, "No agent data");
        return;
    }

    let label_width = 130.0;
    let bar_space = PANEL_SPLIT - label_width - 80.0;
    let top = 70.0;
    let row_height = ((HEIGHT - top - 30.0) / shown.len() as f64).min(32.0);
    let bar_height = row_height * 0.7;

    for (i, (agent, count)) in shown.iter().enumerate() {
        let y = top + i as f64 * row_height;
        let width = bar_space * *count as f64 / max as f64;
        let mid = y + bar_height / 2.0;
        let _ = writeln!(
            svg,
            r#"<text x="{:.2}" y="{:.2}" text-anchor="end" dominant-baseline="middle" font-size="12">{}</text>"#,
            label_width - 8.0,
            mid,
            escape(agent)
        );
        let _ = writeln!(
            svg,
            r#"<rect class="bar" x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="{}"/>"#,
            label_width, y, width, bar_height, BAR_COLOR
        );
        let _ = writeln!(
            svg,
            r#"<text x="{:.2}" y="{:.2}" dominant-baseline="middle" font-size="12">{}</text>"#,
            label_width + width + 6.0,
            mid,
            count
        );
    }
}

fn render_sentiment_donut(svg: &mut String, sentiment: &[(String, usize)]) {
    let center_x = PANEL_SPLIT + (WIDTH - PANEL_SPLIT) / 2.0;
    title(svg, center_x, "Sentiment distribution");

    let total: usize = sentiment.iter().map(|(_, n)| n).sum();
    if total == 0 {
        placeholder(svg, center_x, "No sentiment data");
        return;
    }

    let (cy, outer, inner) = (260.0, 150.0, 80.0);
    let slices: Vec<&(String, usize)> = sentiment.iter().filter(|(_, n)| *n > 0).collect();

    if let [(label, _)] = slices.as_slice() {
        // A single label fills the ring; an arc cannot start and end at the same point.
        let _ = writeln!(
            svg,
            r#"<circle class="slice" cx="{:.2}" cy="{:.2}" r="{:.2}" fill="none" stroke="{}" stroke-width="{:.2}"/>"#,
            center_x,
            cy,
            (outer + inner) / 2.0,
            sentiment_color(label),
            outer - inner
        );
    } else {
        let mut start = -PI / 2.0;
        for (label, count) in &slices {
            let sweep = 2.0 * PI * *count as f64 / total as f64;
            let end = start + sweep;
            let large = if sweep > PI { 1 } else { 0 };
            let point = |r: f64, a: f64| (center_x + r * a.cos(), cy + r * a.sin());
            let (ox1, oy1) = point(outer, start);
            let (ox2, oy2) = point(outer, end);
            let (ix2, iy2) = point(inner, end);
            let (ix1, iy1) = point(inner, start);
            let _ = writeln!(
                svg,
                r#"<path class="slice" d="M {:.2} {:.2} A {o} {o} 0 {l} 1 {:.2} {:.2} L {:.2} {:.2} A {i} {i} 0 {l} 0 {:.2} {:.2} Z" fill="{}" stroke="white"/>"#,
                ox1,
                oy1,
                ox2,
                oy2,
                ix2,
                iy2,
                ix1,
                iy1,
                sentiment_color(label),
                o = outer,
                i = inner,
                l = large
            );
            start = end;
        }
    }

    let legend_x = center_x - 90.0;
    for (i, (label, count)) in sentiment.iter().enumerate() {
        let y = cy + outer + 40.0 + i as f64 * 20.0;
        let pct = 100.0 * *count as f64 / total as f64;
        let _ = writeln!(
            svg,
            r#"<rect x="{:.2}" y="{:.2}" width="12" height="12" fill="{}"/>"#,
            legend_x,
            y - 10.0,
            sentiment_color(label)
        );
        let _ = writeln!(
            svg,
            r#"<text class="legend" x="{:.2}" y="{:.2}" font-size="12">{}: {} ({:.1}%)</text>"#,
            legend_x + 18.0,
            y,
            escape(label),
            count,
            pct
        );
    }
}

fn title(svg: &mut String, x: f64, text: &str) {
    let _ = writeln!(
        svg,
        r#"<text x="{:.2}" y="36" text-anchor="middle" font-size="18" font-weight="bold">{}</text>"#,
        x,
        escape(text)
    );
}

fn placeholder(svg: &mut String, x: f64, text: &str) {
    let _ = writeln!(
        svg,
        r##"<text class="placeholder" x="{:.2}" y="{:.2}" text-anchor="middle" font-size="16" fill="#7f7f7f">{}</text>"##,
        x,
        HEIGHT / 2.0,
        escape(text)
    );
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
