//! Delimited-file parser with delimiter detection.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{PipelineError, Result};
use super::source::{DataTable, SourceMetadata};

/// Delimiters to try when auto-detecting, most common export format first.
const DELIMITERS: &[u8] = &[b',', b'\t', b';', b'|'];

/// Records read from the head of a file when detecting its delimiter.
const SAMPLE_RECORDS: usize = 10;

/// Parser configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Delimiter to use (None = auto-detect).
    pub delimiter: Option<char>,
    /// Quote character.
    pub quote: char,
    /// Maximum rows to read (None = all).
    pub max_rows: Option<usize>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            delimiter: None,
            quote: '"',
            max_rows: None,
        }
    }
}

/// Parses delimited tabular files.
pub struct Parser {
    config: ParserConfig,
}

impl Parser {
    /// Create a new parser with default configuration.
    pub fn new() -> Self {
        Self {
            config: ParserConfig::default(),
        }
    }

    /// Create a parser with custom configuration.
    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Parse a file and return the data table and metadata.
    ///
    /// `table` is the logical table name recorded in the metadata.
    pub fn parse_file(&self, path: impl AsRef<Path>, table: &str) -> Result<(DataTable, SourceMetadata)> {
        let path = path.as_ref();

        let contents = fs::read(path).map_err(|e| PipelineError::io(path, e))?;
        let hash = content_hash(&contents);

        let delimiter = match self.config.delimiter {
            Some(d) => ascii_byte(d)?,
            None => detect_delimiter(&contents)?,
        };

        let data_table = self.parse_bytes(&contents, delimiter)?;

        let format = match delimiter {
            b'\t' => "tsv",
            b',' => "csv",
            b';' => "csv-semicolon",
            b'|' => "psv",
            _ => "delimited",
        };

        let metadata = SourceMetadata::new(
            path.to_path_buf(),
            table,
            hash,
            contents.len() as u64,
            format,
        )
        .with_shape(&data_table);

        Ok((data_table, metadata))
    }

    /// Parse bytes with a known delimiter.
    ///
    /// A header row is required; a header with no data rows yields an empty table.
    pub fn parse_bytes(&self, bytes: &[u8], delimiter: u8) -> Result<DataTable> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .quote(ascii_byte(self.config.quote)?)
            .flexible(true)
            .from_reader(bytes);

        let headers: Vec<String> = reader.headers()?.iter().map(|s| s.to_string()).collect();

        if headers.is_empty() {
            return Err(PipelineError::EmptyData("No columns found".to_string()));
        }

        let mut rows = Vec::new();
        for (row_idx, result) in reader.records().enumerate() {
            if let Some(max) = self.config.max_rows {
                if row_idx >= max {
                    break;
                }
            }

            let record = result?;
            rows.push(record.iter().map(|s| s.to_string()).collect());
        }

        Ok(DataTable::new(headers, rows))
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

/// SHA-256 of raw file contents, formatted as `sha256:<hex>`.
pub(crate) fn content_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("sha256:{:x}", hasher.finalize())
}

fn ascii_byte(c: char) -> Result<u8> {
    if c.is_ascii() {
        Ok(c as u8)
    } else {
        Err(PipelineError::Config(format!(
            "Delimiter and quote must be ASCII, got '{}'",
            c
        )))
    }
}

/// How well a candidate delimiter splits the head of a file.
///
/// Ordered by rows agreeing with the header width, then by that width.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct DelimiterFit {
    matching_rows: usize,
    width: usize,
}

impl DelimiterFit {
    /// Split the first records with `delimiter`; `None` when there are none.
    ///
    /// Quoting is handled by the csv reader, so delimiters inside quoted
    /// fields never count.
    fn measure(bytes: &[u8], delimiter: u8) -> Option<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .flexible(true)
            .from_reader(bytes);

        let mut widths = reader
            .byte_records()
            .map_while(|record| record.ok())
            .filter(|record| record.len() > 1 || record.iter().any(|f| !f.trim_ascii().is_empty()))
            .take(SAMPLE_RECORDS)
            .map(|record| record.len());

        let width = widths.next()?;
        let matching_rows = widths.filter(|&w| w == width).count();
        Some(Self {
            matching_rows,
            width,
        })
    }
}

/// Pick the delimiter whose rows best agree with the header.
///
/// Single-column files fall back to a comma.
fn detect_delimiter(bytes: &[u8]) -> Result<u8> {
    let mut best: Option<(DelimiterFit, u8)> = None;

    for &delimiter in DELIMITERS {
        let fit = DelimiterFit::measure(bytes, delimiter)
            .ok_or_else(|| PipelineError::EmptyData("No lines to analyze".to_string()))?;
        if fit.width < 2 {
            continue;
        }
        // Earlier delimiters win ties
        if best.as_ref().is_none_or(|(current, _)| fit > *current) {
            best = Some((fit, delimiter));
        }
    }

    Ok(best.map_or(b',', |(_, delimiter)| delimiter))
}
