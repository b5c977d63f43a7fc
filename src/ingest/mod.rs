//! Raw-stream ingestion
//!
//! Reads CSV or JSON text, either tagged explicitly or detected from its first
//! character, and writes it as a Parquet table through the same writer the
//! crawler uses.

mod csv;
mod detect;
mod json;

pub use csv::parse_csv;
pub use detect::{detect_format, InputFormat};
pub use json::parse_json;

use crate::table::{TableError, TableWriter};
use crate::HarvestError;
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while parsing raw input
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("{0}")]
    Csv(#[from] arrow::error::ArrowError),

    #[error("{0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Shape(String),

    #[error("{0}")]
    Table(#[from] TableError),
}

/// A parsed input, ready to be written
#[derive(Debug, Clone)]
pub struct ParsedTable {
    pub schema: SchemaRef,
    pub batches: Vec<RecordBatch>,
}

impl ParsedTable {
    pub fn num_rows(&self) -> usize {
        self.batches.iter().map(RecordBatch::num_rows).sum()
    }
}

/// Outcome of a completed ingestion
#[derive(Debug, Clone)]
pub struct IngestReport {
    /// Number of rows written
    pub rows: usize,

    /// The format the input was parsed as
    pub format: InputFormat,

    /// Path of the written table
    pub output: PathBuf,
}

/// Reads an entire stream into memory
pub fn read_input<R: Read>(mut reader: R) -> std::io::Result<String> {
    let mut raw = String::new();
    reader.read_to_string(&mut raw)?;
    Ok(raw)
}

/// Parses raw text under the given format
pub fn parse_input(raw: &str, format: InputFormat) -> Result<ParsedTable, ParseError> {
    match format {
        InputFormat::Csv => parse_csv(raw),
        InputFormat::Json => {
            let batch = parse_json(raw)?.to_record_batch()?;
            Ok(ParsedTable {
                schema: batch.schema(),
                batches: vec![batch],
            })
        }
    }
}

/// Parses raw text and writes it as a table
///
/// # Arguments
///
/// * `raw` - The entire input text
/// * `format` - Explicit format, or `None` to detect it
/// * `output` - Destination table file
/// * `writer` - The table writer to use
///
/// # Returns
///
/// * `Ok(IngestReport)` - The table was written
/// * `Err(HarvestError::EmptyInput)` - `raw` is blank
/// * `Err(HarvestError::Parse)` - `raw` is not valid under the format
/// * `Err(HarvestError::Table)` - The write failed
pub fn ingest(
    raw: &str,
    format: Option<InputFormat>,
    output: &Path,
    writer: &TableWriter,
) -> Result<IngestReport, HarvestError> {
    if raw.trim().is_empty() {
        return Err(HarvestError::EmptyInput);
    }

    let format = match format {
        Some(format) => format,
        None => {
            let detected = detect_format(raw);
            tracing::info!("Detected input format: {}", detected);
            detected
        }
    };

    let parsed =
        parse_input(raw, format).map_err(|source| HarvestError::Parse { format, source })?;

    tracing::debug!(
        "Parsed {} rows and {} columns",
        parsed.num_rows(),
        parsed.schema.fields().len()
    );

    let rows = writer
        .clone()
        .with_source(format!("ingest:{}", format))
        .write_batches(output, parsed.schema, &parsed.batches)?;

    Ok(IngestReport {
        rows,
        format,
        output: output.to_path_buf(),
    })
}
