//! Delimited-text parser
//!
//! The first row is the header. Column types are inferred from all rows by
//! Arrow's CSV schema inference; empty fields are nulls. A column with no
//! values at all is stored as nullable text.

use crate::ingest::{ParseError, ParsedTable};
use arrow::csv::reader::Format;
use arrow::csv::ReaderBuilder;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use std::io::Cursor;
use std::sync::Arc;

/// Rows per decoded batch
const BATCH_SIZE: usize = 8192;

/// Parses CSV text with a header row
pub fn parse_csv(raw: &str) -> Result<ParsedTable, ParseError> {
    let format = Format::default().with_header(true);
    let (inferred, records) = format.infer_schema(Cursor::new(raw.as_bytes()), None)?;

    let fields: Vec<Field> = inferred
        .fields()
        .iter()
        .map(|field| match field.data_type() {
            DataType::Null => Field::new(field.name(), DataType::Utf8, true),
            _ => (**field).clone(),
        })
        .collect();
    let schema = Arc::new(Schema::new(fields));

    tracing::debug!(
        "Inferred {} CSV columns from {} records",
        schema.fields().len(),
        records
    );

    let reader = ReaderBuilder::new(Arc::clone(&schema))
        .with_header(true)
        .with_batch_size(BATCH_SIZE)
        .build(Cursor::new(raw.as_bytes()))?;

    let batches = reader.collect::<Result<Vec<RecordBatch>, ArrowError>>()?;

    Ok(ParsedTable { schema, batches })
}
