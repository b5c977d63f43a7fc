//! Parquet table reader

use crate::table::{batch_to_rows, TableError, TableRecord, TableResult, TableRows};
use arrow::datatypes::SchemaRef;
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use std::fs::File;
use std::path::Path;

/// The full contents of a Parquet table file
#[derive(Debug, Clone)]
pub struct TableContents {
    pub schema: SchemaRef,
    pub batches: Vec<RecordBatch>,
    /// File-level key/value metadata
    pub metadata: Vec<(String, Option<String>)>,
}

impl TableContents {
    pub fn num_rows(&self) -> usize {
        self.batches.iter().map(RecordBatch::num_rows).sum()
    }

    /// Returns a file metadata value by key
    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, v)| v.as_deref())
    }

    /// Decodes all batches into a single table of cells
    pub fn to_rows(&self) -> TableResult<TableRows> {
        let columns = self.schema.fields().iter().map(|f| f.name().clone()).collect();
        let mut rows = TableRows::new(columns);
        for batch in &self.batches {
            rows.extend(batch_to_rows(batch)?)?;
        }
        Ok(rows)
    }
}

/// Reads a whole Parquet file into memory
///
/// # Arguments
///
/// * `path` - Path to the Parquet file
///
/// # Returns
///
/// * `Ok(TableContents)` - Schema, record batches and file metadata
/// * `Err(TableError)` - The file is missing or not valid Parquet
pub fn read_table(path: &Path) -> TableResult<TableContents> {
    let file = File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;

    let schema = builder.schema().clone();
    let metadata = builder
        .metadata()
        .file_metadata()
        .key_value_metadata()
        .map(|kvs| {
            kvs.iter()
                .map(|kv| (kv.key.clone(), kv.value.clone()))
                .collect()
        })
        .unwrap_or_default();

    let batches = builder
        .build()?
        .collect::<Result<Vec<RecordBatch>, ArrowError>>()?;

    Ok(TableContents {
        schema,
        batches,
        metadata,
    })
}

/// Reads a Parquet file back into typed records
pub fn read_records<R: TableRecord>(path: &Path) -> TableResult<Vec<R>> {
    let contents = read_table(path)?;
    let rows = contents.to_rows()?;
    if rows.columns().is_empty() {
        return Err(TableError::Decode(format!(
            "{} has no columns",
            path.display()
        )));
    }
    rows.to_records()
}
