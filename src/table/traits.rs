//! Table record trait and error types
//!
//! This module defines the interface a typed record implements to be written
//! as a table row, and the errors raised while building, writing or reading
//! tables.

use crate::table::{Cell, ColumnSpec};
use thiserror::Error;

/// Errors that can occur during table operations
#[derive(Debug, Error)]
pub enum TableError {
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No records to write")]
    Empty,

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Decode error: {0}")]
    Decode(String),
}

/// Result type for table operations
pub type TableResult<T> = Result<T, TableError>;

/// A record with a fixed set of named fields
///
/// Every record of a type produces the same field names, in the same order,
/// so a collection of them is always rectangular.
pub trait TableRecord: Sized {
    /// Column names, in column order
    fn field_names() -> &'static [&'static str];

    /// Declared column types, aligned with [`field_names`](Self::field_names)
    ///
    /// `None` leaves every column's type to be inferred from its values.
    fn column_specs() -> Option<&'static [ColumnSpec]> {
        None
    }

    /// The record's values, one per field name
    fn cells(&self) -> Vec<Cell>;

    /// Rebuilds a record from a decoded table row
    ///
    /// # Arguments
    ///
    /// * `columns` - Column names of the table the row came from
    /// * `cells` - The row's values, aligned with `columns`
    fn from_cells(columns: &[String], cells: &[Cell]) -> TableResult<Self>;
}

/// Looks up a row value by column name
pub fn cell_by_name<'a>(columns: &[String], cells: &'a [Cell], name: &str) -> TableResult<&'a Cell> {
    columns
        .iter()
        .position(|column| column == name)
        .and_then(|idx| cells.get(idx))
        .ok_or_else(|| TableError::Decode(format!("missing column '{}'", name)))
}
