//! Table module for persisting records as columnar files
//!
//! This module handles:
//! - The in-memory table model and column type inference
//! - Writing tables atomically as Parquet files
//! - Reading Parquet files back into cells or typed records

mod reader;
mod schema;
mod traits;
mod writer;

pub use reader::{read_records, read_table, TableContents};
pub use schema::{batch_to_rows, infer_column_type, Cell, ColumnSpec, ColumnType, TableRows};
pub use traits::{cell_by_name, TableError, TableRecord, TableResult};
pub use writer::{TableWriter, CREATED_AT_KEY, SOURCE_KEY};
