//! Per-target fetch result record

use crate::crawler::fetcher::{FetchError, FetchedPage};
use crate::table::{
    cell_by_name, Cell, ColumnSpec, ColumnType, TableError, TableRecord, TableResult,
};

/// Prefix of the snippet recorded for a failed fetch
pub const ERROR_PREFIX: &str = "ERROR: ";

const fn column(column_type: ColumnType, nullable: bool) -> ColumnSpec {
    ColumnSpec {
        column_type,
        nullable,
    }
}

/// Column types of a results table, whatever the mix of outcomes
static RESULT_COLUMNS: [ColumnSpec; 4] = [
    column(ColumnType::Utf8, false),
    column(ColumnType::Int64, true),
    column(ColumnType::Int64, false),
    column(ColumnType::Utf8, false),
];

/// The outcome of one fetch attempt
///
/// Exactly one is produced per non-blank target, whether the fetch succeeded
/// or not. A failed fetch has no status, a zero length and an error
/// description as its snippet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResult {
    /// The target URI as it was dispatched
    pub uri: String,

    /// HTTP status code, `None` if no response was received
    pub status_code: Option<u16>,

    /// Length of the response body in bytes
    pub content_length: u64,

    /// Leading excerpt of the body, or the error description
    pub snippet: String,
}

impl FetchResult {
    /// Builds the record for a target that produced a response
    ///
    /// The snippet holds the first `snippet_chars` characters of the body when
    /// the status is not a client or server error, and is empty otherwise.
    pub fn from_page(uri: &str, page: FetchedPage, snippet_chars: usize) -> Self {
        let snippet = if page.is_ok() {
            page.text.chars().take(snippet_chars).collect()
        } else {
            String::new()
        };

        Self {
            uri: uri.to_string(),
            status_code: Some(page.status_code),
            content_length: page.content_length,
            snippet,
        }
    }

    /// Builds the record for a target whose fetch failed
    pub fn from_error(uri: &str, error: &FetchError) -> Self {
        Self {
            uri: uri.to_string(),
            status_code: None,
            content_length: 0,
            snippet: format!("{}{}", ERROR_PREFIX, describe_error(error)),
        }
    }

    /// True if no response was received
    pub fn is_failure(&self) -> bool {
        self.status_code.is_none()
    }
}

/// Formats an error followed by its chain of sources
pub fn describe_error(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let cause_message = cause.to_string();
        // reqwest repeats the inner message in some outer errors
        if !message.ends_with(&cause_message) {
            message.push_str(": ");
            message.push_str(&cause_message);
        }
        source = cause.source();
    }
    message
}

impl TableRecord for FetchResult {
    fn field_names() -> &'static [&'static str] {
        &["uri", "status_code", "content_length", "snippet"]
    }

    fn column_specs() -> Option<&'static [ColumnSpec]> {
        Some(&RESULT_COLUMNS)
    }

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::from(self.uri.as_str()),
            Cell::from(self.status_code.map(i64::from)),
            Cell::Int(i64::try_from(self.content_length).unwrap_or(i64::MAX)),
            Cell::from(self.snippet.as_str()),
        ]
    }

    fn from_cells(columns: &[String], cells: &[Cell]) -> TableResult<Self> {
        let uri = match cell_by_name(columns, cells, "uri")? {
            Cell::Text(s) => s.clone(),
            other => return Err(decode_error("uri", other)),
        };

        let status_code = match cell_by_name(columns, cells, "status_code")? {
            Cell::Null => None,
            Cell::Int(v) => Some(u16::try_from(*v).map_err(|_| {
                TableError::Decode(format!("status_code {} out of range", v))
            })?),
            other => return Err(decode_error("status_code", other)),
        };

        let content_length = match cell_by_name(columns, cells, "content_length")? {
            Cell::Int(v) => u64::try_from(*v).map_err(|_| {
                TableError::Decode(format!("content_length {} is negative", v))
            })?,
            other => return Err(decode_error("content_length", other)),
        };

        let snippet = match cell_by_name(columns, cells, "snippet")? {
            Cell::Text(s) => s.clone(),
            Cell::Null => String::new(),
            other => return Err(decode_error("snippet", other)),
        };

        Ok(Self {
            uri,
            status_code,
            content_length,
            snippet,
        })
    }
}

fn decode_error(column: &str, cell: &Cell) -> TableError {
    TableError::Decode(format!("unexpected value {:?} in column '{}'", cell, column))
}
