//! Input format tags and detection

use serde::Deserialize;
use std::fmt;

/// Format of a raw input stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    /// Delimited text with a header row
    Csv,
    /// JSON records or columns
    Json,
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Csv => f.write_str("csv"),
            Self::Json => f.write_str("json"),
        }
    }
}

/// Classifies raw input by its first non-whitespace character
///
/// Text starting with `{` or `[` is JSON; anything else is CSV.
///
/// # Example
///
/// ```
/// use harvest::ingest::{detect_format, InputFormat};
///
/// assert_eq!(detect_format("  [{\"a\": 1}]"), InputFormat::Json);
/// assert_eq!(detect_format("a,b\n1,2\n"), InputFormat::Csv);
/// ```
pub fn detect_format(raw: &str) -> InputFormat {
    match raw.trim_start().chars().next() {
        Some('{') | Some('[') => InputFormat::Json,
        _ => InputFormat::Csv,
    }
}
