//! Harvest: a parallel URI fetcher with columnar output
//!
//! This crate fetches a list of URIs with a fixed-size worker pool, records the
//! outcome of every fetch (including failures) and persists the results as a
//! single Parquet table. A second entry point ingests raw CSV or JSON text into
//! the same table format.

pub mod config;
pub mod crawler;
pub mod ingest;
pub mod output;
pub mod table;
pub mod targets;

use thiserror::Error;

/// Main error type for Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("No URIs found in input")]
    NoTargets,

    #[error("No results to write")]
    NoResults,

    #[error("No input data received")]
    EmptyInput,

    #[error("Error parsing input as {format}: {source}")]
    Parse {
        format: ingest::InputFormat,
        #[source]
        source: ingest::ParseError,
    },

    #[error("Error writing Parquet file: {0}")]
    Table(#[from] table::TableError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Worker task failed: {0}")]
    Worker(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{crawl, crawl_with, FetchPool, FetchResult};
pub use ingest::{detect_format, ingest, InputFormat};
pub use table::{TableRecord, TableWriter};
pub use targets::{load_targets, parse_targets, FetchTarget};
