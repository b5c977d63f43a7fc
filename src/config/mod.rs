//! Configuration module for Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key has a default, so a configuration file is optional.
//!
//! # Example
//!
//! ```no_run
//! use harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Fetching with {} workers", config.fetch.workers);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Compression, Config, FetchConfig, OutputConfig, DEFAULT_MAX_ROW_GROUP_SIZE, DEFAULT_SNIPPET_CHARS,
    DEFAULT_TIMEOUT_SECS, DEFAULT_WORKERS,
};

// Re-export parser functions
pub use parser::{load_config, parse_config};
pub use validation::validate;
