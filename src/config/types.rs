use serde::Deserialize;
use std::fmt;
use std::time::Duration;

/// Default number of concurrent fetch workers
pub const DEFAULT_WORKERS: usize = 5;

/// Default per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default length of the content excerpt, in characters
pub const DEFAULT_SNIPPET_CHARS: usize = 200;

/// Default maximum number of rows per Parquet row group
pub const DEFAULT_MAX_ROW_GROUP_SIZE: usize = 8192;

/// Main configuration structure for Harvest
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Fetch pool configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FetchConfig {
    /// Number of concurrent workers in the pool
    pub workers: usize,

    /// Per-request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Number of leading characters of the body kept as the snippet
    #[serde(rename = "snippet-chars")]
    pub snippet_chars: usize,

    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            snippet_chars: DEFAULT_SNIPPET_CHARS,
            user_agent: format!("harvest/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Table output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Compression codec for column chunks
    pub compression: Compression,

    /// Maximum number of rows in a single row group
    #[serde(rename = "max-row-group-size")]
    pub max_row_group_size: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            compression: Compression::default(),
            max_row_group_size: DEFAULT_MAX_ROW_GROUP_SIZE,
        }
    }
}

/// Compression codec used for the Parquet output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    None,
    #[default]
    Snappy,
    Gzip,
    Zstd,
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::Snappy => "snappy",
            Self::Gzip => "gzip",
            Self::Zstd => "zstd",
        };
        f.write_str(name)
    }
}
