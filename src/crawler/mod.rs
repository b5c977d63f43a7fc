//! Crawler module for parallel URI fetching
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching behind the `Fetch` trait
//! - The fixed-size worker pool
//! - The per-target result record
//! - Writing the collected results as a table

mod fetcher;
mod pool;
mod record;

pub use fetcher::{build_http_client, Fetch, FetchError, FetchedPage, HttpFetcher};
pub use pool::FetchPool;
pub use record::{describe_error, FetchResult, ERROR_PREFIX};

use crate::config::Config;
use crate::output::CrawlStatistics;
use crate::table::TableWriter;
use crate::HarvestError;
use std::path::{Path, PathBuf};

/// Source tag stamped into crawl output files
pub const CRAWL_SOURCE: &str = "crawl";

/// Outcome of a completed crawl
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Number of rows written
    pub rows: usize,

    /// Path of the written table
    pub output: PathBuf,

    /// Statistics over the written results
    pub statistics: CrawlStatistics,
}

/// Runs a complete crawl over HTTP
///
/// This is the main entry point for a crawl. It will:
/// 1. Build the HTTP client
/// 2. Fetch every target through the worker pool
/// 3. Write the results as a Parquet table
///
/// # Arguments
///
/// * `targets` - The URIs to fetch
/// * `output` - Destination table file
/// * `config` - Fetch and output configuration
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl completed and the table was written
/// * `Err(HarvestError)` - No targets, no results, or the write failed
pub async fn crawl<S: AsRef<str>>(
    targets: &[S],
    output: &Path,
    config: &Config,
) -> Result<CrawlReport, HarvestError> {
    let fetcher = HttpFetcher::new(&config.fetch)?;
    crawl_with(fetcher, targets, output, config).await
}

/// Runs a complete crawl with the given fetcher
pub async fn crawl_with<F, S>(
    fetcher: F,
    targets: &[S],
    output: &Path,
    config: &Config,
) -> Result<CrawlReport, HarvestError>
where
    F: Fetch + 'static,
    S: AsRef<str>,
{
    let pool =
        FetchPool::new(fetcher, config.fetch.workers).with_snippet_chars(config.fetch.snippet_chars);

    let start_time = std::time::Instant::now();
    let results = pool.run(targets).await?;

    if results.is_empty() {
        return Err(HarvestError::NoResults);
    }

    let statistics = CrawlStatistics::from_results(&results);
    tracing::info!(
        "Fetched {} targets in {:.2}s ({} succeeded, {} HTTP errors, {} failed)",
        statistics.total,
        start_time.elapsed().as_secs_f64(),
        statistics.succeeded,
        statistics.http_errors,
        statistics.failed
    );

    let writer = TableWriter::new(&config.output).with_source(CRAWL_SOURCE);
    let path = output.to_path_buf();
    let rows = tokio::task::spawn_blocking(move || writer.write_records(&path, &results))
        .await
        .map_err(|e| HarvestError::Worker(e.to_string()))??;

    Ok(CrawlReport {
        rows,
        output: output.to_path_buf(),
        statistics,
    })
}
