//! Statistics over fetch results and written tables
//!
//! This module provides functionality for summarising a crawl and the
//! contents of a table file, and for displaying those summaries.

use crate::crawler::FetchResult;
use crate::table::TableContents;
use arrow::array::Array;
use std::collections::BTreeMap;

/// Crawl statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStatistics {
    /// Number of results
    pub total: u64,

    /// Responses with a non-error status (< 400)
    pub succeeded: u64,

    /// Responses with a 4xx or 5xx status
    pub http_errors: u64,

    /// Fetches that produced no response
    pub failed: u64,

    /// Sum of all content lengths
    pub total_bytes: u64,

    /// Count of results by status code
    pub status_counts: BTreeMap<u16, u64>,
}

impl CrawlStatistics {
    /// Computes statistics from a set of results
    pub fn from_results(results: &[FetchResult]) -> Self {
        let mut stats = Self::default();

        for result in results {
            stats.total += 1;
            stats.total_bytes += result.content_length;

            match result.status_code {
                Some(code) => {
                    *stats.status_counts.entry(code).or_insert(0) += 1;
                    if code < 400 {
                        stats.succeeded += 1;
                    } else {
                        stats.http_errors += 1;
                    }
                }
                None => stats.failed += 1,
            }
        }

        stats
    }

    /// Returns the success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.succeeded as f64 / self.total as f64) * 100.0
    }
}

/// Per-column summary of a table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnStatistics {
    pub name: String,
    pub data_type: String,
    pub nullable: bool,
    pub null_count: usize,
}

/// Table statistics summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableStatistics {
    pub rows: usize,
    pub columns: Vec<ColumnStatistics>,
}

impl TableStatistics {
    /// Computes statistics from the contents of a table file
    pub fn from_contents(contents: &TableContents) -> Self {
        let columns = contents
            .schema
            .fields()
            .iter()
            .enumerate()
            .map(|(idx, field)| ColumnStatistics {
                name: field.name().clone(),
                data_type: field.data_type().to_string(),
                nullable: field.is_nullable(),
                null_count: contents
                    .batches
                    .iter()
                    .map(|batch| batch.column(idx).null_count())
                    .sum(),
            })
            .collect();

        Self {
            rows: contents.num_rows(),
            columns,
        }
    }
}

/// Prints crawl statistics to stdout in a formatted manner
pub fn print_crawl_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Results: {}", stats.total);
    println!(
        "  Succeeded: {} ({:.1}%)",
        stats.succeeded,
        stats.success_rate()
    );
    println!("  HTTP errors: {}", stats.http_errors);
    println!("  Failed fetches: {}", stats.failed);
    println!("  Total bytes: {}", stats.total_bytes);

    if !stats.status_counts.is_empty() {
        println!();
        println!("Status Codes:");
        for (code, count) in &stats.status_counts {
            println!("  {}: {}", code, count);
        }
    }
    println!();
}

/// Prints table statistics to stdout in a formatted manner
pub fn print_table_statistics(stats: &TableStatistics) {
    println!("=== Table Statistics ===\n");

    println!("Rows: {}", stats.rows);
    println!("Columns ({}):", stats.columns.len());
    for column in &stats.columns {
        println!(
            "  {}: {}{} ({} nulls)",
            column.name,
            column.data_type,
            if column.nullable { ", nullable" } else { "" },
            column.null_count
        );
    }
    println!();
}
