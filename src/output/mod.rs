//! Output module for reporting crawl and table results
//!
//! This module handles:
//! - Computing statistics over fetch results and table files
//! - Printing human-readable reports
//! - Printing the leading rows of a table

pub mod stats;

pub use stats::{
    print_crawl_statistics, print_table_statistics, ColumnStatistics, CrawlStatistics,
    TableStatistics,
};

use crate::table::{TableContents, TableResult};
use arrow::util::pretty::pretty_format_batches;

/// Renders at most `limit` leading rows of a table as an ASCII grid
pub fn format_preview(contents: &TableContents, limit: usize) -> TableResult<String> {
    let mut remaining = limit;
    let mut batches = Vec::new();

    for batch in &contents.batches {
        if remaining == 0 {
            break;
        }
        let take = remaining.min(batch.num_rows());
        batches.push(batch.slice(0, take));
        remaining -= take;
    }

    Ok(pretty_format_batches(&batches)?.to_string())
}
