//! Output module for collecting and reporting crawl results
//!
//! This module handles:
//! - Collecting per-URL records while a crawl runs
//! - Recording crawl statistics
//! - Generating markdown summaries of one or more crawls

mod collector;
mod markdown;
pub mod stats;

pub use collector::{CrawlRecord, CrawlResult, ResultCollector};
pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use stats::{print_statistics, CrawlStatistics};

use crate::crawler::Strategy;
use crate::CrawlError;
use chrono::{DateTime, Utc};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// One finished crawl together with when and how it ran
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub strategy: Strategy,
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
    pub result: CrawlResult,
    pub statistics: CrawlStatistics,
}

impl CrawlReport {
    /// Builds a report; `fetch_calls` is the number of fetches the crawl made
    pub fn new(
        strategy: Strategy,
        started_at: DateTime<Utc>,
        elapsed: Duration,
        result: CrawlResult,
        fetch_calls: usize,
    ) -> Self {
        let statistics = CrawlStatistics::from_result(&result, fetch_calls);
        Self {
            strategy,
            started_at,
            elapsed,
            result,
            statistics,
        }
    }
}

/// Returns true if every report holds the same result as the first
pub fn reports_agree(reports: &[CrawlReport]) -> bool {
    ensure_agreement(reports).is_ok()
}

/// Checks that every report holds the same result as the first
///
/// # Returns
///
/// * `Ok(())` - All results match, or there are fewer than two reports
/// * `Err(CrawlError::Disagreement)` - Names the first report and the first
///   one that differs from it
pub fn ensure_agreement(reports: &[CrawlReport]) -> crate::Result<()> {
    let Some((first, rest)) = reports.split_first() else {
        return Ok(());
    };

    match rest.iter().find(|r| !r.result.same_outcome(&first.result)) {
        Some(other) => Err(CrawlError::Disagreement {
            first: first.strategy,
            other: other.strategy,
        }),
        None => Ok(()),
    }
}
