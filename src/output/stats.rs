//! Statistics for a finished crawl
//!
//! This module provides functionality for summarizing a crawl result and
//! displaying the summary.

use crate::output::{CrawlReport, CrawlResult};

/// Crawl statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStatistics {
    /// Number of URLs reached (one record each)
    pub pages_visited: usize,

    /// Number of URLs fetched successfully
    pub pages_fetched: usize,

    /// Number of URLs whose fetch failed
    pub pages_failed: usize,

    /// Number of fetch calls the crawl made
    pub fetch_calls: usize,

    /// Fetch calls beyond one per URL; zero for a correct crawl
    pub duplicate_fetches: usize,
}

impl CrawlStatistics {
    /// Computes statistics from a result and the number of fetch calls made
    pub fn from_result(result: &CrawlResult, fetch_calls: usize) -> Self {
        let pages_visited = result.len();
        let pages_fetched = result.successes().count();

        Self {
            pages_visited,
            pages_fetched,
            pages_failed: pages_visited - pages_fetched,
            fetch_calls,
            duplicate_fetches: fetch_calls.saturating_sub(pages_visited),
        }
    }

    /// Percentage of visited URLs that were fetched successfully
    pub fn success_rate(&self) -> f64 {
        if self.pages_visited == 0 {
            0.0
        } else {
            (self.pages_fetched as f64 / self.pages_visited as f64) * 100.0
        }
    }
}

/// Prints a report's outcomes and statistics to stdout
pub fn print_statistics(report: &CrawlReport) {
    let stats = &report.statistics;

    println!("=== {} crawl ===\n", report.strategy.as_str().to_uppercase());

    println!("Pages:");
    for record in report.result.iter() {
        match &record.content {
            Some(content) => println!("  found:   {} {:?}", record.url, content),
            None => println!("  missing: {}", record.url),
        }
    }
    println!();

    println!("Overview:");
    println!("  Pages visited: {}", stats.pages_visited);
    println!("  Pages fetched: {}", stats.pages_fetched);
    println!("  Pages failed: {}", stats.pages_failed);
    println!("  Fetch calls: {}", stats.fetch_calls);
    if stats.duplicate_fetches > 0 {
        println!("  Duplicate fetches: {}", stats.duplicate_fetches);
    }
    println!("  Elapsed: {:?}", report.elapsed);

    println!(
        "Success Rate: {:.1}% ({} / {} pages fetched)\n",
        stats.success_rate(),
        stats.pages_fetched,
        stats.pages_visited
    );
}
