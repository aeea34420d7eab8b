//! Crawler module: the traversal engines and the fetcher they consume
//!
//! This module contains the core crawling logic, including:
//! - The `Fetcher` capability and a canned fixture implementation
//! - A serial depth-first engine
//! - A concurrent engine with a lock-guarded visited-set
//! - A concurrent engine with a single coordinator and worker messages
//!
//! All three engines return the same `CrawlResult` for the same fetcher and
//! start URL.

mod coordinator;
mod fetcher;
mod locked;
mod serial;

pub use coordinator::{
    crawl_concurrent_coordinated, Coordinator, FetchMessage, Progress, CHANNEL_CAPACITY,
};
pub use fetcher::{fetch_isolated, CannedFetcher, CannedPage, FetchResponse, Fetcher};
pub use locked::crawl_concurrent_locked;
pub use serial::crawl_serial;

use crate::output::CrawlResult;
use crate::url::PageUrl;
use crate::CrawlError;
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Traversal strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Serial depth-first recursion
    Serial,
    /// Concurrent tasks sharing a locked visited-set
    Locked,
    /// Concurrent workers reporting to a single coordinator
    Coordinated,
}

impl Strategy {
    /// Every strategy, in the order they are run by `all` mode
    pub const ALL: [Strategy; 3] = [Strategy::Serial, Strategy::Locked, Strategy::Coordinated];

    /// Short name used in logs and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Serial => "serial",
            Self::Locked => "locked",
            Self::Coordinated => "coordinated",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runs a crawl with the given strategy
///
/// # Arguments
///
/// * `strategy` - Which traversal engine to use
/// * `start` - The URL to start from
/// * `fetcher` - Source of page bodies and links
///
/// # Returns
///
/// The result map. A crawl cannot fail: fetch failures are recorded per URL.
///
/// # Example
///
/// ```no_run
/// use linkwalk::crawler::{crawl, CannedFetcher, Strategy};
/// use std::sync::Arc;
///
/// # async fn example() {
/// let fetcher = Arc::new(
///     CannedFetcher::new()
///         .with_page("A", "a", ["B"])
///         .with_page("B", "b", ["A"]),
/// );
/// let result = crawl(Strategy::Locked, "A", fetcher).await;
/// assert_eq!(result.len(), 2);
/// # }
/// ```
pub async fn crawl<F>(strategy: Strategy, start: impl Into<PageUrl>, fetcher: Arc<F>) -> CrawlResult
where
    F: Fetcher + 'static,
{
    match strategy {
        Strategy::Serial => crawl_serial(start, fetcher.as_ref()).await,
        Strategy::Locked => crawl_concurrent_locked(start, fetcher).await,
        Strategy::Coordinated => crawl_concurrent_coordinated(start, fetcher).await,
    }
}

/// Runs a crawl that is abandoned if it takes longer than `limit`
///
/// Dropping an unfinished crawl aborts its spawned branches or workers.
///
/// # Returns
///
/// * `Ok(CrawlResult)` - The crawl finished in time
/// * `Err(CrawlError::Timeout)` - The limit elapsed first
pub async fn crawl_with_timeout<F>(
    strategy: Strategy,
    start: impl Into<PageUrl>,
    fetcher: Arc<F>,
    limit: Duration,
) -> Result<CrawlResult, CrawlError>
where
    F: Fetcher + 'static,
{
    tokio::time::timeout(limit, crawl(strategy, start, fetcher))
        .await
        .map_err(|_| {
            tracing::warn!("{} crawl timed out after {:?}", strategy, limit);
            CrawlError::Timeout {
                strategy,
                after: limit,
            }
        })
}
