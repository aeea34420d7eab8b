//! Fetcher capability and the canned fixture implementation
//!
//! This module defines what the traversal engines consume:
//! - The `Fetcher` trait, a URL -> (body, links) lookup that may fail
//! - `fetch_isolated` and `fetch_guarded`, which contain a panicking fetch
//!   to its own URL
//! - `CannedFetcher`, a fixture-backed fetcher keyed by URL with a fixed
//!   link graph, optional simulated latency and per-URL call counting

use crate::config::Config;
use crate::url::PageUrl;
use crate::FetchError;
use futures::FutureExt;
use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::AbortHandle;

/// Successful fetch of a single page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    /// Page body content
    pub body: String,
    /// URLs referenced by the page, in page order
    pub links: Vec<PageUrl>,
}

/// Source of page content and outgoing links
///
/// Implementations must tolerate concurrent calls for different URLs. The
/// engines assume nothing about internal state; an implementation that
/// mutates its own counters brings its own synchronization.
pub trait Fetcher: Send + Sync {
    /// Fetches `url`, returning its body and the URLs it links to
    fn fetch(
        &self,
        url: &PageUrl,
    ) -> impl Future<Output = Result<FetchResponse, FetchError>> + Send;
}

/// Runs a single fetch in its own task
///
/// A fetcher that panics takes down only that task; the panic is reported
/// as `FetchError::Aborted` for `url` so the engine records a failure and
/// carries on with the rest of the crawl. Dropping the returned future
/// aborts the fetch task.
pub async fn fetch_isolated<F>(fetcher: Arc<F>, url: PageUrl) -> Result<FetchResponse, FetchError>
where
    F: Fetcher + 'static,
{
    let task_url = url.clone();
    let mut handle = tokio::spawn(async move { fetcher.fetch(&task_url).await });
    let _guard = AbortOnDrop(handle.abort_handle());

    match (&mut handle).await {
        Ok(result) => result,
        Err(e) => {
            let reason = if e.is_panic() {
                "fetcher panicked"
            } else {
                "fetch task cancelled"
            };
            tracing::error!("Fetch task for {} failed: {}", url, e);
            Err(FetchError::Aborted {
                url,
                reason: reason.to_string(),
            })
        }
    }
}

/// Runs a single fetch on the calling task, catching a panic
///
/// Used where the fetcher is borrowed rather than shared, so the fetch
/// cannot move into its own task. A panic is reported as
/// `FetchError::Aborted` for `url`, the same as `fetch_isolated`.
pub async fn fetch_guarded<F: Fetcher>(
    fetcher: &F,
    url: &PageUrl,
) -> Result<FetchResponse, FetchError> {
    match AssertUnwindSafe(fetcher.fetch(url)).catch_unwind().await {
        Ok(result) => result,
        Err(_) => {
            tracing::error!("Fetch for {} panicked", url);
            Err(FetchError::Aborted {
                url: url.clone(),
                reason: "fetcher panicked".to_string(),
            })
        }
    }
}

struct AbortOnDrop(AbortHandle);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// A canned page served by `CannedFetcher`
#[derive(Debug, Clone)]
pub struct CannedPage {
    pub body: String,
    pub links: Vec<PageUrl>,
    /// Overrides the fetcher-wide latency for this page
    pub delay: Option<Duration>,
}

/// Fetcher that serves a fixed link graph from memory
///
/// URLs without a page fail with `FetchError::NotFound`. Every call is
/// counted, found or not, so tests can assert that no URL is fetched twice.
#[derive(Debug, Default)]
pub struct CannedFetcher {
    pages: HashMap<PageUrl, CannedPage>,
    latency: Duration,
    calls: Mutex<CallLog>,
}

#[derive(Debug, Default)]
struct CallLog {
    counts: HashMap<PageUrl, usize>,
    order: Vec<PageUrl>,
}

impl CannedFetcher {
    /// Creates a fetcher with no pages and no latency
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a fetcher from the `[[page]]` entries of a configuration
    pub fn from_config(config: &Config) -> Self {
        let mut fetcher =
            Self::new().with_latency(Duration::from_millis(config.crawler.fetch_latency_ms));
        for page in &config.pages {
            fetcher.pages.insert(
                page.url.clone(),
                CannedPage {
                    body: page.body.clone(),
                    links: page.links.clone(),
                    delay: page.delay_ms.map(Duration::from_millis),
                },
            );
        }
        fetcher
    }

    /// Adds (or replaces) a page
    pub fn with_page<U, I, L>(mut self, url: U, body: &str, links: I) -> Self
    where
        U: Into<PageUrl>,
        I: IntoIterator<Item = L>,
        L: Into<PageUrl>,
    {
        self.pages.insert(
            url.into(),
            CannedPage {
                body: body.to_string(),
                links: links.into_iter().map(Into::into).collect(),
                delay: None,
            },
        );
        self
    }

    /// Sets a latency for one page, overriding the fetcher-wide latency
    ///
    /// Has no effect if the page has not been added.
    pub fn with_page_delay(mut self, url: impl Into<PageUrl>, delay: Duration) -> Self {
        if let Some(page) = self.pages.get_mut(&url.into()) {
            page.delay = Some(delay);
        }
        self
    }

    /// Sets the simulated latency applied to every fetch
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Number of times `url` has been fetched
    pub fn fetch_count(&self, url: &PageUrl) -> usize {
        self.lock_calls().counts.get(url).copied().unwrap_or(0)
    }

    /// Total number of fetch calls across all URLs
    pub fn total_fetches(&self) -> usize {
        self.lock_calls().order.len()
    }

    /// Per-URL call counts, ordered by URL
    pub fn fetch_counts(&self) -> BTreeMap<PageUrl, usize> {
        self.lock_calls()
            .counts
            .iter()
            .map(|(url, count)| (url.clone(), *count))
            .collect()
    }

    /// Every fetched URL in the order the calls were made
    pub fn fetch_order(&self) -> Vec<PageUrl> {
        self.lock_calls().order.clone()
    }

    /// URLs fetched more than once, with their call counts
    pub fn duplicate_fetches(&self) -> Vec<(PageUrl, usize)> {
        self.fetch_counts()
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .collect()
    }

    /// Clears the call counters so the same fixture can serve another crawl
    pub fn reset_counts(&self) {
        let mut calls = self.lock_calls();
        calls.counts.clear();
        calls.order.clear();
    }

    fn lock_calls(&self) -> MutexGuard<'_, CallLog> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record_call(&self, url: &PageUrl) {
        let mut calls = self.lock_calls();
        *calls.counts.entry(url.clone()).or_insert(0) += 1;
        calls.order.push(url.clone());
    }
}

impl Fetcher for CannedFetcher {
    async fn fetch(&self, url: &PageUrl) -> Result<FetchResponse, FetchError> {
        self.record_call(url);

        let page = self.pages.get(url);
        let delay = page.and_then(|p| p.delay).unwrap_or(self.latency);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        match page {
            Some(page) => {
                tracing::debug!("found: {} {:?}", url, page.body);
                Ok(FetchResponse {
                    body: page.body.clone(),
                    links: page.links.clone(),
                })
            }
            None => {
                tracing::debug!("missing: {}", url);
                Err(FetchError::NotFound(url.clone()))
            }
        }
    }
}
