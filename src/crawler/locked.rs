//! Concurrent traversal over a lock-guarded visited-set
//!
//! Every branch runs as its own task. Branches race to claim URLs through a
//! shared `Mutex`; the lock is held only for the check-and-claim and for
//! recording the outcome, never across a fetch. A branch spawns one child per
//! link and waits for all of them before it returns.

use crate::crawler::fetcher::fetch_isolated;
use crate::crawler::Fetcher;
use crate::output::{CrawlResult, ResultCollector};
use crate::state::{PageState, VisitedSet};
use crate::url::PageUrl;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinSet;

/// Crawl state shared by all branches
#[derive(Debug, Default)]
struct SharedCrawl {
    visited: VisitedSet,
    collector: ResultCollector,
}

type Shared = Arc<Mutex<SharedCrawl>>;

/// Crawls every URL reachable from `start` with one task per URL
///
/// Returns once every spawned branch has finished, so the result covers the
/// whole crawl rather than just the root fetch.
pub async fn crawl_concurrent_locked<F>(start: impl Into<PageUrl>, fetcher: Arc<F>) -> CrawlResult
where
    F: Fetcher + 'static,
{
    let start = start.into();
    tracing::info!("Starting locked concurrent crawl from {}", start);

    let shared: Shared = Arc::new(Mutex::new(SharedCrawl::default()));
    visit(start, fetcher, shared.clone()).await;

    let SharedCrawl { visited, collector } = std::mem::take(&mut *lock(&shared));
    tracing::info!("Locked concurrent crawl finished: {} URLs", visited.len());
    collector.finish(&visited)
}

fn lock(shared: &Mutex<SharedCrawl>) -> MutexGuard<'_, SharedCrawl> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

fn visit<F>(url: PageUrl, fetcher: Arc<F>, shared: Shared) -> Pin<Box<dyn Future<Output = ()> + Send>>
where
    F: Fetcher + 'static,
{
    Box::pin(async move {
        let claimed = lock(&shared).visited.try_claim(&url);
        if !claimed {
            tracing::trace!("Skipping {}: claimed by another branch", url);
            return;
        }

        let outcome = fetch_isolated(fetcher.clone(), url.clone()).await;

        let links = {
            let mut state = lock(&shared);
            match outcome {
                Ok(response) => {
                    tracing::debug!("Fetched {} ({} links)", url, response.links.len());
                    state.visited.complete(&url, PageState::Fetched);
                    state.collector.record_success(&url, response.body);
                    response.links
                }
                Err(e) => {
                    tracing::warn!("Fetch failed for {}: {}", url, e);
                    state.visited.complete(&url, PageState::Failed);
                    state.collector.record_failure(&url);
                    return;
                }
            }
        };

        let mut children = JoinSet::new();
        for link in links {
            children.spawn(visit(link, fetcher.clone(), shared.clone()));
        }

        while let Some(joined) = children.join_next().await {
            if let Err(e) = joined {
                tracing::error!("Crawl branch below {} failed: {}", url, e);
            }
        }
    })
}
