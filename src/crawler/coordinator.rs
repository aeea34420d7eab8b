//! Message-passing crawl coordination
//!
//! A single `Coordinator` owns all crawl state: the visited-set, the result
//! collector and the `pending` counter. Workers fetch exactly one URL each
//! and report back over a channel; they never touch shared state.
//!
//! `pending` counts workers that have been dispatched but whose message has
//! not been handled yet. Links found in a message are dispatched (and
//! counted) before that message is subtracted, so the counter only reaches
//! zero once no worker is left in flight.

use crate::crawler::fetcher::fetch_isolated;
use crate::crawler::{FetchResponse, Fetcher};
use crate::output::{CrawlResult, ResultCollector};
use crate::state::{PageState, VisitedSet};
use crate::url::PageUrl;
use crate::FetchError;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

/// Default capacity of the worker -> coordinator channel
pub const CHANNEL_CAPACITY: usize = 64;

/// Report sent by a worker once its fetch has finished
#[derive(Debug)]
pub struct FetchMessage {
    pub url: PageUrl,
    pub outcome: Result<FetchResponse, FetchError>,
}

/// Whether the coordinator expects further messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// Workers are still in flight
    Running,
    /// No worker is in flight and nothing is left to dispatch
    Complete,
}

/// Single owner of the crawl state in the message-passing strategy
pub struct Coordinator<F> {
    fetcher: Arc<F>,
    visited: VisitedSet,
    collector: ResultCollector,
    pending: usize,
    dispatched: usize,
    handled: usize,
    tx: mpsc::Sender<FetchMessage>,
    rx: mpsc::Receiver<FetchMessage>,
    /// Dropping the coordinator aborts any worker still running
    workers: JoinSet<()>,
}

impl<F: Fetcher + 'static> Coordinator<F> {
    /// Creates a coordinator with the default channel capacity
    pub fn new(fetcher: Arc<F>) -> Self {
        Self::with_capacity(fetcher, CHANNEL_CAPACITY)
    }

    /// Creates a coordinator whose channel buffers up to `capacity` messages
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn with_capacity(fetcher: Arc<F>, capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity);
        Self {
            fetcher,
            visited: VisitedSet::new(),
            collector: ResultCollector::new(),
            pending: 0,
            dispatched: 0,
            handled: 0,
            tx,
            rx,
            workers: JoinSet::new(),
        }
    }

    /// Workers dispatched whose message has not been handled yet
    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Total workers dispatched so far
    pub fn dispatched(&self) -> usize {
        self.dispatched
    }

    /// Total worker messages handled so far
    pub fn handled(&self) -> usize {
        self.handled
    }

    /// Reserves the start URL and dispatches its worker
    pub fn start(&mut self, url: PageUrl) {
        if self.visited.try_claim(&url) {
            self.dispatch(url);
        }
    }

    /// Applies one worker message to the crawl state
    ///
    /// Records the outcome, dispatches a worker for each link not yet
    /// claimed, then retires the message from `pending`.
    pub fn handle(&mut self, message: FetchMessage) -> Progress {
        let FetchMessage { url, outcome } = message;
        self.handled += 1;

        match outcome {
            Ok(response) => {
                tracing::debug!("Fetched {} ({} links)", url, response.links.len());
                self.visited.complete(&url, PageState::Fetched);
                self.collector.record_success(&url, response.body);

                for link in response.links {
                    if self.visited.try_claim(&link) {
                        self.dispatch(link);
                    }
                }
            }
            Err(e) => {
                tracing::warn!("Fetch failed for {}: {}", url, e);
                self.visited.complete(&url, PageState::Failed);
                self.collector.record_failure(&url);
            }
        }

        debug_assert!(self.pending > 0, "message handled with nothing pending");
        self.pending = self.pending.saturating_sub(1);
        tracing::trace!("{} workers pending", self.pending);

        if self.pending == 0 {
            Progress::Complete
        } else {
            Progress::Running
        }
    }

    /// Receives and handles messages until no worker is in flight
    pub async fn run(mut self) -> CrawlResult {
        while self.pending > 0 {
            // The coordinator keeps its own sender, so the channel cannot
            // close while it is waiting.
            let Some(message) = self.rx.recv().await else {
                tracing::error!("Worker channel closed with {} pending", self.pending);
                break;
            };
            if self.handle(message) == Progress::Complete {
                break;
            }
        }
        self.finish()
    }

    /// Seals the crawl state into the final result
    pub fn finish(self) -> CrawlResult {
        tracing::debug!(
            "Coordinator finished: {} dispatched, {} handled",
            self.dispatched,
            self.handled
        );
        self.collector.finish(&self.visited)
    }

    fn dispatch(&mut self, url: PageUrl) {
        self.pending += 1;
        self.dispatched += 1;
        self.workers
            .spawn(worker(url, self.fetcher.clone(), self.tx.clone()));
    }
}

/// Fetches one URL and reports the outcome; sends exactly one message
async fn worker<F>(url: PageUrl, fetcher: Arc<F>, tx: mpsc::Sender<FetchMessage>)
where
    F: Fetcher + 'static,
{
    let outcome = fetch_isolated(fetcher, url.clone()).await;
    if let Err(e) = tx.send(FetchMessage { url, outcome }).await {
        tracing::debug!("Coordinator gone, dropping result for {}", e.0.url);
    }
}

/// Crawls every URL reachable from `start` through a single coordinator
pub async fn crawl_concurrent_coordinated<F>(start: impl Into<PageUrl>, fetcher: Arc<F>) -> CrawlResult
where
    F: Fetcher + 'static,
{
    let start = start.into();
    tracing::info!("Starting coordinated concurrent crawl from {}", start);

    let mut coordinator = Coordinator::new(fetcher);
    coordinator.start(start);
    let result = coordinator.run().await;

    tracing::info!("Coordinated concurrent crawl finished: {} URLs", result.len());
    result
}
