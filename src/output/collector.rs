//! Result collection for a single crawl
//!
//! `ResultCollector` accumulates one record per claimed URL while a crawl
//! runs and is consumed into an immutable `CrawlResult` when it finishes.

use crate::state::VisitedSet;
use crate::url::PageUrl;
use std::collections::BTreeMap;

/// Outcome for one claimed URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlRecord {
    /// The URL this record belongs to
    pub url: PageUrl,

    /// Fetched body; `None` marks a failed fetch
    pub content: Option<String>,
}

impl CrawlRecord {
    /// A successfully fetched URL
    pub fn success(url: PageUrl, content: String) -> Self {
        Self {
            url,
            content: Some(content),
        }
    }

    /// A URL whose fetch failed
    pub fn failure(url: PageUrl) -> Self {
        Self { url, content: None }
    }

    /// Returns true if the fetch succeeded
    pub fn is_ok(&self) -> bool {
        self.content.is_some()
    }
}

/// Accumulates crawl records while a traversal runs
#[derive(Debug, Default)]
pub struct ResultCollector {
    records: BTreeMap<PageUrl, CrawlRecord>,
}

impl ResultCollector {
    /// Creates an empty collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a successful fetch of `url`
    pub fn record_success(&mut self, url: &PageUrl, content: String) {
        self.insert(CrawlRecord::success(url.clone(), content));
    }

    /// Records a failed fetch of `url`
    pub fn record_failure(&mut self, url: &PageUrl) {
        self.insert(CrawlRecord::failure(url.clone()));
    }

    /// Number of URLs recorded so far
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Seals the collector into the final result
    ///
    /// Any URL that was claimed in `visited` but never recorded (its branch
    /// was cut short) becomes a failure record, so the result holds exactly
    /// one entry per claimed URL.
    pub fn finish(mut self, visited: &VisitedSet) -> CrawlResult {
        for url in visited.pending_claims() {
            if !self.records.contains_key(&url) {
                tracing::warn!("{} was claimed but never completed", url);
                self.record_failure(&url);
            }
        }
        CrawlResult {
            records: self.records,
        }
    }

    fn insert(&mut self, record: CrawlRecord) {
        if let Some(previous) = self.records.insert(record.url.clone(), record) {
            tracing::warn!("{} recorded more than once", previous.url);
        }
    }
}

/// Final URL -> record mapping of a finished crawl
///
/// Entries are ordered by URL, so two results compare and print the same
/// way regardless of the order in which fetches completed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlResult {
    records: BTreeMap<PageUrl, CrawlRecord>,
}

impl CrawlResult {
    /// Looks up the record for `url`; `None` means the URL was never reached
    pub fn get(&self, url: &str) -> Option<&CrawlRecord> {
        self.records.get(url)
    }

    /// Returns true if `url` was reached
    pub fn contains(&self, url: &str) -> bool {
        self.records.contains_key(url)
    }

    /// Number of URLs reached
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if no URL was reached
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterates over records in URL order
    pub fn iter(&self) -> impl Iterator<Item = &CrawlRecord> {
        self.records.values()
    }

    /// All reached URLs in order
    pub fn urls(&self) -> Vec<PageUrl> {
        self.records.keys().cloned().collect()
    }

    /// Records whose fetch succeeded
    pub fn successes(&self) -> impl Iterator<Item = &CrawlRecord> {
        self.iter().filter(|r| r.is_ok())
    }

    /// Records whose fetch failed
    pub fn failures(&self) -> impl Iterator<Item = &CrawlRecord> {
        self.iter().filter(|r| !r.is_ok())
    }

    /// The result as a URL -> optional content map
    pub fn to_content_map(&self) -> BTreeMap<PageUrl, Option<String>> {
        self.records
            .iter()
            .map(|(url, record)| (url.clone(), record.content.clone()))
            .collect()
    }

    /// Returns true if both results reached the same URLs with the same
    /// outcomes and contents
    pub fn same_outcome(&self, other: &CrawlResult) -> bool {
        self == other
    }
}

impl IntoIterator for CrawlResult {
    type Item = CrawlRecord;
    type IntoIter = std::collections::btree_map::IntoValues<PageUrl, CrawlRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_values()
    }
}
