//! Visited-set tracking which URLs have been claimed
//!
//! Every engine consults this set before fetching. Claiming is a single
//! check-and-insert, so whoever holds the set (a lock guard or the
//! coordinator) gets an atomic reservation for free.

use super::PageState;
use crate::url::PageUrl;
use std::collections::HashMap;

/// Map of claimed URLs to their current state
#[derive(Debug, Default, Clone)]
pub struct VisitedSet {
    pages: HashMap<PageUrl, PageState>,
}

impl VisitedSet {
    /// Creates an empty visited-set
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves `url` for the caller
    ///
    /// Returns false if the URL was already claimed (pending or finished),
    /// in which case the caller must not fetch it.
    pub fn try_claim(&mut self, url: &PageUrl) -> bool {
        if self.pages.contains_key(url) {
            return false;
        }
        self.pages.insert(url.clone(), PageState::Claimed);
        true
    }

    /// Replaces the claim placeholder for `url` with a terminal state
    ///
    /// Entries are never removed: a failed URL keeps its `Failed` marker so
    /// no other branch can claim and refetch it.
    pub fn complete(&mut self, url: &PageUrl, state: PageState) {
        debug_assert!(state.is_terminal(), "complete() needs a terminal state");
        match self.pages.get_mut(url) {
            Some(current) => {
                if current.is_terminal() {
                    tracing::warn!("{} completed twice ({} -> {})", url, current, state);
                }
                *current = state;
            }
            None => {
                tracing::warn!("{} completed without a claim", url);
                self.pages.insert(url.clone(), state);
            }
        }
    }

    /// Returns true if `url` has been claimed
    pub fn contains(&self, url: &PageUrl) -> bool {
        self.pages.contains_key(url)
    }

    /// Returns the state of `url`, if it has been claimed
    pub fn state_of(&self, url: &PageUrl) -> Option<PageState> {
        self.pages.get(url).copied()
    }

    /// URLs that are claimed but whose fetch has not been recorded
    pub fn pending_claims(&self) -> Vec<PageUrl> {
        let mut pending: Vec<PageUrl> = self
            .pages
            .iter()
            .filter(|(_, state)| !state.is_terminal())
            .map(|(url, _)| url.clone())
            .collect();
        pending.sort();
        pending
    }

    /// Number of claimed URLs
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Returns true if nothing has been claimed yet
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}
