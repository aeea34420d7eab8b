/// Page state definitions for tracking crawl progress
///
/// This module defines every state a URL can be in once a traversal branch
/// has claimed it.
use std::fmt;

/// Represents the current state of a claimed URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageState {
    // ===== Active States =====
    /// URL is reserved by a traversal branch and its fetch has not finished
    Claimed,

    // ===== Terminal States =====
    /// URL was fetched successfully
    Fetched,

    /// URL fetch failed; the marker is permanent so the URL is never refetched
    Failed,
}

impl PageState {
    /// Returns true if this is a terminal state (no further processing needed)
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Claimed)
    }

    /// Converts the page state to its short string name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Claimed => "claimed",
            Self::Fetched => "fetched",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
