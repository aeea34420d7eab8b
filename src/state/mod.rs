//! State module for tracking crawl progress
//!
//! This module provides the per-URL state used by every traversal engine.
//!
//! # Components
//!
//! - `PageState`: Tracks whether a URL is claimed, fetched, or failed
//! - `VisitedSet`: Maps claimed URLs to their state and enforces claim-once

mod page_state;
mod visited;

// Re-export main types
pub use page_state::PageState;
pub use visited::VisitedSet;
