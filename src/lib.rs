//! Linkwalk: a link-graph traversal engine
//!
//! This crate visits every URL reachable from a start URL exactly once,
//! using one of three strategies that share a result shape:
//! a serial depth-first walk, a concurrent walk with a lock-guarded
//! visited set, and a concurrent walk where a single coordinator task owns
//! all crawl state and workers report back over a channel.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod url;

use std::time::Duration;
use thiserror::Error;

/// Main error type for Linkwalk operations
///
/// A crawl itself never fails; these errors come from the layers around it:
/// configuration, report output, caller-imposed timeouts, and comparing the
/// results of several strategies.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("{strategy} crawl did not finish within {after:?}")]
    Timeout {
        strategy: crawler::Strategy,
        after: Duration,
    },

    #[error("{other} crawl reached a different result than {first}")]
    Disagreement {
        first: crawler::Strategy,
        other: crawler::Strategy,
    },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Errors raised by a [`crawler::Fetcher`]
///
/// These never escape the visiting routine for the URL they belong to; the
/// engines turn them into failure records.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("not found: {0}")]
    NotFound(url::PageUrl),

    #[error("fetch of {url} aborted: {reason}")]
    Aborted { url: url::PageUrl, reason: String },
}

impl FetchError {
    /// The URL whose fetch failed
    pub fn url(&self) -> &url::PageUrl {
        match self {
            Self::NotFound(url) => url,
            Self::Aborted { url, .. } => url,
        }
    }
}

/// Result type alias for Linkwalk operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{
    crawl, crawl_concurrent_coordinated, crawl_concurrent_locked, crawl_serial,
    crawl_with_timeout, CannedFetcher, FetchResponse, Fetcher, Strategy,
};
pub use output::{CrawlRecord, CrawlResult};
pub use state::{PageState, VisitedSet};
pub use url::PageUrl;
