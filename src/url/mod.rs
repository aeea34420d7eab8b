//! URL identity for crawled pages
//!
//! The engines never look inside a URL. Two URLs are the same page exactly
//! when their strings are equal; there is no parsing or normalization.

use serde::Deserialize;
use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// Opaque, cheaply cloneable URL token
///
/// Cloning shares the underlying string, which matters because every
/// spawned visit task carries its own copy.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(transparent)]
pub struct PageUrl(Arc<str>);

impl PageUrl {
    /// Creates a URL token from anything string-like
    pub fn new(url: impl AsRef<str>) -> Self {
        Self(Arc::from(url.as_ref()))
    }

    /// Returns the URL as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true for the empty URL, which config validation rejects
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for PageUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PageUrl {
    fn from(url: &str) -> Self {
        Self::new(url)
    }
}

impl From<String> for PageUrl {
    fn from(url: String) -> Self {
        Self(Arc::from(url))
    }
}

impl Borrow<str> for PageUrl {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for PageUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
