//! Configuration module for Linkwalk
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files. A configuration names the start URL and strategy and carries the
//! canned link graph the crawl runs against.
//!
//! # Example
//!
//! ```no_run
//! use linkwalk::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("demos/golang-tour.toml")).unwrap();
//! println!("Crawl will start from: {}", config.crawler.start_url);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, OutputConfig, PageEntry, StrategySelection};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
