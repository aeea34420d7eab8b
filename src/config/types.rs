use crate::crawler::Strategy;
use crate::url::PageUrl;
use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Linkwalk
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub output: OutputConfig,
    /// The canned link graph served to the crawler
    #[serde(default, rename = "page")]
    pub pages: Vec<PageEntry>,
}

impl Config {
    /// The caller-imposed crawl timeout, if any
    pub fn timeout(&self) -> Option<Duration> {
        self.crawler.timeout_secs.map(Duration::from_secs)
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// URL the crawl starts from
    #[serde(rename = "start-url")]
    pub start_url: PageUrl,

    /// Which strategy (or all of them) to run
    #[serde(default)]
    pub strategy: StrategySelection,

    /// Abandon a crawl that runs longer than this many seconds
    #[serde(rename = "timeout-secs", default)]
    pub timeout_secs: Option<u64>,

    /// Simulated latency of every fetch (milliseconds)
    #[serde(rename = "fetch-latency-ms", default)]
    pub fetch_latency_ms: u64,
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// Path to the markdown summary file; no summary is written if unset
    #[serde(rename = "summary-path", default)]
    pub summary_path: Option<String>,
}

/// One page of the canned link graph
#[derive(Debug, Clone, Deserialize)]
pub struct PageEntry {
    pub url: PageUrl,

    #[serde(default)]
    pub body: String,

    /// Outgoing links, in page order
    #[serde(default)]
    pub links: Vec<PageUrl>,

    /// Per-page latency overriding `fetch-latency-ms`
    #[serde(rename = "delay-ms", default)]
    pub delay_ms: Option<u64>,
}

/// Strategy choice in the config file or on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StrategySelection {
    /// Serial depth-first recursion
    Serial,
    /// Concurrent tasks sharing a locked visited-set
    Locked,
    /// Concurrent workers reporting to a single coordinator
    Coordinated,
    /// Run every strategy and compare their results
    #[default]
    All,
}

impl StrategySelection {
    /// The strategies this selection runs, in order
    pub fn strategies(&self) -> Vec<Strategy> {
        match self {
            Self::Serial => vec![Strategy::Serial],
            Self::Locked => vec![Strategy::Locked],
            Self::Coordinated => vec![Strategy::Coordinated],
            Self::All => Strategy::ALL.to_vec(),
        }
    }
}
