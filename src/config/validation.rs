use crate::config::types::{Config, CrawlerConfig, PageEntry};
use crate::{ConfigError, ConfigResult};
use std::collections::HashSet;

/// Longest accepted crawl timeout (seconds)
const MAX_TIMEOUT_SECS: u64 = 3600;

/// Longest accepted simulated fetch latency (milliseconds)
const MAX_LATENCY_MS: u64 = 10_000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_crawler_config(&config.crawler)?;
    validate_pages(&config.pages)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> ConfigResult<()> {
    if config.start_url.is_empty() {
        return Err(ConfigError::Validation(
            "start_url cannot be empty".to_string(),
        ));
    }

    if let Some(timeout) = config.timeout_secs {
        if !(1..=MAX_TIMEOUT_SECS).contains(&timeout) {
            return Err(ConfigError::Validation(format!(
                "timeout_secs must be between 1 and {}, got {}",
                MAX_TIMEOUT_SECS, timeout
            )));
        }
    }

    validate_latency("fetch_latency_ms", config.fetch_latency_ms)?;

    Ok(())
}

/// Validates the canned pages
fn validate_pages(pages: &[PageEntry]) -> ConfigResult<()> {
    let mut seen = HashSet::new();

    for page in pages {
        if page.url.is_empty() {
            return Err(ConfigError::Validation(
                "Page url cannot be empty".to_string(),
            ));
        }

        if !seen.insert(&page.url) {
            return Err(ConfigError::Validation(format!(
                "Page '{}' is defined more than once",
                page.url
            )));
        }

        if page.links.iter().any(|link| link.is_empty()) {
            return Err(ConfigError::Validation(format!(
                "Page '{}' has an empty link",
                page.url
            )));
        }

        if let Some(delay) = page.delay_ms {
            validate_latency(&format!("delay_ms of '{}'", page.url), delay)?;
        }
    }

    Ok(())
}

fn validate_latency(name: &str, millis: u64) -> ConfigResult<()> {
    if millis > MAX_LATENCY_MS {
        return Err(ConfigError::Validation(format!(
            "{} must be <= {}ms, got {}ms",
            name, MAX_LATENCY_MS, millis
        )));
    }
    Ok(())
}
