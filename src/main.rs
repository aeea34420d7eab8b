//! Linkwalk main entry point
//!
//! This is the command-line interface for the Linkwalk traversal engines.

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use linkwalk::config::{load_config_with_hash, Config, StrategySelection};
use linkwalk::crawler::{crawl, crawl_with_timeout, CannedFetcher};
use linkwalk::output::{ensure_agreement, generate_markdown_summary, print_statistics, CrawlReport};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Linkwalk: visit every page of a link graph exactly once
///
/// Linkwalk crawls the canned link graph described in a TOML file using a
/// serial, a lock-based concurrent, or a coordinator-based concurrent
/// strategy, and reports what each one reached.
#[derive(Parser, Debug)]
#[command(name = "linkwalk")]
#[command(version = "1.0.0")]
#[command(about = "Visit every page of a link graph exactly once", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Strategy to run, overriding the configuration
    #[arg(short, long, value_enum)]
    strategy: Option<StrategySelection>,

    /// Write a markdown summary here, overriding the configuration
    #[arg(long, value_name = "PATH")]
    summary: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show the link graph without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    run(&cli)
        .await
        .with_context(|| format!("linkwalk run over {} failed", cli.config.display()))
}

/// Loads the configuration, runs the selected strategies and reports
async fn run(cli: &Cli) -> linkwalk::Result<()> {
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    let selection = cli.strategy.unwrap_or(config.crawler.strategy);

    if cli.dry_run {
        handle_dry_run(&config, selection);
        return Ok(());
    }

    let reports = handle_crawl(&config, selection).await?;

    let summary_path = cli
        .summary
        .clone()
        .or_else(|| config.output.summary_path.as_ref().map(PathBuf::from));
    if let Some(path) = summary_path {
        generate_markdown_summary(&reports, &config.crawler.start_url, &config_hash, &path)?;
    }

    if reports.len() > 1 {
        ensure_agreement(&reports)?;
        println!("✓ All {} strategies produced the same result", reports.len());
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("linkwalk=info,warn"),
            1 => EnvFilter::new("linkwalk=debug,info"),
            2 => EnvFilter::new("linkwalk=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows what would be crawled
fn handle_dry_run(config: &Config, selection: StrategySelection) {
    println!("=== Linkwalk Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Start URL: {}", config.crawler.start_url);
    println!(
        "  Strategies: {}",
        selection
            .strategies()
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    match config.timeout() {
        Some(timeout) => println!("  Timeout: {:?}", timeout),
        None => println!("  Timeout: none"),
    }
    println!("  Fetch latency: {}ms", config.crawler.fetch_latency_ms);

    println!("\nPages ({}):", config.pages.len());
    for page in &config.pages {
        println!("  - {} ({} links)", page.url, page.links.len());
        for link in &page.links {
            println!("    * {}", link);
        }
    }

    println!("\n✓ Configuration is valid");
}

/// Runs each selected strategy against a fresh copy of the canned graph
async fn handle_crawl(
    config: &Config,
    selection: StrategySelection,
) -> linkwalk::Result<Vec<CrawlReport>> {
    let mut reports = Vec::new();

    for strategy in selection.strategies() {
        let fetcher = Arc::new(CannedFetcher::from_config(config));
        let start_url = config.crawler.start_url.clone();

        let started_at = Utc::now();
        let clock = Instant::now();
        let result = match config.timeout() {
            Some(limit) => crawl_with_timeout(strategy, start_url, fetcher.clone(), limit).await?,
            None => crawl(strategy, start_url, fetcher.clone()).await,
        };
        let elapsed = clock.elapsed();

        tracing::info!(
            "{} crawl completed: {} pages in {:?}",
            strategy,
            result.len(),
            elapsed
        );

        let report = CrawlReport::new(
            strategy,
            started_at,
            elapsed,
            result,
            fetcher.total_fetches(),
        );
        print_statistics(&report);
        reports.push(report);
    }

    Ok(reports)
}
