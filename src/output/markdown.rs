//! Markdown summary generation
//!
//! This module generates human-readable markdown summaries of one or more
//! crawls over the same link graph, including per-strategy statistics and a
//! per-URL outcome table.

use crate::output::{reports_agree, CrawlReport, OutputResult};
use crate::url::PageUrl;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Generates a markdown summary of crawl reports
///
/// # Arguments
///
/// * `reports` - One report per strategy that ran
/// * `start_url` - The URL every crawl started from
/// * `config_hash` - Fingerprint of the configuration the crawls used
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote markdown summary
/// * `Err(OutputError)` - Failed to write summary
pub fn generate_markdown_summary(
    reports: &[CrawlReport],
    start_url: &PageUrl,
    config_hash: &str,
    output_path: &Path,
) -> OutputResult<()> {
    let markdown = format_markdown_summary(reports, start_url, config_hash);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    tracing::info!("Wrote crawl summary to {}", output_path.display());
    Ok(())
}

/// Formats crawl reports as markdown
pub fn format_markdown_summary(
    reports: &[CrawlReport],
    start_url: &PageUrl,
    config_hash: &str,
) -> String {
    let mut md = String::new();

    md.push_str("# Linkwalk Crawl Summary\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Start URL**: {}\n", start_url));
    if let Some(first) = reports.iter().map(|r| r.started_at).min() {
        md.push_str(&format!("- **Started**: {}\n", first.to_rfc3339()));
    }
    md.push_str(&format!("- **Config Hash**: {}\n", config_hash));
    if reports.len() > 1 {
        let verdict = if reports_agree(reports) {
            "yes"
        } else {
            "**NO**"
        };
        md.push_str(&format!("- **Strategies Agree**: {}\n", verdict));
    }
    md.push('\n');

    // Per-strategy statistics
    md.push_str("## Strategy Statistics\n\n");
    md.push_str("| Strategy | Visited | Fetched | Failed | Fetch Calls | Duplicates | Elapsed |\n");
    md.push_str("|----------|---------|---------|--------|-------------|------------|---------|\n");
    for report in reports {
        let stats = &report.statistics;
        md.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} | {:?} |\n",
            report.strategy,
            stats.pages_visited,
            stats.pages_fetched,
            stats.pages_failed,
            stats.fetch_calls,
            stats.duplicate_fetches,
            report.elapsed
        ));
    }
    md.push('\n');

    // Per-URL outcomes, one column per strategy
    let urls: BTreeSet<PageUrl> = reports.iter().flat_map(|r| r.result.urls()).collect();
    if !urls.is_empty() {
        md.push_str("## Page Outcomes\n\n");
        md.push_str("| URL |");
        for report in reports {
            md.push_str(&format!(" {} |", report.strategy));
        }
        md.push_str("\n|-----|");
        for _ in reports {
            md.push_str("-----|");
        }
        md.push('\n');

        for url in &urls {
            md.push_str(&format!("| {} |", url));
            for report in reports {
                let cell = match report.result.get(url.as_str()) {
                    Some(record) if record.is_ok() => "ok",
                    Some(_) => "failed",
                    None => "-",
                };
                md.push_str(&format!(" {} |", cell));
            }
            md.push('\n');
        }
        md.push('\n');
    }

    md
}
