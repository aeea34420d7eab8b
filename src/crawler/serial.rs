//! Serial depth-first traversal
//!
//! One branch of control walks the link graph from an explicit stack of
//! URLs, so the depth of the graph never turns into call-stack depth. A URL
//! is claimed when it is popped, before it is fetched, which is what stops
//! cycles.

use crate::crawler::fetcher::fetch_guarded;
use crate::crawler::Fetcher;
use crate::output::{CrawlResult, ResultCollector};
use crate::state::{PageState, VisitedSet};
use crate::url::PageUrl;

/// Crawls every URL reachable from `start`, one fetch at a time
///
/// Children are visited in the order the fetcher lists them, each subtree
/// finishing before the next sibling starts. Children of a failed fetch are
/// unknown and therefore never visited.
pub async fn crawl_serial<F: Fetcher>(start: impl Into<PageUrl>, fetcher: &F) -> CrawlResult {
    let start = start.into();
    tracing::info!("Starting serial crawl from {}", start);

    let mut visited = VisitedSet::new();
    let mut collector = ResultCollector::new();
    let mut stack = vec![start];

    while let Some(url) = stack.pop() {
        if !visited.try_claim(&url) {
            tracing::trace!("Skipping {}: already visited", url);
            continue;
        }

        match fetch_guarded(fetcher, &url).await {
            Ok(response) => {
                tracing::debug!("Fetched {} ({} links)", url, response.links.len());
                visited.complete(&url, PageState::Fetched);
                collector.record_success(&url, response.body);

                // Reversed so the first link is popped first
                stack.extend(response.links.into_iter().rev());
            }
            Err(e) => {
                tracing::warn!("Fetch failed for {}: {}", url, e);
                visited.complete(&url, PageState::Failed);
                collector.record_failure(&url);
            }
        }
    }

    tracing::info!("Serial crawl finished: {} URLs", visited.len());
    collector.finish(&visited)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::{CannedFetcher, FetchResponse};
    use crate::FetchError;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_single_page() {
        let fetcher = CannedFetcher::new().with_page("A", "a", Vec::<&str>::new());
        let result = crawl_serial("A", &fetcher).await;

        assert_eq!(result.len(), 1);
        assert_eq!(result.get("A").unwrap().content.as_deref(), Some("a"));
    }

    #[tokio::test]
    async fn test_self_link() {
        let fetcher = CannedFetcher::new().with_page("A", "a", ["A"]);
        let result = crawl_serial("A", &fetcher).await;

        assert_eq!(result.len(), 1);
        assert_eq!(fetcher.total_fetches(), 1);
    }

    #[tokio::test]
    async fn test_start_url_missing() {
        let fetcher = CannedFetcher::new();
        let result = crawl_serial("A", &fetcher).await;

        assert_eq!(result.len(), 1);
        assert!(!result.get("A").unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_depth_first_fetch_order() {
        // A -> [B, D], B -> [C]; depth-first means C is fetched before D
        let fetcher = CannedFetcher::new()
            .with_page("A", "a", ["B", "D"])
            .with_page("B", "b", ["C"])
            .with_page("C", "c", ["A"])
            .with_page("D", "d", ["B"]);
        let result = crawl_serial("A", &fetcher).await;

        assert_eq!(result.len(), 4);
        assert!(result.iter().all(|r| r.is_ok()));
        assert_eq!(
            fetcher.fetch_order(),
            vec![
                PageUrl::from("A"),
                PageUrl::from("B"),
                PageUrl::from("C"),
                PageUrl::from("D")
            ]
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_long_chain() {
        let mut fetcher = CannedFetcher::new();
        for i in 0..20_000 {
            fetcher = fetcher.with_page(format!("p{}", i), "page", [format!("p{}", i + 1)]);
        }
        let fetcher = Arc::new(fetcher);

        // Run on a runtime worker, whose stack is smaller than the test thread's
        let task_fetcher = fetcher.clone();
        let result = tokio::spawn(async move { crawl_serial("p0", task_fetcher.as_ref()).await })
            .await
            .unwrap();

        // p20000 has no page and fails
        assert_eq!(result.len(), 20_001);
        assert_eq!(result.failures().count(), 1);
        assert!(!result.get("p20000").unwrap().is_ok());
        assert_eq!(fetcher.total_fetches(), 20_001);
    }

    struct PanicOnB;

    impl Fetcher for PanicOnB {
        async fn fetch(&self, url: &PageUrl) -> Result<FetchResponse, FetchError> {
            match url.as_str() {
                "A" => Ok(FetchResponse {
                    body: "a".to_string(),
                    links: vec![PageUrl::from("B"), PageUrl::from("C")],
                }),
                "B" => panic!("fetcher bug"),
                _ => Ok(FetchResponse {
                    body: url.to_string(),
                    links: vec![],
                }),
            }
        }
    }

    #[tokio::test]
    async fn test_panicking_fetch_is_contained() {
        let result = crawl_serial("A", &PanicOnB).await;

        assert_eq!(result.len(), 3);
        assert!(!result.get("B").unwrap().is_ok());
        assert_eq!(result.get("C").unwrap().content.as_deref(), Some("C"));
    }
}
