//! Integration tests for the crawler
//!
//! These tests drive all three strategies through the public API against
//! canned link graphs and check the properties every strategy must share.

use linkwalk::config::load_config;
use linkwalk::crawler::{crawl, crawl_with_timeout, CannedFetcher, FetchResponse, Fetcher, Strategy};
use linkwalk::output::CrawlResult;
use linkwalk::{CrawlError, FetchError, PageUrl};
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Fetcher that fails for selected URLs even though the graph knows them
struct FailingFetcher {
    inner: CannedFetcher,
    failing: HashSet<PageUrl>,
}

impl Fetcher for FailingFetcher {
    async fn fetch(&self, url: &PageUrl) -> Result<FetchResponse, FetchError> {
        if self.failing.contains(url) {
            return Err(FetchError::Aborted {
                url: url.clone(),
                reason: "connection reset".to_string(),
            });
        }
        self.inner.fetch(url).await
    }
}

/// Fetcher that panics on one URL and serves a fixed graph otherwise
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

/// A small deterministic pseudo-random link graph
struct GeneratedGraph {
    links: HashMap<String, Vec<String>>,
    delays: HashMap<String, u64>,
}

impl GeneratedGraph {
    /// Builds `nodes` pages `n0..n{nodes-1}`; some links point at the three
    /// missing pages just past the end
    fn new(nodes: usize, seed: u64) -> Self {
        let mut state = seed;
        let mut next = move || {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            state >> 33
        };

        let mut links = HashMap::new();
        let mut delays = HashMap::new();
        for i in 0..nodes {
            let degree = 1 + next() % 4;
            let targets = (0..degree)
                .map(|_| format!("n{}", next() % (nodes as u64 + 3)))
                .collect();
            links.insert(format!("n{}", i), targets);
            delays.insert(format!("n{}", i), next() % 3);
        }
        Self { links, delays }
    }

    fn fetcher(&self) -> CannedFetcher {
        let mut fetcher = CannedFetcher::new();
        for (url, targets) in &self.links {
            fetcher = fetcher
                .with_page(url.as_str(), url, targets.iter().map(String::as_str))
                .with_page_delay(url.as_str(), Duration::from_millis(self.delays[url]));
        }
        fetcher
    }

    /// URLs reachable from `start`, following links of existing pages only
    fn reachable(&self, start: &str) -> BTreeSet<PageUrl> {
        let mut seen = BTreeSet::new();
        let mut queue = VecDeque::from([start.to_string()]);
        while let Some(url) = queue.pop_front() {
            if !seen.insert(PageUrl::from(url.as_str())) {
                continue;
            }
            if let Some(targets) = self.links.get(&url) {
                queue.extend(targets.iter().cloned());
            }
        }
        seen
    }
}

fn create_abc_fetcher() -> CannedFetcher {
    CannedFetcher::new()
        .with_page("A", "a", ["B", "C"])
        .with_page("B", "b", ["A"])
}

/// Pages `p0..p{len-1}`, each linking to the next; `p{len}` is missing
fn create_chain_fetcher(len: usize) -> CannedFetcher {
    let mut fetcher = CannedFetcher::new();
    for i in 0..len {
        fetcher = fetcher.with_page(format!("p{}", i), "page", [format!("p{}", i + 1)]);
    }
    fetcher
}

fn url_set(result: &CrawlResult) -> BTreeSet<PageUrl> {
    result.urls().into_iter().collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_abc_scenario_every_strategy() {
    for strategy in Strategy::ALL {
        let fetcher = Arc::new(create_abc_fetcher());
        let result = crawl(strategy, "A", fetcher.clone()).await;

        let map = result.to_content_map();
        assert_eq!(map.len(), 3, "{}", strategy);
        assert_eq!(map[&PageUrl::from("A")], Some("a".to_string()), "{}", strategy);
        assert_eq!(map[&PageUrl::from("B")], Some("b".to_string()), "{}", strategy);
        assert_eq!(map[&PageUrl::from("C")], None, "{}", strategy);

        assert_eq!(fetcher.total_fetches(), 3, "{}", strategy);
        for url in ["A", "B", "C"] {
            assert_eq!(fetcher.fetch_count(&PageUrl::from(url)), 1, "{} {}", strategy, url);
        }
    }
}

#[tokio::test]
async fn test_cycle_terminates() {
    for strategy in Strategy::ALL {
        let fetcher = Arc::new(
            CannedFetcher::new()
                .with_page("A", "a", ["B"])
                .with_page("B", "b", ["A"]),
        );
        let result = crawl_with_timeout(strategy, "A", fetcher.clone(), Duration::from_secs(5))
            .await
            .expect("cyclic crawl must terminate");

        assert_eq!(result.len(), 2);
        assert!(result.iter().all(|r| r.is_ok()));
        assert_eq!(fetcher.total_fetches(), 2);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_failure_isolation() {
    // B would link to D, but its fetch fails so D is never discovered
    for strategy in Strategy::ALL {
        let fetcher = Arc::new(FailingFetcher {
            inner: CannedFetcher::new()
                .with_page("R", "r", ["A", "B"])
                .with_page("A", "a", ["E"])
                .with_page("B", "b", ["D"])
                .with_page("D", "d", Vec::<&str>::new())
                .with_page("E", "e", Vec::<&str>::new()),
            failing: HashSet::from([PageUrl::from("B")]),
        });
        let result = crawl(strategy, "R", fetcher.clone()).await;

        assert_eq!(result.get("A").unwrap().content.as_deref(), Some("a"), "{}", strategy);
        assert_eq!(result.get("E").unwrap().content.as_deref(), Some("e"), "{}", strategy);
        assert!(!result.get("B").unwrap().is_ok(), "{}", strategy);
        assert!(result.get("D").is_none(), "{}", strategy);
        assert_eq!(fetcher.inner.fetch_count(&PageUrl::from("D")), 0);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_no_duplicate_fetch_under_contention() {
    for seed in 0..10 {
        let graph = GeneratedGraph::new(40, seed);
        for strategy in [Strategy::Locked, Strategy::Coordinated] {
            let fetcher = Arc::new(graph.fetcher());
            let result = crawl(strategy, "n0", fetcher.clone()).await;

            assert!(
                fetcher.duplicate_fetches().is_empty(),
                "{} seed {} fetched twice: {:?}",
                strategy,
                seed,
                fetcher.duplicate_fetches()
            );
            assert_eq!(fetcher.total_fetches(), result.len());
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_completeness() {
    for seed in [7, 42, 1234] {
        let graph = GeneratedGraph::new(30, seed);
        let expected = graph.reachable("n0");

        for strategy in Strategy::ALL {
            let result = crawl(strategy, "n0", Arc::new(graph.fetcher())).await;
            assert_eq!(url_set(&result), expected, "{} seed {}", strategy, seed);
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_strategies_are_equivalent() {
    for seed in [3, 99] {
        let graph = GeneratedGraph::new(50, seed);

        let serial = crawl(Strategy::Serial, "n0", Arc::new(graph.fetcher())).await;
        let locked = crawl(Strategy::Locked, "n0", Arc::new(graph.fetcher())).await;
        let coordinated = crawl(Strategy::Coordinated, "n0", Arc::new(graph.fetcher())).await;

        assert!(serial.same_outcome(&locked), "seed {}", seed);
        assert!(serial.same_outcome(&coordinated), "seed {}", seed);
        assert_eq!(serial.to_content_map(), coordinated.to_content_map());
    }
}

#[tokio::test(start_paused = true)]
async fn test_timeout_is_the_only_crawl_error() {
    let fetcher = Arc::new(
        create_abc_fetcher()
            .with_latency(Duration::from_secs(1))
            .with_page_delay("B", Duration::from_secs(120)),
    );
    let err = crawl_with_timeout(Strategy::Locked, "A", fetcher, Duration::from_secs(10))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CrawlError::Timeout {
            strategy: Strategy::Locked,
            ..
        }
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_demo_fixture() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/golang-tour.toml");
    let config = load_config(&path).expect("demo fixture loads");

    let mut results = Vec::new();
    for strategy in config.crawler.strategy.strategies() {
        let fetcher = Arc::new(CannedFetcher::from_config(&config));
        let result = crawl(strategy, config.crawler.start_url.clone(), fetcher.clone()).await;

        assert_eq!(result.len(), 5, "{}", strategy);
        assert_eq!(result.successes().count(), 4, "{}", strategy);
        assert!(!result.get("https://golang.org/cmd/").unwrap().is_ok());
        assert_eq!(
            result.get("https://golang.org/pkg/fmt/").unwrap().content.as_deref(),
            Some("Package fmt")
        );
        assert_eq!(fetcher.total_fetches(), 5);
        results.push(result);
    }

    assert_eq!(results.len(), 3);
    assert!(results.windows(2).all(|pair| pair[0].same_outcome(&pair[1])));
}

#[tokio::test]
async fn test_panicking_fetcher_every_strategy() {
    for strategy in Strategy::ALL {
        let result = crawl(strategy, "A", Arc::new(PanicOnB)).await;

        assert_eq!(result.len(), 3, "{}", strategy);
        assert!(!result.get("B").unwrap().is_ok(), "{}", strategy);
        assert_eq!(result.get("C").unwrap().content.as_deref(), Some("C"), "{}", strategy);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_long_chain_every_strategy() {
    for strategy in Strategy::ALL {
        let fetcher = Arc::new(create_chain_fetcher(20_000));
        let result = tokio::spawn(crawl(strategy, "p0", fetcher.clone()))
            .await
            .unwrap();

        assert_eq!(result.len(), 20_001, "{}", strategy);
        assert_eq!(result.failures().count(), 1, "{}", strategy);
        assert!(!result.get("p20000").unwrap().is_ok(), "{}", strategy);
        assert_eq!(fetcher.total_fetches(), 20_001, "{}", strategy);
    }
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_fetches_overlap() {
    // Twenty sibling fetches of one second each: overlapping they take
    // about two seconds including the root, one at a time over twenty
    let children: Vec<String> = (0..20).map(|i| format!("c{}", i)).collect();

    for strategy in [Strategy::Locked, Strategy::Coordinated] {
        let mut fetcher = CannedFetcher::new()
            .with_latency(Duration::from_secs(1))
            .with_page("root", "root", children.iter().map(String::as_str));
        for child in &children {
            fetcher = fetcher.with_page(child.as_str(), child, Vec::<&str>::new());
        }

        let started = Instant::now();
        let result = crawl(strategy, "root", Arc::new(fetcher)).await;
        let elapsed = started.elapsed();

        assert_eq!(result.len(), 21, "{}", strategy);
        assert!(result.iter().all(|r| r.is_ok()), "{}", strategy);
        assert!(
            elapsed < Duration::from_secs(5),
            "{} fetched one page at a time: {:?}",
            strategy,
            elapsed
        );
    }
}
