//! Integration tests.
//!
//! The `pipeline` tests drive the aggregator end to end with in-process mock
//! engines. The engine tests further down make real HTTP requests and are
//! marked with `#[ignore]` because they need network access and may be slow
//! or flaky.
//!
//! Run the live tests with: `cargo test --test integration -- --ignored`

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use scout_search::fetcher::PageFetcher;
use scout_search::{
    search_cache_key, Aggregator, AggregatorConfig, Cache, Engine, EngineConfig,
    EnhancedSearchOptions, Enricher, FallbackChain, RawResult, Result, RetryStrategy,
    SearchDepth, SearchError, SearchQuery, SharedCache,
};

struct MockEngine {
    config: EngineConfig,
    results: Vec<RawResult>,
    calls: AtomicUsize,
}

impl MockEngine {
    fn new(name: &str, results: Vec<RawResult>) -> Arc<Self> {
        Arc::new(Self {
            config: EngineConfig {
                request_delay_ms: (0, 0),
                ..EngineConfig::new(name, name)
            },
            results,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Engine for MockEngine {
    fn config(&self) -> &EngineConfig {
        &self.config
    }

    async fn search(&self, _query: &SearchQuery) -> Result<Vec<RawResult>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.results.clone())
    }
}

/// Fails on every call.
struct DownEngine {
    config: EngineConfig,
    calls: AtomicUsize,
}

impl DownEngine {
    fn new(name: &str) -> Arc<Self> {
        Arc::new(Self {
            config: EngineConfig {
                request_delay_ms: (0, 0),
                ..EngineConfig::new(name, name)
            },
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl Engine for DownEngine {
    fn config(&self) -> &EngineConfig {
        &self.config
    }

    async fn search(&self, _query: &SearchQuery) -> Result<Vec<RawResult>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(SearchError::Other("503 Service Unavailable".to_string()))
    }
}

struct ArticleFetcher;

#[async_trait]
impl PageFetcher for ArticleFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        if url.contains("paywall") {
            return Err(SearchError::Other("403 Forbidden".to_string()));
        }
        Ok(format!(
            r#"<html lang="en"><head><title>Article</title></head><body><article>
                <h1>Artificial intelligence</h1>
                <p>Artificial intelligence is the capability of computational systems to perform tasks associated with human intelligence ({}).</p>
                <p>Updated 2024-06-01.</p>
            </article></body></html>"#,
            url
        ))
    }
}

fn shared_cache() -> SharedCache {
    Arc::new(Cache::new(Duration::from_secs(3600), Duration::from_secs(720)))
}

fn aggregator_with(engines: &[Arc<dyn Engine>]) -> Aggregator {
    let mut aggregator = Aggregator::new(AggregatorConfig::default(), shared_cache());
    for engine in engines {
        aggregator.add_shared_engine(Arc::clone(engine));
    }
    aggregator
}

mod pipeline {
    use super::*;

    #[tokio::test]
    async fn test_wikipedia_example_scores_one() {
        let wiki = MockEngine::new(
            "A",
            vec![RawResult::new(
                "https://en.wikipedia.org/wiki/AI",
                "AI - Wikipedia",
                "Artificial intelligence overview",
            )],
        );
        let aggregator = aggregator_with(&[
            wiki,
            MockEngine::new("B", Vec::new()),
            MockEngine::new("C", Vec::new()),
        ]);

        let results = aggregator.search("artificial intelligence").await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].relevance_score, 1.0);
        assert_eq!(results[0].source_domain, "en.wikipedia.org");
    }

    #[tokio::test]
    async fn test_second_search_is_pure_cache_hit() {
        let a = MockEngine::new("A", vec![RawResult::new("https://a.com/1", "Entropy", "")]);
        let b = MockEngine::new("B", vec![RawResult::new("https://b.com/2", "Entropy too", "")]);
        let aggregator = aggregator_with(&[a.clone(), b.clone()]);

        let first = aggregator.search("  Define  Entropy  ").await;
        let second = aggregator.search("define  entropy").await;

        assert_eq!(first, second);
        assert_eq!(a.calls(), 1);
        assert_eq!(b.calls(), 1);
        assert!(aggregator
            .cache()
            .contains(&search_cache_key("  Define  Entropy  ")));
        assert_eq!(search_cache_key("  Define  Entropy  "), "search:define  entropy");
    }

    #[tokio::test]
    async fn test_different_spacing_is_a_different_key() {
        let a = MockEngine::new("A", vec![RawResult::new("https://a.com/1", "Entropy", "")]);
        let aggregator = aggregator_with(&[a.clone()]);

        aggregator.search("define entropy").await;
        aggregator.search("define  entropy").await;
        assert_eq!(a.calls(), 2);
    }

    #[tokio::test]
    async fn test_all_sources_empty_degrades_without_caching() {
        let primary = MockEngine::new("A", Vec::new());
        let down = DownEngine::new("B");
        let mut aggregator = aggregator_with(&[primary.clone(), down.clone()]);
        aggregator.set_fallback_chain(
            FallbackChain::new()
                .then(RetryStrategy::new(primary.clone(), 3, Duration::ZERO))
                .then(RetryStrategy::once(down.clone())),
        );

        let results = aggregator.search("quantum gravity").await;

        assert_eq!(results.len(), 4);
        let live_tags = ["A", "B"];
        assert!(results.iter().all(|r| !live_tags.contains(&r.source.as_str())));
        assert!(!aggregator.cache().contains(&search_cache_key("quantum gravity")));
        // one fan-out call plus three fallback attempts
        assert_eq!(primary.calls(), 4);
        assert_eq!(down.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fallback_retries_then_escalates() {
        let first = MockEngine::new("First", Vec::new());
        let second = MockEngine::new("Second", Vec::new());
        let third = MockEngine::new(
            "Third",
            vec![RawResult::new("https://third.com/", "Third result", "")],
        );

        let mut aggregator = aggregator_with(&[]);
        aggregator.set_fallback_chain(
            FallbackChain::new()
                .then(RetryStrategy::new(first.clone(), 3, Duration::from_millis(500)))
                .then(RetryStrategy::once(second.clone()))
                .then(RetryStrategy::once(third.clone())),
        );

        let start = tokio::time::Instant::now();
        let results = aggregator.search("anything").await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].source, "Third");
        assert_eq!(first.calls(), 3);
        assert_eq!(second.calls(), 1);
        assert_eq!(third.calls(), 1);
        // 500ms after the first failure, 1000ms after the second
        assert!(start.elapsed() >= Duration::from_millis(1500));
    }

    #[tokio::test]
    async fn test_scores_bounded_and_sorted() {
        let engine = MockEngine::new(
            "A",
            (0..30)
                .map(|i| {
                    RawResult::new(
                        format!("https://site{}.org/rust", i),
                        if i % 3 == 0 { "Rust language" } else { "Other" },
                        "about rust",
                    )
                })
                .collect(),
        );
        let aggregator = aggregator_with(&[engine]);

        let results = aggregator.search("rust language").await;
        assert_eq!(results.len(), 20);
        assert!(results
            .iter()
            .all(|r| (0.0..=1.0).contains(&r.relevance_score)));
        assert!(results
            .windows(2)
            .all(|w| w[0].relevance_score >= w[1].relevance_score));
    }

    #[tokio::test]
    async fn test_enhanced_search_drops_failed_items() {
        let engine = MockEngine::new(
            "A",
            vec![
                RawResult::new("https://open.com/ai", "AI", ""),
                RawResult::new("https://paywall.com/ai", "AI paywalled", ""),
            ],
        );
        let mut aggregator = aggregator_with(&[engine]);
        aggregator.set_enricher(Enricher::new(
            Arc::new(ArticleFetcher),
            aggregator.cache().clone(),
            Default::default(),
        ));

        let enhanced = aggregator
            .enhanced_search(
                "artificial intelligence",
                EnhancedSearchOptions {
                    depth: SearchDepth::Deep,
                    ..Default::default()
                },
            )
            .await;

        assert_eq!(enhanced.results.len(), 2);
        assert!(enhanced.error.is_none());
        assert_eq!(enhanced.enriched_results.len(), 1);

        let enriched = &enhanced.enriched_results[0];
        assert_eq!(enriched.result.url, "https://open.com/ai");
        assert!(enriched.insights.summary.is_some());
        assert_eq!(enriched.insights.extracted_dates, vec!["2024-06-01"]);
        assert_eq!(enriched.insights.headings.len(), 1);
        assert!(aggregator.cache().contains("content:https://open.com/ai"));
        assert!(!aggregator.cache().contains("content:https://paywall.com/ai"));
    }

    #[test]
    fn test_validate_query_at_the_boundary() {
        tokio_test::assert_ok!(scout_search::validate_query("rust"));
        tokio_test::assert_err!(scout_search::validate_query("   "));
    }

    #[test]
    fn test_config_file_round_trip() {
        let path = std::env::temp_dir().join("scout-search-integration-config.json");
        std::fs::write(&path, r#"{"max_results": 7, "cache": {"search_ttl_secs": 60}}"#)
            .unwrap();

        let config = tokio_test::assert_ok!(AggregatorConfig::from_file(&path));
        assert_eq!(config.max_results, 7);
        assert_eq!(config.cache.search_ttl_secs, 60);
        assert_eq!(config.fallback_attempts, 3);

        let _ = std::fs::remove_file(&path);
    }
}

/// Helper to run an engine test
async fn test_engine<E: Engine>(engine: E, query: &str) -> Vec<RawResult> {
    let query = SearchQuery::new(query);
    match engine.search(&query).await {
        Ok(results) => {
            println!(
                "Engine '{}' returned {} results for '{}'",
                engine.name(),
                results.len(),
                query.query
            );
            for (i, result) in results.iter().take(3).enumerate() {
                println!("  {}. {} - {}", i + 1, result.title, result.url);
            }
            results
        }
        Err(e) => {
            println!("Engine '{}' failed: {}", engine.name(), e);
            vec![]
        }
    }
}

mod duckduckgo_tests {
    use super::*;
    use scout_search::engines::DuckDuckGo;

    #[tokio::test]
    #[ignore]
    async fn test_duckduckgo_search() {
        let results = test_engine(DuckDuckGo::new(), "rust programming").await;
        assert!(!results.is_empty(), "DuckDuckGo should return results");
    }
}

mod bing_tests {
    use super::*;
    use scout_search::engines::Bing;

    #[tokio::test]
    #[ignore]
    async fn test_bing_search() {
        let results = test_engine(Bing::new(), "rust programming").await;
        println!("Bing returned {} results", results.len());
    }
}

mod brave_tests {
    use super::*;
    use scout_search::engines::Brave;

    #[tokio::test]
    #[ignore]
    async fn test_brave_search() {
        let results = test_engine(Brave::new(), "rust programming").await;
        println!("Brave returned {} results", results.len());
    }
}

mod wikipedia_tests {
    use super::*;
    use scout_search::engines::Wikipedia;

    #[tokio::test]
    #[ignore]
    async fn test_wikipedia_search() {
        let results = test_engine(Wikipedia::new(), "rust programming language").await;
        assert!(!results.is_empty(), "Wikipedia should return results");
    }

    #[tokio::test]
    #[ignore]
    async fn test_wikipedia_german() {
        let results = test_engine(Wikipedia::new().with_language("de"), "Entropie").await;
        assert!(results.iter().all(|r| r.url.starts_with("https://de.wikipedia.org/")));
    }
}

mod live_aggregator_tests {
    use super::*;

    #[tokio::test]
    #[ignore]
    async fn test_default_aggregator_search() {
        let config = AggregatorConfig::default();
        let cache = Arc::new(Cache::from_config(&config.cache));
        let aggregator = Aggregator::with_default_engines(config, cache).unwrap();

        let results = aggregator.search("rust programming language").await;
        assert!(!results.is_empty());
        assert!(results.len() <= 20);
    }
}
