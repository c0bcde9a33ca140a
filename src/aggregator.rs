//! Search orchestration: fan-out, fallback, ranking, caching and enrichment.

use std::sync::Arc;

use futures::future::join_all;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::cache::{CacheValue, SharedCache};
use crate::config::{AggregatorConfig, MAX_RESULTS};
use crate::dedup::deduplicate;
use crate::degraded::{degraded_results, EMERGENCY_SOURCE, NOTICE_SOURCE};
use crate::enricher::Enricher;
use crate::engines::{Bing, Brave, DuckDuckGo, Wikipedia};
use crate::fallback::{FallbackChain, RetryStrategy};
use crate::fetcher_http::HttpFetcher;
use crate::normalize::normalize;
use crate::query::EnhancedSearchOptions;
use crate::scoring::Scorer;
use crate::{
    EnhancedResults, EnrichedResult, Engine, EngineConfig, NormalizedResult, RawResult, Result,
    SearchQuery,
};

/// Meta search aggregator.
///
/// Queries every enabled engine concurrently, escalates through the
/// fallback chain when they all come back empty, then normalizes,
/// deduplicates, scores and caches the results. Upstream failures never
/// surface as errors: the worst case is the degraded result set.
pub struct Aggregator {
    engines: Vec<Arc<dyn Engine>>,
    fallback: FallbackChain,
    enricher: Option<Arc<Enricher>>,
    scorer: Scorer,
    cache: SharedCache,
    config: AggregatorConfig,
}

impl Aggregator {
    /// Creates an aggregator with no engines, an empty fallback chain and no
    /// enricher.
    pub fn new(config: AggregatorConfig, cache: SharedCache) -> Self {
        Self {
            engines: Vec::new(),
            fallback: FallbackChain::new(),
            enricher: None,
            scorer: Scorer::new(config.scoring.clone()),
            cache,
            config,
        }
    }

    /// Creates an aggregator wired with the built-in engines, the default
    /// fallback chain (DuckDuckGo with retries, then Bing, then Brave) and an
    /// HTTP enricher.
    pub fn with_default_engines(config: AggregatorConfig, cache: SharedCache) -> Result<Self> {
        let engine_config = |name: &str, shortcut: &str| EngineConfig {
            timeout: config.adapter_timeout_secs,
            request_delay_ms: config.request_delay_ms,
            ..EngineConfig::new(name, shortcut)
        };

        let duckduckgo: Arc<dyn Engine> =
            Arc::new(DuckDuckGo::with_config(engine_config("DuckDuckGo", "ddg")));
        let bing: Arc<dyn Engine> = Arc::new(Bing::with_config(engine_config("Bing", "bing")));
        let brave: Arc<dyn Engine> = Arc::new(Brave::with_config(engine_config("Brave", "brave")));
        let wikipedia: Arc<dyn Engine> =
            Arc::new(Wikipedia::with_config(engine_config("Wikipedia", "wiki")));

        let fallback = FallbackChain::new()
            .then(RetryStrategy::new(
                Arc::clone(&duckduckgo),
                config.fallback_attempts,
                config.retry_base_delay(),
            ))
            .then(RetryStrategy::once(Arc::clone(&bing)))
            .then(RetryStrategy::once(Arc::clone(&brave)));

        let fetcher = HttpFetcher::new(&config.enrichment)?;
        let enricher = Enricher::new(Arc::new(fetcher), Arc::clone(&cache), config.enrichment.clone())
            .with_content_ttl(config.cache.content_ttl());

        let mut aggregator = Self::new(config, cache);
        for engine in [duckduckgo, bing, brave, wikipedia] {
            aggregator.add_shared_engine(engine);
        }
        aggregator.set_fallback_chain(fallback);
        aggregator.set_enricher(enricher);
        Ok(aggregator)
    }

    /// Adds a search engine to the fan-out.
    pub fn add_engine<E: Engine + 'static>(&mut self, engine: E) {
        self.engines.push(Arc::new(engine));
    }

    /// Adds an engine that is shared with other owners, e.g. a fallback strategy.
    pub fn add_shared_engine(&mut self, engine: Arc<dyn Engine>) {
        self.engines.push(engine);
    }

    /// Replaces the fallback chain.
    pub fn set_fallback_chain(&mut self, chain: FallbackChain) {
        self.fallback = chain;
    }

    /// Sets the enricher used by [`Aggregator::enhanced_search`].
    pub fn set_enricher(&mut self, enricher: Enricher) {
        self.enricher = Some(Arc::new(enricher));
    }

    /// Returns the number of configured engines.
    pub fn engine_count(&self) -> usize {
        self.engines.len()
    }

    /// Returns the configured engines in fan-out order.
    pub fn engines(&self) -> &[Arc<dyn Engine>] {
        &self.engines
    }

    pub fn fallback_chain(&self) -> &FallbackChain {
        &self.fallback
    }

    pub fn cache(&self) -> &SharedCache {
        &self.cache
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// Searches with default language and safe search settings.
    pub async fn search(&self, query: &str) -> Vec<NormalizedResult> {
        self.search_with(&SearchQuery::new(query.trim())).await
    }

    /// Searches for `query`, returning at most `max_results` (never more than
    /// [`MAX_RESULTS`]) results ordered by relevance.
    ///
    /// A cached list is returned verbatim. Otherwise the enabled engines are
    /// queried concurrently, then the fallback chain if they all came back
    /// empty. If nothing at all is found the degraded result set is returned,
    /// and it is not cached.
    pub async fn search_with(&self, query: &SearchQuery) -> Vec<NormalizedResult> {
        let key = query.cache_key();

        if let Some(cached) = self.cache.get(&key) {
            if let CacheValue::Results(results) = cached.as_ref() {
                debug!("Cache hit for {}", key);
                return results.clone();
            }
        }

        let mut raw = self.fan_out(query).await;
        if raw.is_empty() && !self.fallback.is_empty() {
            debug!("Fan-out returned nothing, escalating to fallback chain");
            raw = self.fallback.run(query).await;
        }

        let results = self.rank(raw, &query.query);
        if results.is_empty() {
            info!(
                "All sources exhausted for {:?}, returning degraded output",
                query.query
            );
            return degraded_results(&query.query);
        }

        self.cache.set(
            key,
            CacheValue::Results(results.clone()),
            self.config.cache.search_ttl(),
        );
        results
    }

    /// Calls every enabled engine concurrently. Results are concatenated in
    /// engine order, which decides which duplicate survives deduplication.
    async fn fan_out(&self, query: &SearchQuery) -> Vec<RawResult> {
        let engines: Vec<_> = self.engines.iter().filter(|e| e.is_enabled()).collect();
        debug!("Searching {} engines", engines.len());

        let futures = engines.iter().map(|engine| engine.fetch(query));
        join_all(futures).await.into_iter().flatten().collect()
    }

    /// normalize, deduplicate, score, truncate
    fn rank(&self, raw: Vec<RawResult>, query: &str) -> Vec<NormalizedResult> {
        let normalized = normalize(raw);
        let unique = deduplicate(normalized);
        let mut scored = self.scorer.score(unique, query);
        scored.truncate(self.config.max_results.min(MAX_RESULTS));
        scored
    }

    /// Runs [`Aggregator::search`] and enriches the top results with page
    /// content.
    ///
    /// Items whose enrichment fails are left out of `enriched_results`. If
    /// no enricher is configured or the batch exceeds its timeout, the plain
    /// results come back with `error` set. Degraded output is not enriched.
    pub async fn enhanced_search(
        &self,
        query: &str,
        options: EnhancedSearchOptions,
    ) -> EnhancedResults {
        let results = self.search(query).await;

        if !options.fetch_content || results.is_empty() || is_degraded(&results) {
            return EnhancedResults {
                results,
                ..Default::default()
            };
        }

        let Some(enricher) = self.enricher.as_ref() else {
            return EnhancedResults::degraded(results, "content enrichment is not configured");
        };

        let targets = &results[..options.max_content_results.min(results.len())];
        let tasks = targets.iter().map(|result| async move {
            enricher
                .enrich(&result.url, query, options.depth)
                .await
                .into_insights()
                .map(|insights| EnrichedResult {
                    result: result.clone(),
                    insights,
                })
        });

        let batch_timeout = self.config.enrichment.batch_timeout();
        match timeout(batch_timeout, join_all(tasks)).await {
            Ok(enriched) => {
                let enriched_results: Vec<_> = enriched.into_iter().flatten().collect();
                debug!(
                    "Enriched {}/{} results",
                    enriched_results.len(),
                    targets.len()
                );
                EnhancedResults {
                    results,
                    enriched_results,
                    error: None,
                }
            }
            Err(_) => {
                warn!("Enrichment timed out after {:?}", batch_timeout);
                EnhancedResults::degraded(
                    results,
                    format!("content enrichment timed out after {:?}", batch_timeout),
                )
            }
        }
    }
}

fn is_degraded(results: &[NormalizedResult]) -> bool {
    results
        .iter()
        .all(|r| r.source == NOTICE_SOURCE || r.source == EMERGENCY_SOURCE)
}
