//! # scout-search
//!
//! A web search aggregator for conversational assistants.
//!
//! Queries several public search engines concurrently and merges what they
//! return into one ranked list:
//!
//! - Concurrent fan-out with per-engine failure isolation
//! - Ordered fallback chain with retry and linear backoff
//! - Normalization, deduplication and relevance scoring
//! - In-memory TTL cache shared with content enrichment
//! - Optional enrichment of top hits with page summaries, headings and dates
//! - Degraded output instead of errors when every source fails
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use scout_search::{Aggregator, AggregatorConfig, Cache};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = AggregatorConfig::default();
//!     let cache = Arc::new(Cache::from_config(&config.cache));
//!     let aggregator = Aggregator::with_default_engines(config, cache)?;
//!
//!     for result in aggregator.search("rust programming").await {
//!         println!("{}: {}", result.title, result.url);
//!     }
//!     Ok(())
//! }
//! ```

mod aggregator;
mod engine;
mod error;
mod query;
mod result;

pub mod cache;
pub mod config;
pub mod content;
pub mod dedup;
pub mod degraded;
pub mod engines;
pub mod enricher;
pub mod fallback;
pub mod fetcher;
pub mod fetcher_http;
pub mod http;
pub mod normalize;
pub mod scoring;

pub use aggregator::Aggregator;
pub use cache::{Cache, CacheStats, CacheValue, SharedCache};
pub use config::{AggregatorConfig, CacheConfig, EnrichmentConfig};
pub use engine::{Engine, EngineConfig};
pub use enricher::{Enricher, Enrichment};
pub use error::{Result, SearchError};
pub use fallback::{FallbackChain, RetryStrategy, SearchStrategy};
pub use query::{
    normalize_query, search_cache_key, validate_query, EnhancedSearchOptions, SafeSearch,
    SearchDepth, SearchQuery,
};
pub use result::{
    EnhancedResults, EnrichedResult, Heading, NormalizedResult, PageInsights, RawResult,
    ResultCategory,
};
pub use scoring::{Scorer, ScoringWeights};
