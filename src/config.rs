//! Aggregator configuration with sensible defaults.
//!
//! Every field has a default, so a JSON file only needs to name the
//! values it overrides:
//!
//! ```json
//! { "max_results": 10, "cache": { "search_ttl_secs": 600 } }
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::scoring::ScoringWeights;
use crate::{Result, SearchError};

/// Upper bound on the number of results a search returns.
pub const MAX_RESULTS: usize = 20;

/// Top-level configuration for [`crate::Aggregator`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatorConfig {
    /// Maximum number of results returned by a search, at most [`MAX_RESULTS`].
    pub max_results: usize,
    /// Per-adapter request timeout in seconds.
    pub adapter_timeout_secs: u64,
    /// Random pre-request delay range `(min, max)` in milliseconds.
    pub request_delay_ms: (u64, u64),
    /// Attempts given to the first adapter of the fallback chain.
    pub fallback_attempts: u32,
    /// Base delay of the linear retry backoff in milliseconds.
    pub retry_base_delay_ms: u64,
    /// Cache lifetimes.
    pub cache: CacheConfig,
    /// Content enrichment limits.
    pub enrichment: EnrichmentConfig,
    /// Relevance boost constants.
    pub scoring: ScoringWeights,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            max_results: MAX_RESULTS,
            adapter_timeout_secs: 10,
            request_delay_ms: (1000, 3000),
            fallback_attempts: 3,
            retry_base_delay_ms: 1000,
            cache: CacheConfig::default(),
            enrichment: EnrichmentConfig::default(),
            scoring: ScoringWeights::default(),
        }
    }
}

impl AggregatorConfig {
    /// Loads and validates a configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Parses and validates a configuration from a JSON string.
    pub fn from_json(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every field holds a usable value.
    pub fn validate(&self) -> Result<()> {
        if self.max_results == 0 {
            return Err(SearchError::Config(
                "max_results must be greater than 0".into(),
            ));
        }
        if self.max_results > MAX_RESULTS {
            return Err(SearchError::Config(format!(
                "max_results must be at most {}",
                MAX_RESULTS
            )));
        }
        if self.adapter_timeout_secs == 0 {
            return Err(SearchError::Config(
                "adapter_timeout_secs must be greater than 0".into(),
            ));
        }
        if self.request_delay_ms.0 > self.request_delay_ms.1 {
            return Err(SearchError::Config(
                "request_delay_ms min must be <= max".into(),
            ));
        }
        if self.fallback_attempts == 0 {
            return Err(SearchError::Config(
                "fallback_attempts must be at least 1".into(),
            ));
        }
        if self.enrichment.max_content_chars == 0 {
            return Err(SearchError::Config(
                "enrichment.max_content_chars must be greater than 0".into(),
            ));
        }
        if self.enrichment.batch_timeout_secs == 0 {
            return Err(SearchError::Config(
                "enrichment.batch_timeout_secs must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// Per-adapter request timeout.
    pub fn adapter_timeout(&self) -> Duration {
        Duration::from_secs(self.adapter_timeout_secs)
    }

    /// Base delay of the fallback retry backoff.
    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }
}

/// Cache lifetimes, in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// TTL of `search:` entries. Zero disables search caching.
    pub search_ttl_secs: u64,
    /// TTL of `content:` entries. Zero disables content caching.
    pub content_ttl_secs: u64,
    /// Background sweep period. Defaults to a fifth of the search TTL.
    pub check_period_secs: Option<u64>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            search_ttl_secs: 3600,
            content_ttl_secs: 3600,
            check_period_secs: None,
        }
    }
}

impl CacheConfig {
    pub fn search_ttl(&self) -> Duration {
        Duration::from_secs(self.search_ttl_secs)
    }

    pub fn content_ttl(&self) -> Duration {
        Duration::from_secs(self.content_ttl_secs)
    }

    /// Sweep period: explicit value, or `0.2 × search_ttl`, never below one second.
    pub fn check_period(&self) -> Duration {
        let secs = self
            .check_period_secs
            .unwrap_or(self.search_ttl_secs / 5)
            .max(1);
        Duration::from_secs(secs)
    }
}

/// Limits applied while enriching results with page content.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichmentConfig {
    /// Extracted text is truncated to this many characters before processing.
    pub max_content_chars: usize,
    /// Paragraphs must be longer than this to feed the summary.
    pub min_paragraph_chars: usize,
    /// Upper bound on the whole enrichment batch in seconds.
    pub batch_timeout_secs: u64,
    /// Per-page fetch timeout in seconds.
    pub fetch_timeout_secs: u64,
    /// Fixed User-Agent for page fetches. Rotates when `None`.
    pub user_agent: Option<String>,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            max_content_chars: 10_000,
            min_paragraph_chars: 100,
            batch_timeout_secs: 30,
            fetch_timeout_secs: 10,
            user_agent: None,
        }
    }
}

impl EnrichmentConfig {
    pub fn batch_timeout(&self) -> Duration {
        Duration::from_secs(self.batch_timeout_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = AggregatorConfig::default();
        assert_eq!(config.max_results, 20);
        assert_eq!(config.adapter_timeout_secs, 10);
        assert_eq!(config.request_delay_ms, (1000, 3000));
        assert_eq!(config.fallback_attempts, 3);
        assert_eq!(config.retry_base_delay(), Duration::from_secs(1));
        assert_eq!(config.enrichment.max_content_chars, 10_000);
        assert_eq!(config.enrichment.min_paragraph_chars, 100);
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(AggregatorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_max_results_rejected() {
        let config = AggregatorConfig {
            max_results: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_results"));
    }

    #[test]
    fn test_max_results_above_cap_rejected() {
        let result = AggregatorConfig::from_json(r#"{"max_results": 35}"#);
        assert!(matches!(result, Err(SearchError::Config(_))));

        let config = AggregatorConfig {
            max_results: MAX_RESULTS,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_inverted_delay_range_rejected() {
        let config = AggregatorConfig {
            request_delay_ms: (500, 100),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("request_delay_ms"));
    }

    #[test]
    fn test_zero_fallback_attempts_rejected() {
        let config = AggregatorConfig {
            fallback_attempts: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_delay_range_valid() {
        let config = AggregatorConfig {
            request_delay_ms: (0, 0),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_check_period_defaults_to_fifth_of_ttl() {
        let cache = CacheConfig {
            search_ttl_secs: 600,
            ..Default::default()
        };
        assert_eq!(cache.check_period(), Duration::from_secs(120));
    }

    #[test]
    fn test_check_period_never_zero() {
        let cache = CacheConfig {
            search_ttl_secs: 2,
            ..Default::default()
        };
        assert_eq!(cache.check_period(), Duration::from_secs(1));
    }

    #[test]
    fn test_check_period_explicit() {
        let cache = CacheConfig {
            check_period_secs: Some(7),
            ..Default::default()
        };
        assert_eq!(cache.check_period(), Duration::from_secs(7));
    }

    #[test]
    fn test_from_json_partial_uses_defaults() {
        let config =
            AggregatorConfig::from_json(r#"{"max_results": 5, "cache": {"search_ttl_secs": 60}}"#)
                .unwrap();
        assert_eq!(config.max_results, 5);
        assert_eq!(config.cache.search_ttl_secs, 60);
        assert_eq!(config.cache.content_ttl_secs, 3600);
        assert_eq!(config.adapter_timeout_secs, 10);
        assert!((config.scoring.title_phrase - 0.4).abs() < f64::EPSILON);
    }

    #[test]
    fn test_from_json_rejects_invalid_values() {
        let result = AggregatorConfig::from_json(r#"{"max_results": 0}"#);
        assert!(matches!(result, Err(SearchError::Config(_))));
    }

    #[test]
    fn test_from_json_rejects_malformed() {
        let result = AggregatorConfig::from_json("{ not json");
        assert!(matches!(result, Err(SearchError::Json(_))));
    }

    #[test]
    fn test_from_file_missing() {
        let result = AggregatorConfig::from_file("/definitely/not/here.json");
        assert!(matches!(result, Err(SearchError::Io(_))));
    }
}
