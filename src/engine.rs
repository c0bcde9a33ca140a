//! Source adapter trait and configuration.

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

use crate::{RawResult, Result, SearchQuery};

/// Configuration for a search engine adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Display name of the engine; also the `source_tag` of its results.
    pub name: String,
    /// Short identifier (e.g., "ddg" for DuckDuckGo).
    pub shortcut: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// Random pre-request delay range `(min, max)` in milliseconds.
    #[serde(default = "default_request_delay")]
    pub request_delay_ms: (u64, u64),
    /// Whether the engine takes part in the fan-out.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_timeout() -> u64 {
    10
}

fn default_request_delay() -> (u64, u64) {
    (1000, 3000)
}

fn default_enabled() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            shortcut: String::new(),
            timeout: default_timeout(),
            request_delay_ms: default_request_delay(),
            enabled: true,
        }
    }
}

impl EngineConfig {
    /// Creates a configuration with default timeout and delay.
    pub fn new(name: impl Into<String>, shortcut: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shortcut: shortcut.into(),
            ..Default::default()
        }
    }

    /// Picks a random pre-request delay within the configured range.
    pub fn jitter(&self) -> Duration {
        let (min, max) = self.request_delay_ms;
        if max <= min {
            return Duration::from_millis(min);
        }
        Duration::from_millis(rand::thread_rng().gen_range(min..=max))
    }
}

/// Trait for implementing search engine adapters.
///
/// Implementors only provide [`Engine::search`], which may fail. Callers use
/// [`Engine::fetch`], which never fails: it applies the pre-request delay and
/// timeout, stamps source and rank on each result, and turns any error
/// into an empty list.
#[async_trait]
pub trait Engine: Send + Sync {
    /// Returns the engine configuration.
    fn config(&self) -> &EngineConfig;

    /// Performs a search and returns results in engine order.
    async fn search(&self, query: &SearchQuery) -> Result<Vec<RawResult>>;

    /// Returns the engine name.
    fn name(&self) -> &str {
        &self.config().name
    }

    /// Returns the engine shortcut.
    fn shortcut(&self) -> &str {
        &self.config().shortcut
    }

    /// Returns whether the engine is enabled.
    fn is_enabled(&self) -> bool {
        self.config().enabled
    }

    /// Best-effort search: errors and timeouts yield an empty list.
    async fn fetch(&self, query: &SearchQuery) -> Vec<RawResult> {
        let config = self.config();
        let name = config.name.clone();

        let delay = config.jitter();
        if !delay.is_zero() {
            sleep(delay).await;
        }

        match timeout(Duration::from_secs(config.timeout), self.search(query)).await {
            Ok(Ok(results)) => {
                debug!("Engine {} returned {} results", name, results.len());
                results
                    .into_iter()
                    .enumerate()
                    .map(|(position, result)| result.with_source(name.clone(), position as u32))
                    .collect()
            }
            Ok(Err(e)) => {
                warn!("Engine {} failed: {}", name, e);
                Vec::new()
            }
            Err(_) => {
                warn!("Engine {} timed out", name);
                Vec::new()
            }
        }
    }
}
