//! Fallback escalation used when the fan-out finds nothing.
//!
//! A [`FallbackChain`] is an ordered list of [`SearchStrategy`] values tried
//! one after another until one produces results.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::{Engine, RawResult, SearchQuery};

/// One step of the fallback chain.
#[async_trait]
pub trait SearchStrategy: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Runs the strategy. An empty list means "try the next one".
    async fn execute(&self, query: &SearchQuery) -> Vec<RawResult>;
}

/// Calls an engine up to `attempts` times with linear backoff: after failed
/// attempt `n` it waits `n * base_delay`.
pub struct RetryStrategy {
    engine: Arc<dyn Engine>,
    attempts: u32,
    base_delay: Duration,
}

impl RetryStrategy {
    pub fn new(engine: Arc<dyn Engine>, attempts: u32, base_delay: Duration) -> Self {
        Self {
            engine,
            attempts: attempts.max(1),
            base_delay,
        }
    }

    /// A single attempt, no backoff.
    pub fn once(engine: Arc<dyn Engine>) -> Self {
        Self::new(engine, 1, Duration::ZERO)
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}

#[async_trait]
impl SearchStrategy for RetryStrategy {
    fn name(&self) -> &str {
        self.engine.name()
    }

    async fn execute(&self, query: &SearchQuery) -> Vec<RawResult> {
        for attempt in 1..=self.attempts {
            let results = self.engine.fetch(query).await;
            if !results.is_empty() {
                return results;
            }

            if attempt < self.attempts {
                let delay = self.base_delay * attempt;
                debug!(
                    "{} attempt {}/{} empty, retrying in {:?}",
                    self.engine.name(),
                    attempt,
                    self.attempts,
                    delay
                );
                sleep(delay).await;
            }
        }
        Vec::new()
    }
}

/// Ordered strategies; the first non-empty result wins.
#[derive(Default, Clone)]
pub struct FallbackChain {
    strategies: Vec<Arc<dyn SearchStrategy>>,
}

impl FallbackChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a strategy to the end of the chain.
    pub fn push(&mut self, strategy: impl SearchStrategy + 'static) {
        self.strategies.push(Arc::new(strategy));
    }

    /// Builder form of [`FallbackChain::push`].
    pub fn then(mut self, strategy: impl SearchStrategy + 'static) -> Self {
        self.push(strategy);
        self
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Strategy names in order.
    pub fn names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Tries each strategy in order, stopping at the first non-empty list.
    pub async fn run(&self, query: &SearchQuery) -> Vec<RawResult> {
        for strategy in &self.strategies {
            let results = strategy.execute(query).await;
            if !results.is_empty() {
                info!(
                    "Fallback {} returned {} results",
                    strategy.name(),
                    results.len()
                );
                return results;
            }
            debug!("Fallback {} returned nothing", strategy.name());
        }
        Vec::new()
    }
}
