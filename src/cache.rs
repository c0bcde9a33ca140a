//! In-memory TTL cache shared by the aggregator and the enricher.
//!
//! Entries expire per key. Expired entries are dropped lazily on [`Cache::get`]
//! and periodically by the sweeper task started with [`Cache::spawn_sweeper`].
//! Values are handed out as `Arc<V>`; a hit never copies the stored value.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use dashmap::DashMap;
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

use crate::config::CacheConfig;
use crate::content::PageContent;
use crate::NormalizedResult;

/// Key prefix for cached page content.
pub const CONTENT_KEY_PREFIX: &str = "content:";

/// Value type of the process-wide cache.
#[derive(Debug, Clone)]
pub enum CacheValue {
    /// Final result list of a search.
    Results(Vec<NormalizedResult>),
    /// Extracted content of a fetched page.
    Page(PageContent),
}

/// The cache instance shared between the aggregator and the enricher.
pub type SharedCache = Arc<Cache<CacheValue>>;

/// Cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub sets: u64,
    pub item_count: usize,
}

struct CacheEntry<V> {
    value: Arc<V>,
    expires_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Concurrent key/value store with per-entry expiry.
pub struct Cache<V> {
    entries: DashMap<String, CacheEntry<V>>,
    default_ttl: Duration,
    check_period: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
    sets: AtomicU64,
}

impl<V: Send + Sync + 'static> Cache<V> {
    /// Creates an empty cache.
    pub fn new(default_ttl: Duration, check_period: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            default_ttl,
            check_period,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            sets: AtomicU64::new(0),
        }
    }

    /// Creates a cache using the search TTL as default.
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.search_ttl(), config.check_period())
    }

    /// Returns the TTL used by [`Cache::set_default`].
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Returns the live value for `key`. Absent and expired keys count as misses.
    pub fn get(&self, key: &str) -> Option<Arc<V>> {
        let now = Instant::now();

        if let Some(entry) = self.entries.get(key) {
            if !entry.is_expired(now) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Some(Arc::clone(&entry.value));
            }
        }

        // The read guard is released above; removing under it would deadlock.
        self.entries.remove_if(key, |_, entry| entry.is_expired(now));
        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Stores `value` under `key` for `ttl`. A zero TTL stores nothing.
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Duration) {
        if ttl.is_zero() {
            return;
        }
        let entry = CacheEntry {
            value: Arc::new(value),
            expires_at: Instant::now() + ttl,
        };
        self.entries.insert(key.into(), entry);
        self.sets.fetch_add(1, Ordering::Relaxed);
    }

    /// Stores `value` with the default TTL.
    pub fn set_default(&self, key: impl Into<String>, value: V) {
        self.set(key, value, self.default_ttl);
    }

    /// Removes `key`; returns whether it was present.
    pub fn delete(&self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Removes every entry. Counters are kept.
    pub fn flush(&self) {
        self.entries.clear();
    }

    /// Returns whether a live entry exists, without touching the counters.
    pub fn contains(&self, key: &str) -> bool {
        let now = Instant::now();
        self.entries
            .get(key)
            .map(|e| !e.is_expired(now))
            .unwrap_or(false)
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            sets: self.sets.load(Ordering::Relaxed),
            item_count: self.entries.len(),
        }
    }

    /// Drops all expired entries and returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        before.saturating_sub(self.entries.len())
    }

    /// Starts the periodic sweep. The task ends once the cache is dropped.
    pub fn spawn_sweeper(self: &Arc<Self>) -> JoinHandle<()> {
        let weak: Weak<Self> = Arc::downgrade(self);
        let period = self.check_period.max(Duration::from_millis(1));

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // first tick completes immediately
            interval.tick().await;

            loop {
                interval.tick().await;
                let Some(cache) = weak.upgrade() else {
                    debug!("Cache dropped, sweeper exiting");
                    break;
                };
                let removed = cache.purge_expired();
                if removed > 0 {
                    debug!("Swept {} expired cache entries", removed);
                }
            }
        })
    }
}
