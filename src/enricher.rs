//! Content enrichment for top search results.

use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use crate::cache::{CacheValue, SharedCache, CONTENT_KEY_PREFIX};
use crate::config::EnrichmentConfig;
use crate::content::{self, PageContent};
use crate::fetcher::PageFetcher;
use crate::query::SearchDepth;
use crate::{PageInsights, Result, SearchError};

const MONTHS: &str =
    "January|February|March|April|May|June|July|August|September|October|November|December";

static ISO_DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\d{4}-\d{2}-\d{2}\b").unwrap());

static LONG_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"\b(?:{})\s+\d{{1,2}},?\s+\d{{4}}\b", MONTHS)).unwrap()
});

static US_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{1,2}/\d{1,2}/\d{4}\b").unwrap());

static MONTH_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"\b(?:{})\s+\d{{4}}\b", MONTHS)).unwrap());

/// Outcome of enriching one result.
#[derive(Debug, Clone, PartialEq)]
pub enum Enrichment {
    Enriched(PageInsights),
    Failed { reason: String },
}

impl Enrichment {
    /// Returns the insights of a successful enrichment.
    pub fn into_insights(self) -> Option<PageInsights> {
        match self {
            Self::Enriched(insights) => Some(insights),
            Self::Failed { .. } => None,
        }
    }
}

/// Fetches result pages and derives summaries, headings, dates and metadata.
pub struct Enricher {
    fetcher: Arc<dyn PageFetcher>,
    cache: SharedCache,
    config: EnrichmentConfig,
    content_ttl: Duration,
}

impl Enricher {
    /// Creates an enricher. Fetched pages are cached with the cache's default TTL
    /// unless [`Enricher::with_content_ttl`] says otherwise.
    pub fn new(fetcher: Arc<dyn PageFetcher>, cache: SharedCache, config: EnrichmentConfig) -> Self {
        let content_ttl = cache.default_ttl();
        Self {
            fetcher,
            cache,
            config,
            content_ttl,
        }
    }

    /// Sets the TTL of `content:` cache entries.
    pub fn with_content_ttl(mut self, ttl: Duration) -> Self {
        self.content_ttl = ttl;
        self
    }

    pub fn config(&self) -> &EnrichmentConfig {
        &self.config
    }

    /// Enriches a single URL. Never fails: fetch and extraction errors come
    /// back as [`Enrichment::Failed`].
    pub async fn enrich(&self, url: &str, query: &str, depth: SearchDepth) -> Enrichment {
        let key = format!("{}{}", CONTENT_KEY_PREFIX, url);
        debug!("Enriching {} for {:?}", url, query);

        if let Some(cached) = self.cache.get(&key) {
            if let CacheValue::Page(page) = cached.as_ref() {
                debug!("Content cache hit for {}", url);
                return Enrichment::Enriched(self.insights(page, depth));
            }
        }

        match self.fetch_page(url).await {
            Ok(page) => {
                let insights = self.insights(&page, depth);
                self.cache.set(key, CacheValue::Page(page), self.content_ttl);
                Enrichment::Enriched(insights)
            }
            Err(e) => {
                warn!("Enrichment of {} failed: {}", url, e);
                Enrichment::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn fetch_page(&self, url: &str) -> Result<PageContent> {
        let html = tokio::time::timeout(self.config.fetch_timeout(), self.fetcher.fetch(url))
            .await
            .map_err(|_| SearchError::Timeout)??;
        content::extract_page(&html, url, self.config.max_content_chars)
    }

    /// Derives insights from already-extracted page content.
    pub fn insights(&self, page: &PageContent, depth: SearchDepth) -> PageInsights {
        let mut metadata = page.metadata.clone();
        if !page.title.is_empty() {
            metadata
                .entry("title".to_string())
                .or_insert_with(|| page.title.clone());
        }

        PageInsights {
            summary: summarize(
                &page.paragraphs,
                self.config.min_paragraph_chars,
                depth.summary_paragraphs(),
            ),
            headings: page
                .headings
                .iter()
                .take(depth.max_headings())
                .cloned()
                .collect(),
            extracted_dates: extract_dates(&page.text),
            metadata,
        }
    }
}

/// Joins, in document order, the first `count` paragraphs longer than
/// `min_chars`.
pub fn summarize(paragraphs: &[String], min_chars: usize, count: usize) -> Option<String> {
    let chosen: Vec<&str> = paragraphs
        .iter()
        .filter(|p| p.chars().count() > min_chars)
        .take(count)
        .map(String::as_str)
        .collect();

    if chosen.is_empty() {
        None
    } else {
        Some(chosen.join(" "))
    }
}

/// Finds date-like substrings, deduplicated, in order of first appearance.
pub fn extract_dates(text: &str) -> Vec<String> {
    let mut found: Vec<(usize, &str)> = [&*ISO_DATE, &*LONG_DATE, &*US_DATE, &*MONTH_YEAR]
        .iter()
        .flat_map(|re| re.find_iter(text).map(|m| (m.start(), m.as_str())))
        .collect();
    found.sort_by_key(|(start, _)| *start);

    let mut dates: Vec<String> = Vec::new();
    for (_, date) in found {
        if !dates.iter().any(|d| d == date) {
            dates.push(date.to_string());
        }
    }
    dates
}
