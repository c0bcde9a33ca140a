//! Search result types.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A result as scraped by a single adapter, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawResult {
    /// Result title. May be empty.
    pub title: String,
    /// Target URL. Entries with an empty URL are dropped by the normalizer.
    pub url: String,
    /// Description/snippet. May be empty.
    pub snippet: String,
    /// Name of the adapter that produced this result.
    pub source_tag: String,
    /// 0-based rank within the adapter's output.
    pub position_hint: u32,
    /// Relevance score supplied by the adapter, if any.
    pub score: Option<f64>,
}

impl RawResult {
    /// Creates a raw result with no source information yet.
    pub fn new(url: impl Into<String>, title: impl Into<String>, snippet: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            snippet: snippet.into(),
            ..Default::default()
        }
    }

    /// Records which adapter produced this result and at which rank.
    pub fn with_source(mut self, tag: impl Into<String>, position: u32) -> Self {
        self.source_tag = tag.into();
        self.position_hint = position;
        self
    }

    /// Sets an adapter-supplied score.
    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }
}

/// Coarse classification of a result's domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultCategory {
    News,
    Academic,
    Social,
    Commercial,
    Forum,
    Reference,
    #[default]
    Other,
}

/// A result in canonical shape. After scoring, the relevance score has been
/// recomputed and lists are ordered by it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedResult {
    /// Result title, never empty.
    pub title: String,
    /// Target URL, never empty.
    pub url: String,
    /// Description/snippet, never empty.
    pub snippet: String,
    /// Relevance in `[0, 1]` once scored.
    pub relevance_score: f64,
    /// Host of `url`, or the raw URL when it does not parse.
    pub source_domain: String,
    /// Adapter (or synthetic source) that produced the result.
    pub source: String,
    /// Domain classification.
    pub category: ResultCategory,
    /// When the result was normalized.
    pub fetched_at: DateTime<Utc>,
    /// Favicon URL derived from the domain.
    pub favicon_url: String,
}

/// A heading extracted from a fetched page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    /// Heading level, 1 through 6.
    pub level: u8,
    /// Heading text.
    pub text: String,
}

/// Insights derived from a result's page content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageInsights {
    /// Short summary from the leading paragraphs.
    pub summary: Option<String>,
    /// Headings in document order.
    pub headings: Vec<Heading>,
    /// Date-like strings found in the text, first-seen order, no duplicates.
    pub extracted_dates: Vec<String>,
    /// Page metadata (description, Open Graph tags, language, ...).
    pub metadata: BTreeMap<String, String>,
}

/// A scored result together with insights from its page content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedResult {
    /// The underlying scored result, unchanged.
    #[serde(flatten)]
    pub result: NormalizedResult,
    /// Insights gathered from the page.
    #[serde(flatten)]
    pub insights: PageInsights,
}

/// Output of [`crate::Aggregator::enhanced_search`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnhancedResults {
    /// The plain search results.
    pub results: Vec<NormalizedResult>,
    /// The successfully enriched subset of the top results.
    pub enriched_results: Vec<EnrichedResult>,
    /// Set when enrichment could not run; `results` is still populated.
    pub error: Option<String>,
}

impl EnhancedResults {
    /// Plain results with an error indicator and no enrichment.
    pub fn degraded(results: Vec<NormalizedResult>, error: impl Into<String>) -> Self {
        Self {
            results,
            enriched_results: Vec::new(),
            error: Some(error.into()),
        }
    }
}
