//! Search query representation and cache-key derivation.

use serde::{Deserialize, Serialize};

use crate::{Result, SearchError};

/// Prefix of cache keys holding aggregated search results.
pub const SEARCH_KEY_PREFIX: &str = "search:";

/// Safe search level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SafeSearch {
    /// No filtering.
    Off = 0,
    /// Moderate filtering.
    #[default]
    Moderate = 1,
    /// Strict filtering.
    Strict = 2,
}

/// A search query with all parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQuery {
    /// The search terms.
    pub query: String,
    /// Language/locale (e.g., "en-US").
    pub language: Option<String>,
    /// Safe search level.
    pub safesearch: SafeSearch,
}

impl SearchQuery {
    /// Creates a new search query with the given terms.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            language: None,
            safesearch: SafeSearch::Moderate,
        }
    }

    /// Sets the language/locale.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Sets the safe search level.
    pub fn with_safesearch(mut self, level: SafeSearch) -> Self {
        self.safesearch = level;
        self
    }

    /// The normalized form of the search terms. See [`normalize_query`].
    pub fn normalized(&self) -> String {
        normalize_query(&self.query)
    }

    /// Cache key for this query. Equal to [`search_cache_key`] of the terms
    /// unless a language or a non-default safe search level is set; those
    /// are appended so differently filtered searches do not share entries.
    pub fn cache_key(&self) -> String {
        let mut key = search_cache_key(&self.query);
        if let Some(language) = &self.language {
            key.push_str("|lang=");
            key.push_str(&language.to_lowercase());
        }
        if self.safesearch != SafeSearch::default() {
            key.push_str(&format!("|safe={}", self.safesearch as u8));
        }
        key
    }
}

/// Trims outer whitespace and lower-cases. Internal spacing is kept as-is,
/// so `"  Define  Entropy  "` becomes `"define  entropy"`.
pub fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}

/// Cache key for the aggregated results of `query`.
pub fn search_cache_key(query: &str) -> String {
    format!("{}{}", SEARCH_KEY_PREFIX, normalize_query(query))
}

/// Rejects empty and whitespace-only queries.
///
/// This check belongs to the caller; the aggregator itself accepts any
/// string.
pub fn validate_query(query: &str) -> Result<()> {
    if query.trim().is_empty() {
        return Err(SearchError::InvalidQuery("Query cannot be empty".into()));
    }
    Ok(())
}

/// How much of a fetched page the enricher keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchDepth {
    /// Short summary only.
    Shallow,
    /// Summary plus the leading headings.
    #[default]
    Moderate,
    /// Longer summary and the full heading outline.
    Deep,
}

impl SearchDepth {
    /// Number of qualifying paragraphs joined into the summary.
    pub fn summary_paragraphs(self) -> usize {
        match self {
            Self::Shallow => 1,
            Self::Moderate => 3,
            Self::Deep => 5,
        }
    }

    /// Maximum number of headings kept.
    pub fn max_headings(self) -> usize {
        match self {
            Self::Shallow => 0,
            Self::Moderate => 10,
            Self::Deep => 50,
        }
    }
}

/// Options for [`crate::Aggregator::enhanced_search`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnhancedSearchOptions {
    /// Whether to fetch page content for the top results.
    pub fetch_content: bool,
    /// How many of the top results to enrich.
    pub max_content_results: usize,
    /// Enrichment depth.
    pub depth: SearchDepth,
}

impl Default for EnhancedSearchOptions {
    fn default() -> Self {
        Self {
            fetch_content: true,
            max_content_results: 3,
            depth: SearchDepth::Moderate,
        }
    }
}
