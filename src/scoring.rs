//! Relevance scoring and ranking.

use serde::{Deserialize, Serialize};

use crate::NormalizedResult;

/// Tunable boosts applied by the [`Scorer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    /// Boost when the title contains the whole query.
    pub title_phrase: f64,
    /// Boost per query word found in the title (only without a phrase match).
    pub title_word: f64,
    /// Boost per query word found in the snippet.
    pub snippet_word: f64,
    /// Boost for authoritative domains.
    pub authority: f64,
    /// Minimum character count for a query word to count.
    pub min_word_len: usize,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            title_phrase: 0.4,
            title_word: 0.1,
            snippet_word: 0.05,
            authority: 0.2,
            min_word_len: 3,
        }
    }
}

/// Recomputes relevance scores and orders results by them.
#[derive(Debug, Clone, Default)]
pub struct Scorer {
    weights: ScoringWeights,
}

impl Scorer {
    /// Creates a scorer with the given weights.
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    /// Returns the weights in use.
    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Boosts each result's current score against `query`, clamps it to
    /// `[0, 1]` and sorts descending. Equal scores keep their input order.
    pub fn score(&self, mut results: Vec<NormalizedResult>, query: &str) -> Vec<NormalizedResult> {
        let query = query.trim().to_lowercase();
        let words: Vec<&str> = query
            .split_whitespace()
            .filter(|w| w.chars().count() >= self.weights.min_word_len)
            .collect();

        for result in &mut results {
            let boost = self.boost(result, &query, &words);
            let score = result.relevance_score + boost;
            result.relevance_score = if score.is_finite() {
                score.clamp(0.0, 1.0)
            } else {
                0.0
            };
        }

        // sort_by is stable; every score is finite here
        results.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));

        results
    }

    fn boost(&self, result: &NormalizedResult, query: &str, words: &[&str]) -> f64 {
        let title = result.title.to_lowercase();
        let snippet = result.snippet.to_lowercase();
        let mut boost = 0.0;

        if !query.is_empty() && title.contains(query) {
            boost += self.weights.title_phrase;
        } else {
            let hits = words.iter().filter(|w| title.contains(*w)).count();
            boost += self.weights.title_word * hits as f64;
        }

        let hits = words.iter().filter(|w| snippet.contains(*w)).count();
        boost += self.weights.snippet_word * hits as f64;

        if is_authoritative(&result.source_domain) {
            boost += self.weights.authority;
        }

        boost
    }
}

/// Wikipedia, government and education domains.
pub fn is_authoritative(domain: &str) -> bool {
    let domain = domain.to_lowercase();
    domain.contains("wikipedia.org") || domain.ends_with(".gov") || domain.ends_with(".edu")
}
