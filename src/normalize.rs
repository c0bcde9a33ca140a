//! Mapping raw adapter output into [`NormalizedResult`]s.

use chrono::Utc;
use tracing::debug;
use url::Url;

use crate::{NormalizedResult, RawResult, ResultCategory};

/// Title used when an adapter scraped none.
pub const UNTITLED: &str = "Untitled";

/// Snippet used when an adapter scraped none.
pub const NO_DESCRIPTION: &str = "No description available";

/// Domain substrings per category, checked top to bottom. A domain matching
/// several rows takes the first, so the row order matters.
static CATEGORY_TABLE: &[(ResultCategory, &[&str])] = &[
    (
        ResultCategory::News,
        &[
            "news", "cnn.com", "bbc.", "reuters.com", "nytimes.com", "theguardian.com",
            "apnews.com", "bloomberg.com", "washingtonpost.com", "npr.org",
        ],
    ),
    (
        ResultCategory::Academic,
        &[
            ".edu", "arxiv.org", "scholar.google", "researchgate.net", "jstor.org",
            "nature.com", "sciencedirect.com", "springer.com", "ieee.org", "pubmed",
        ],
    ),
    (
        ResultCategory::Social,
        &[
            "twitter.com", "x.com", "facebook.com", "instagram.com", "linkedin.com",
            "tiktok.com", "youtube.com", "mastodon",
        ],
    ),
    (
        ResultCategory::Commercial,
        &["amazon.", "ebay.", "walmart.com", "etsy.com", "aliexpress.com", "shop"],
    ),
    (
        ResultCategory::Forum,
        &[
            "reddit.com", "stackoverflow.com", "stackexchange.com", "quora.com", "forum",
            "discourse",
        ],
    ),
    (
        ResultCategory::Reference,
        &[
            "wikipedia.org", "britannica.com", "dictionary", "merriam-webster.com",
            "wiktionary.org", "docs.", ".gov",
        ],
    ),
];

/// Normalizes raw results in order. Entries with an empty URL are dropped;
/// everything else is kept with placeholders filled in.
pub fn normalize(raw: Vec<RawResult>) -> Vec<NormalizedResult> {
    let fetched_at = Utc::now();

    raw.into_iter()
        .filter_map(|r| {
            let url = r.url.trim();
            if url.is_empty() {
                debug!("Dropping result without URL from {}", r.source_tag);
                return None;
            }
            let url = url.to_string();

            let title = if r.title.trim().is_empty() {
                UNTITLED.to_string()
            } else {
                r.title
            };
            let snippet = if r.snippet.trim().is_empty() {
                NO_DESCRIPTION.to_string()
            } else {
                r.snippet
            };

            // Not floored; the scorer clamps. NaN and infinities count as absent.
            let relevance_score = r
                .score
                .filter(|score| score.is_finite())
                .unwrap_or(1.0 - 0.05 * r.position_hint as f64);

            let source_domain = extract_domain(&url);
            let favicon_url = favicon_url(&source_domain);
            let category = categorize_domain(&source_domain);

            Some(NormalizedResult {
                title,
                url,
                snippet,
                relevance_score,
                source_domain,
                source: r.source_tag,
                category,
                fetched_at,
                favicon_url,
            })
        })
        .collect()
}

/// Returns the URL's host, or the URL itself when it has none.
pub fn extract_domain(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => match parsed.host_str() {
            Some(host) => host.to_string(),
            None => url.to_string(),
        },
        Err(e) => {
            debug!("Malformed URL {:?}: {}", url, e);
            url.to_string()
        }
    }
}

/// Classifies a domain with the first matching category row.
pub fn categorize_domain(domain: &str) -> ResultCategory {
    let domain = domain.to_lowercase();
    CATEGORY_TABLE
        .iter()
        .find(|(_, needles)| needles.iter().any(|n| domain.contains(n)))
        .map(|(category, _)| *category)
        .unwrap_or(ResultCategory::Other)
}

/// Favicon service URL for a domain.
pub fn favicon_url(domain: &str) -> String {
    format!(
        "https://www.google.com/s2/favicons?domain={}&sz=32",
        urlencoding::encode(domain)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(url: &str, title: &str, snippet: &str, pos: u32) -> RawResult {
        RawResult::new(url, title, snippet).with_source("Mock", pos)
    }

    #[test]
    fn test_normalize_drops_missing_urls_only() {
        let input = vec![
            raw("https://a.com/1", "A", "first", 0),
            raw("", "No URL", "dropped", 1),
            raw("https://b.com/2", "B", "second", 2),
            raw("   ", "Blank URL", "dropped", 3),
        ];
        let out = normalize(input);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].title, "A");
        assert_eq!(out[0].snippet, "first");
        assert_eq!(out[1].url, "https://b.com/2");
        assert_eq!(out[1].source, "Mock");
    }

    #[test]
    fn test_normalize_fills_placeholders() {
        let out = normalize(vec![raw("https://a.com", "", "  ", 0)]);
        assert_eq!(out[0].title, UNTITLED);
        assert_eq!(out[0].snippet, NO_DESCRIPTION);
    }

    #[test]
    fn test_normalize_position_score() {
        let out = normalize(vec![
            raw("https://a.com", "A", "", 0),
            raw("https://b.com", "B", "", 4),
            raw("https://c.com", "C", "", 30),
        ]);
        assert_eq!(out[0].relevance_score, 1.0);
        assert!((out[1].relevance_score - 0.8).abs() < 1e-9);
        assert!(out[2].relevance_score < 0.0);
    }

    #[test]
    fn test_normalize_keeps_adapter_score() {
        let out = normalize(vec![raw("https://a.com", "A", "", 3).with_score(0.42)]);
        assert_eq!(out[0].relevance_score, 0.42);
    }

    #[test]
    fn test_normalize_ignores_non_finite_adapter_score() {
        let out = normalize(vec![
            raw("https://a.com", "A", "", 0).with_score(f64::NAN),
            raw("https://b.com", "B", "", 2).with_score(f64::INFINITY),
        ]);
        assert_eq!(out[0].relevance_score, 1.0);
        assert!((out[1].relevance_score - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_normalize_domain_and_favicon() {
        let out = normalize(vec![raw("https://www.example.com/page", "A", "", 0)]);
        assert_eq!(out[0].source_domain, "www.example.com");
        assert_eq!(
            out[0].favicon_url,
            "https://www.google.com/s2/favicons?domain=www.example.com&sz=32"
        );
    }

    #[test]
    fn test_normalize_malformed_url_keeps_raw_domain() {
        let out = normalize(vec![raw("not a url", "A", "", 0)]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].source_domain, "not a url");
    }

    #[test]
    fn test_extract_domain() {
        assert_eq!(extract_domain("https://en.wikipedia.org/wiki/AI"), "en.wikipedia.org");
        assert_eq!(extract_domain("::"), "::");
    }

    #[test]
    fn test_categorize_domain() {
        assert_eq!(categorize_domain("www.bbc.co.uk"), ResultCategory::News);
        assert_eq!(categorize_domain("arxiv.org"), ResultCategory::Academic);
        assert_eq!(categorize_domain("www.reddit.com"), ResultCategory::Forum);
        assert_eq!(categorize_domain("en.wikipedia.org"), ResultCategory::Reference);
        assert_eq!(categorize_domain("www.amazon.com"), ResultCategory::Commercial);
        assert_eq!(categorize_domain("example.com"), ResultCategory::Other);
    }

    #[test]
    fn test_categorize_domain_priority() {
        // matches both news and academic; news is checked first
        assert_eq!(categorize_domain("news.stanford.edu"), ResultCategory::News);
        // matches both academic (.edu) and forum
        assert_eq!(categorize_domain("forum.mit.edu"), ResultCategory::Academic);
    }
}
