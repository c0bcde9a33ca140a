//! Synthetic results returned when every source came back empty.

use chrono::Utc;

use crate::normalize::{extract_domain, favicon_url};
use crate::{NormalizedResult, ResultCategory};

/// Source tag of the notice result.
pub const NOTICE_SOURCE: &str = "notice";

/// Source tag of the search-engine links.
pub const EMERGENCY_SOURCE: &str = "emergency";

const LINKS: &[(&str, &str)] = &[
    ("Google", "https://www.google.com/search?q="),
    ("Bing", "https://www.bing.com/search?q="),
    ("DuckDuckGo", "https://duckduckgo.com/?q="),
];

/// Builds the degraded result set for `query`: a notice that live retrieval
/// failed, followed by links that run the query on major search engines.
pub fn degraded_results(query: &str) -> Vec<NormalizedResult> {
    let query = query.trim();
    let encoded = urlencoding::encode(query);
    let fetched_at = Utc::now();

    let notice = NormalizedResult {
        title: "Live search results are temporarily unavailable".to_string(),
        url: format!("https://duckduckgo.com/?q={}", encoded),
        snippet: format!(
            "No search source returned results for \"{}\". Try again shortly or use one of the links below.",
            query
        ),
        relevance_score: 1.0,
        source_domain: "duckduckgo.com".to_string(),
        source: NOTICE_SOURCE.to_string(),
        category: ResultCategory::Other,
        fetched_at,
        favicon_url: String::new(),
    };

    let links = LINKS.iter().enumerate().map(|(i, (name, base))| {
        let url = format!("{}{}", base, encoded);
        let domain = extract_domain(&url);
        NormalizedResult {
            title: format!("Search \"{}\" on {}", query, name),
            url,
            snippet: format!("Open {} results for this query.", name),
            relevance_score: 0.9 - 0.1 * i as f64,
            favicon_url: favicon_url(&domain),
            source_domain: domain,
            source: EMERGENCY_SOURCE.to_string(),
            category: ResultCategory::Reference,
            fetched_at,
        }
    });

    std::iter::once(notice).chain(links).collect()
}
