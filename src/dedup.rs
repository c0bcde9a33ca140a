//! Cross-source result deduplication.

use std::collections::HashSet;

use url::Url;

use crate::NormalizedResult;

/// Returns the identity of a result URL: `host + path` when it parses with a
/// host, the full string otherwise. Query strings and fragments are ignored,
/// so pages differing only by those collapse into one.
pub fn dedup_key(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => match parsed.host_str() {
            Some(host) => format!("{}{}", host, parsed.path()),
            None => url.to_string(),
        },
        Err(_) => url.to_string(),
    }
}

/// Drops results whose [`dedup_key`] was already seen. The first occurrence
/// wins whatever its score; order is preserved.
pub fn deduplicate(results: Vec<NormalizedResult>) -> Vec<NormalizedResult> {
    let mut seen = HashSet::new();
    results
        .into_iter()
        .filter(|r| seen.insert(dedup_key(&r.url)))
        .collect()
}
