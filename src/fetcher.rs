//! Page fetcher abstraction for retrieving HTML content.

use async_trait::async_trait;

use crate::Result;

/// Trait for fetching the full HTML content of a URL.
///
/// All configuration (user-agent, timeouts) is set at construction time;
/// `fetch` is a simple URL-in, HTML-out interface. Callers decide what a
/// failure means; the enricher turns it into a failed enrichment.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches the HTML content of the given URL.
    async fn fetch(&self, url: &str) -> Result<String>;
}
