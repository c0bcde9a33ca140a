//! Brave search engine implementation.

use async_trait::async_trait;
use reqwest::Client;
use scraper::Html;

use super::{element_text, selector};
use crate::http;
use crate::{Engine, EngineConfig, RawResult, Result, SearchQuery};

/// Brave search engine.
pub struct Brave {
    config: EngineConfig,
    client: Client,
}

impl Brave {
    /// Creates a new Brave engine.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::new("Brave", "brave"))
    }

    /// Creates with custom configuration.
    pub fn with_config(config: EngineConfig) -> Self {
        let client = http::client_or_default(std::time::Duration::from_secs(config.timeout));
        Self { config, client }
    }
}

impl Default for Brave {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Engine for Brave {
    fn config(&self) -> &EngineConfig {
        &self.config
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<RawResult>> {
        let url = format!(
            "https://search.brave.com/search?q={}&source=web",
            urlencoding::encode(&query.query)
        );

        let html = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        parse_results(&html)
    }
}

pub(crate) fn parse_results(html: &str) -> Result<Vec<RawResult>> {
    let document = Html::parse_document(html);

    let result_selector = selector(r#"div.snippet[data-type="web"]"#)?;
    let title_selector = selector(".search-snippet-title, .title")?;
    let desc_selector = selector(".generic-snippet .content, .snippet-description")?;
    let url_selector = selector(r#"a[href^="http"]"#)?;

    let mut results = Vec::new();

    for element in document.select(&result_selector) {
        let title = element
            .select(&title_selector)
            .next()
            .map(element_text)
            .unwrap_or_default();

        let url = element
            .select(&url_selector)
            .next()
            .and_then(|e| e.value().attr("href"))
            .unwrap_or_default()
            .to_string();

        let snippet = element
            .select(&desc_selector)
            .next()
            .map(element_text)
            .unwrap_or_default();

        if !url.is_empty() && !title.is_empty() {
            results.push(RawResult::new(url, title, snippet));
        }
    }

    Ok(results)
}
