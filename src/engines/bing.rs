//! Bing search engine implementation.

use async_trait::async_trait;
use reqwest::Client;
use scraper::Html;

use super::{element_text, selector};
use crate::http;
use crate::query::SafeSearch;
use crate::{Engine, EngineConfig, RawResult, Result, SearchQuery};

/// Bing web search.
pub struct Bing {
    config: EngineConfig,
    client: Client,
}

impl Bing {
    /// Creates a new Bing engine.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::new("Bing", "bing"))
    }

    /// Creates with custom configuration.
    pub fn with_config(config: EngineConfig) -> Self {
        let client = http::client_or_default(std::time::Duration::from_secs(config.timeout));
        Self { config, client }
    }
}

impl Default for Bing {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Engine for Bing {
    fn config(&self) -> &EngineConfig {
        &self.config
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<RawResult>> {
        let adlt = match query.safesearch {
            SafeSearch::Off => "off",
            SafeSearch::Moderate => "moderate",
            SafeSearch::Strict => "strict",
        };
        let url = format!(
            "https://www.bing.com/search?q={}&adlt={}",
            urlencoding::encode(&query.query),
            adlt
        );

        let html = self
            .client
            .get(&url)
            .header("Accept-Language", "en-US,en;q=0.9")
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

    let result_selector = selector("li.b_algo")?;
    let title_selector = selector("h2 a")?;
    let snippet_selector = selector(".b_caption p, .b_algoSlug")?;

    let mut results = Vec::new();

    for element in document.select(&result_selector) {
        let Some(title_elem) = element.select(&title_selector).next() else {
            continue;
        };

        let title = element_text(title_elem);
        let url = title_elem.value().attr("href").unwrap_or_default().to_string();

        let snippet = element
            .select(&snippet_selector)
            .next()
            .map(element_text)
            .unwrap_or_default();

        if !url.is_empty() && !title.is_empty() && url.starts_with("http") {
            results.push(RawResult::new(url, title, snippet));
        }
    }

    Ok(results)
}
