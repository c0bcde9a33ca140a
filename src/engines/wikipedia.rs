//! Wikipedia search engine implementation.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::http;
use crate::{Engine, EngineConfig, RawResult, Result, SearchQuery};

/// Wikipedia search engine using the MediaWiki API.
pub struct Wikipedia {
    config: EngineConfig,
    client: Client,
    language: String,
}

impl Wikipedia {
    /// Creates a new Wikipedia engine.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::new("Wikipedia", "wiki"))
    }

    /// Creates with custom configuration.
    pub fn with_config(config: EngineConfig) -> Self {
        let client = http::client_or_default(std::time::Duration::from_secs(config.timeout));
        Self {
            config,
            client,
            language: "en".to_string(),
        }
    }

    /// Sets the Wikipedia language.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }
}

impl Default for Wikipedia {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Deserialize)]
struct WikiResponse {
    query: Option<WikiQuery>,
}

#[derive(Deserialize)]
struct WikiQuery {
    search: Vec<WikiSearchResult>,
}

#[derive(Deserialize)]
struct WikiSearchResult {
    title: String,
    snippet: String,
}

#[async_trait]
impl Engine for Wikipedia {
    fn config(&self) -> &EngineConfig {
        &self.config
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<RawResult>> {
        // A per-query language overrides the engine default.
        let language = query.language.as_deref().unwrap_or(&self.language);
        let url = format!(
            "https://{}.wikipedia.org/w/api.php?action=query&list=search&srsearch={}&format=json&srlimit=10",
            language,
            urlencoding::encode(&query.query)
        );

        let body = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        parse_results(&body, language)
    }
}

/// Parses a MediaWiki `list=search` JSON response.
pub(crate) fn parse_results(json: &str, language: &str) -> Result<Vec<RawResult>> {
    let response: WikiResponse = serde_json::from_str(json)?;

    let results = response
        .query
        .map(|q| {
            q.search
                .into_iter()
                .map(|item| {
                    let url = format!(
                        "https://{}.wikipedia.org/wiki/{}",
                        language,
                        item.title.replace(' ', "_")
                    );
                    let snippet = strip_html_tags(&item.snippet);
                    RawResult::new(url, item.title, snippet)
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(results)
}

fn strip_html_tags(html: &str) -> String {
    let mut result = String::new();
    let mut in_tag = false;

    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }

    result
}
