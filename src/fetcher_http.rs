//! HTTP-based page fetcher using reqwest.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;

use crate::config::EnrichmentConfig;
use crate::fetcher::PageFetcher;
use crate::http;
use crate::{Result, SearchError};

/// A page fetcher that uses plain HTTP requests via reqwest.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher with the enrichment fetch timeout and User-Agent.
    pub fn new(config: &EnrichmentConfig) -> Result<Self> {
        let client = http::build_client(config.fetch_timeout(), config.user_agent.as_deref())?;
        Ok(Self { client })
    }

    /// Creates an `HttpFetcher` with a custom reqwest client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?.error_for_status()?;

        if let Some(content_type) = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
        {
            if !is_html(content_type) {
                return Err(SearchError::Parse(format!(
                    "unsupported content type: {}",
                    content_type
                )));
            }
        }

        Ok(response.text().await?)
    }
}

fn is_html(content_type: &str) -> bool {
    let content_type = content_type.to_ascii_lowercase();
    content_type.contains("html") || content_type.starts_with("text/plain")
}
