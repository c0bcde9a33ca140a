//! DuckDuckGo search engine implementation.
//!
//! Uses the JavaScript-free endpoint at `https://html.duckduckgo.com/html/`.

use async_trait::async_trait;
use reqwest::Client;
use scraper::Html;
use url::Url;

use super::{element_text, selector};
use crate::http;
use crate::query::SafeSearch;
use crate::{Engine, EngineConfig, RawResult, Result, SearchQuery};

/// DuckDuckGo search engine.
pub struct DuckDuckGo {
    config: EngineConfig,
    client: Client,
}

impl DuckDuckGo {
    /// Creates a new DuckDuckGo engine.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::new("DuckDuckGo", "ddg"))
    }

    /// Creates with custom configuration.
    pub fn with_config(config: EngineConfig) -> Self {
        let client = http::client_or_default(std::time::Duration::from_secs(config.timeout));
        Self { config, client }
    }
}

impl Default for DuckDuckGo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Engine for DuckDuckGo {
    fn config(&self) -> &EngineConfig {
        &self.config
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<RawResult>> {
        let mut params = vec![("q", query.query.as_str())];
        match query.safesearch {
            SafeSearch::Strict => params.push(("kp", "1")),
            SafeSearch::Off => params.push(("kp", "-2")),
            SafeSearch::Moderate => {}
        }

        let html = self
            .client
            .post("https://html.duckduckgo.com/html/")
            .form(&params)
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
    let result_selector = selector(".result:not(.result--ad)")?;
    let title_selector = selector(".result__a")?;
    let snippet_selector = selector(".result__snippet")?;

    let mut results = Vec::new();

    for element in document.select(&result_selector) {
        let Some(title_elem) = element.select(&title_selector).next() else {
            continue;
        };

        let title = element_text(title_elem);
        let url = title_elem
            .value()
            .attr("href")
            .and_then(extract_redirect_url)
            .unwrap_or_default();

        let snippet = element
            .select(&snippet_selector)
            .next()
            .map(element_text)
            .unwrap_or_default();

        if !url.is_empty() && !title.is_empty() {
            results.push(RawResult::new(url, title, snippet));
        }
    }

    Ok(results)
}

/// Unwraps DuckDuckGo's `//duckduckgo.com/l/?uddg=<target>` redirect links.
/// Direct links pass through unchanged.
fn extract_redirect_url(href: &str) -> Option<String> {
    let full = if href.starts_with("//") {
        format!("https:{}", href)
    } else {
        href.to_string()
    };

    let parsed = Url::parse(&full).ok()?;
    if parsed.host_str() == Some("duckduckgo.com") && parsed.path().starts_with("/l/") {
        parsed
            .query_pairs()
            .find(|(key, _)| key == "uddg")
            .map(|(_, value)| value.into_owned())
    } else {
        Some(full)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duckduckgo_new() {
        let engine = DuckDuckGo::new();
        assert_eq!(engine.config.name, "DuckDuckGo");
        assert_eq!(engine.config.shortcut, "ddg");
        assert_eq!(engine.config.timeout, 10);
        assert!(engine.config.enabled);
    }

    #[test]
    fn test_duckduckgo_with_config() {
        let engine = DuckDuckGo::with_config(EngineConfig::new("Custom DDG", "cddg"));
        assert_eq!(engine.name(), "Custom DDG");
        assert_eq!(engine.shortcut(), "cddg");
    }

    #[test]
    fn test_extract_redirect_url() {
        let url = "//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com%2Fpage&rut=abc";
        assert_eq!(
            extract_redirect_url(url),
            Some("https://example.com/page".to_string())
        );
    }

    #[test]
    fn test_extract_redirect_url_direct_link() {
        assert_eq!(
            extract_redirect_url("https://example.com/a"),
            Some("https://example.com/a".to_string())
        );
    }

    #[test]
    fn test_extract_redirect_url_garbage() {
        assert_eq!(extract_redirect_url("javascript void"), None);
    }

    #[test]
    fn test_parse_results_empty_html() {
        let results = parse_results("<html><body></body></html>").unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_parse_results_with_results() {
        let html = r#"
            <html><body>
                <div class="result results_links">
                    <h2 class="result__title">
                        <a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fwww.rust-lang.org%2F&rut=x">Rust Programming Language</a>
                    </h2>
                    <a class="result__snippet">A language empowering everyone.</a>
                </div>
                <div class="result result--ad">
                    <a class="result__a" href="https://ads.example.com">Sponsored</a>
                </div>
                <div class="result">
                    <a class="result__a" href="https://doc.rust-lang.org/book/">The Book</a>
                </div>
            </body></html>
        "#;
        let results = parse_results(html).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "Rust Programming Language");
        assert_eq!(results[0].url, "https://www.rust-lang.org/");
        assert_eq!(results[0].snippet, "A language empowering everyone.");
        assert_eq!(results[1].url, "https://doc.rust-lang.org/book/");
        assert_eq!(results[1].snippet, "");
    }
}
