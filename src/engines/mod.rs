//! Search engine adapter implementations.

mod bing;
mod brave;
mod duckduckgo;
mod wikipedia;

pub use bing::Bing;
pub use brave::Brave;
pub use duckduckgo::DuckDuckGo;
pub use wikipedia::Wikipedia;

use scraper::Selector;

use crate::{Result, SearchError};

/// Compiles a CSS selector, mapping failures to [`SearchError::Parse`].
pub(crate) fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css)
        .map_err(|e| SearchError::Parse(format!("Failed to parse selector: {:?}", e)))
}

/// Collects an element's text and trims it.
pub(crate) fn element_text(element: scraper::ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
