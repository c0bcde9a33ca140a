//! HTML content extraction.
//!
//! Removes non-content elements (scripts, styles, navigation, ...), finds the
//! main content area and returns its text together with the page's
//! paragraphs, headings and metadata.

use std::collections::BTreeMap;

use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};

use crate::{Heading, Result, SearchError};

/// Default maximum characters kept from a page.
pub const DEFAULT_MAX_CHARS: usize = 10_000;

const BOILERPLATE_TAGS: &[&str] = &[
    "script", "style", "nav", "footer", "header", "aside", "noscript", "svg", "iframe",
];

const CONTENT_SELECTORS: &[&str] = &["article", "main", "[role=\"main\"]", "body"];

/// Readable content extracted from a page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageContent {
    pub url: String,
    /// Text of the `<title>` element, empty when missing.
    pub title: String,
    /// Main-area text, whitespace-collapsed and truncated.
    pub text: String,
    /// Non-empty `<p>` texts in document order.
    pub paragraphs: Vec<String>,
    /// `h1`..`h6` in document order.
    pub headings: Vec<Heading>,
    /// `<meta>` name/property to content, plus `lang`.
    pub metadata: BTreeMap<String, String>,
    pub word_count: usize,
}

/// Extracts content from raw HTML, keeping at most `max_chars` characters of
/// text and of paragraphs.
///
/// # Errors
///
/// Returns [`SearchError::Parse`] if the page has no extractable text.
pub fn extract_page(html: &str, url: &str, max_chars: usize) -> Result<PageContent> {
    let cleaned = strip_boilerplate_tags(html);
    let document = Html::parse_document(&cleaned);

    let title = extract_title(&document);
    let text = normalize_whitespace(&extract_main_text(&document));
    if text.is_empty() {
        return Err(SearchError::Parse("no extractable content found".into()));
    }

    let text = truncate_chars(&text, max_chars);
    let word_count = text.split_whitespace().count();

    Ok(PageContent {
        url: url.to_string(),
        title,
        text,
        paragraphs: extract_paragraphs(&document, max_chars),
        headings: extract_headings(&document),
        metadata: extract_metadata(&document),
        word_count,
    })
}

fn select_first_text(document: &Html, css: &str) -> Option<String> {
    let selector = Selector::parse(css).ok()?;
    document
        .select(&selector)
        .next()
        .map(|el| normalize_whitespace(&el.text().collect::<Vec<_>>().join(" ")))
}

fn extract_title(document: &Html) -> String {
    select_first_text(document, "title").unwrap_or_default()
}

/// Text of the first non-empty content area, in selector priority order.
fn extract_main_text(document: &Html) -> String {
    for css in CONTENT_SELECTORS {
        let Ok(selector) = Selector::parse(css) else {
            continue;
        };
        if let Some(element) = document.select(&selector).next() {
            let text = element.text().collect::<Vec<_>>().join(" ");
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                return trimmed.to_string();
            }
        }
    }
    String::new()
}

fn element_text(element: ElementRef<'_>) -> String {
    normalize_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

fn extract_paragraphs(document: &Html, max_chars: usize) -> Vec<String> {
    let Ok(selector) = Selector::parse("p") else {
        return Vec::new();
    };

    let mut budget = max_chars;
    let mut paragraphs = Vec::new();
    for element in document.select(&selector) {
        if budget == 0 {
            break;
        }
        let text = element_text(element);
        if text.is_empty() {
            continue;
        }
        let text = truncate_chars(&text, budget);
        budget = budget.saturating_sub(text.chars().count());
        paragraphs.push(text);
    }
    paragraphs
}

fn extract_headings(document: &Html) -> Vec<Heading> {
    let Ok(selector) = Selector::parse("h1, h2, h3, h4, h5, h6") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| {
            let level = element.value().name().get(1..)?.parse::<u8>().ok()?;
            let text = element_text(element);
            (!text.is_empty()).then_some(Heading { level, text })
        })
        .collect()
}

fn extract_metadata(document: &Html) -> BTreeMap<String, String> {
    let mut metadata = BTreeMap::new();

    if let Ok(selector) = Selector::parse("meta[content]") {
        for element in document.select(&selector) {
            let attrs = element.value();
            let Some(key) = attrs.attr("name").or_else(|| attrs.attr("property")) else {
                continue;
            };
            let content = attrs.attr("content").unwrap_or_default().trim();
            if !key.is_empty() && !content.is_empty() {
                metadata
                    .entry(key.to_lowercase())
                    .or_insert_with(|| content.to_string());
            }
        }
    }

    if let Ok(selector) = Selector::parse("html[lang]") {
        if let Some(lang) = document
            .select(&selector)
            .next()
            .and_then(|el| el.value().attr("lang"))
        {
            metadata.insert("lang".to_string(), lang.to_string());
        }
    }

    metadata
}

/// Removes boilerplate elements and their content before parsing.
fn strip_boilerplate_tags(html: &str) -> String {
    BOILERPLATE_TAGS
        .iter()
        .fold(html.to_string(), |acc, tag| strip_tag(&acc, tag))
}

/// Removes every `<tag ...>...</tag>` (case-insensitive). An unclosed tag
/// loses only its opening tag.
fn strip_tag(html: &str, tag: &str) -> String {
    // ASCII lowercasing keeps byte offsets aligned with `html`.
    let lower = html.to_ascii_lowercase();
    let open_tag = format!("<{}", tag);
    let close_tag = format!("</{}>", tag);

    let mut result = String::with_capacity(html.len());
    let mut pos = 0;
    loop {
        let Some(offset) = lower[pos..].find(&open_tag) else {
            result.push_str(&html[pos..]);
            break;
        };
        let start = pos + offset;
        let after_tag = start + open_tag.len();

        // <nav> must not match <navigate>
        if let Some(&next) = lower.as_bytes().get(after_tag) {
            if !matches!(next, b' ' | b'>' | b'/' | b'\n' | b'\r' | b'\t') {
                result.push_str(&html[pos..after_tag]);
                pos = after_tag;
                continue;
            }
        }

        result.push_str(&html[pos..start]);

        pos = match lower[start..].find(&close_tag) {
            Some(offset) => start + offset + close_tag.len(),
            None => match lower[start..].find('>') {
                Some(offset) => start + offset + 1,
                None => html.len(),
            },
        };
    }

    result
}

/// Collapses runs of spaces to one and runs of blank lines to one, trimming
/// each line.
fn normalize_whitespace(text: &str) -> String {
    let mut lines = Vec::new();
    let mut blank_run = false;

    for line in text.lines() {
        let collapsed = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.is_empty() {
            if !blank_run && !lines.is_empty() {
                lines.push(String::new());
            }
            blank_run = true;
        } else {
            lines.push(collapsed);
            blank_run = false;
        }
    }

    lines.join("\n").trim().to_string()
}

/// Keeps the first `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => text[..end].to_string(),
        None => text.to_string(),
    }
}
