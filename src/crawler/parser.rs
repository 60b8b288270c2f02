//! HTML parser for extracting page content and links
//!
//! This module handles parsing fetched HTML to extract:
//! - The page title (falling back to the page URL)
//! - The flattened visible text, one text node per line
//! - Absolute outbound links that fall inside the crawl's domain scope

use crate::url::DomainScope;
use scraper::{Html, Node, Selector};
use url::Url;

/// Elements whose text content is never visible
const INVISIBLE_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Extracted information from an HTML page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedPage {
    /// The `<title>` text, or the page URL when there is none
    pub title: String,

    /// Visible text nodes, trimmed, newline-joined, in document order
    pub text: String,

    /// In-scope absolute links, in document order
    pub links: Vec<String>,
}

/// Parses HTML content and extracts title, text, and links
///
/// # Link Extraction Rules
///
/// Every `<a>` with a non-empty `href` is resolved against `page_url`.
/// Links that do not resolve, are not HTTP(S), or fall outside `scope` are
/// silently dropped.
///
/// # Example
///
/// ```
/// use url::Url;
/// use website_scraper::crawler::extract;
/// use website_scraper::url::DomainScope;
///
/// let page_url = Url::parse("https://example.com/").unwrap();
/// let scope = DomainScope::derive(&page_url);
/// let html = r#"<html><head><title>Test</title></head>
///     <body><p>Hello</p><a href="/page">Link</a></body></html>"#;
///
/// let page = extract(html, &page_url, &scope);
/// assert_eq!(page.title, "Test");
/// assert_eq!(page.links, vec!["https://example.com/page".to_string()]);
/// ```
pub fn extract(html: &str, page_url: &Url, scope: &DomainScope) -> ExtractedPage {
    let document = Html::parse_document(html);

    let title = extract_title(&document).unwrap_or_else(|| page_url.to_string());
    let text = extract_text(&document);
    let links = extract_links(&document, page_url, scope);

    ExtractedPage { title, text, links }
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Flattens every visible text node into newline-separated lines
fn extract_text(document: &Html) -> String {
    let mut lines: Vec<&str> = Vec::new();

    for node in document.tree.root().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };

        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .map_or(false, |element| INVISIBLE_ELEMENTS.contains(&element.name()))
        });
        if hidden {
            continue;
        }

        let trimmed = text.trim();
        if !trimmed.is_empty() {
            lines.push(trimmed);
        }
    }

    lines.join("\n")
}

/// Extracts all in-scope links from the HTML document
fn extract_links(document: &Html, page_url: &Url, scope: &DomainScope) -> Vec<String> {
    let Ok(a_selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&a_selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_link(href, page_url))
        .filter(|absolute| scope.allows(absolute))
        .map(|absolute| absolute.to_string())
        .collect()
}

/// Resolves a link href to an absolute URL
fn resolve_link(href: &str, page_url: &Url) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    page_url.join(href).ok()
}
