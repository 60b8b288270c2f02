//! Plain-text artifact
//!
//! Pages are concatenated in result order, each as a title heading, a URL
//! line, the fetch strategy, a blank line, the flattened text, and a
//! separator of 80 `=` characters surrounded by blank lines.

use crate::crawler::PageContent;
use crate::ExportError;
use std::fs;
use std::path::Path;

/// Width of the line separating two pages
pub const SEPARATOR_WIDTH: usize = 80;

/// Renders every page into the text artifact
///
/// The function is pure and deterministic.
///
/// # Example
///
/// ```
/// use website_scraper::output::render_text;
/// use website_scraper::PageContent;
///
/// let page = PageContent {
///     url: "https://example.com/".to_string(),
///     title: "Home".to_string(),
///     text: "Welcome".to_string(),
///     raw_html: String::new(),
///     fetch_strategy: "reqwest".to_string(),
/// };
/// let text = render_text(&[page]);
/// assert!(text.starts_with("# Home\nURL: https://example.com/\nFetched via: reqwest\n\nWelcome\n\n"));
/// ```
pub fn render_text(pages: &[PageContent]) -> String {
    let separator = "=".repeat(SEPARATOR_WIDTH);
    let mut out = String::new();

    for page in pages {
        out.push_str(&format!("# {}\n", page.title));
        out.push_str(&format!("URL: {}\n", page.url));
        out.push_str(&format!("Fetched via: {}\n\n", page.fetch_strategy));
        out.push_str(&page.text);
        out.push_str(&format!("\n\n{}\n\n", separator));
    }

    out
}

/// Writes the text artifact to `destination`, creating parent directories
pub fn export_text(pages: &[PageContent], destination: &Path) -> Result<(), ExportError> {
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(destination, render_text(pages))?;
    Ok(())
}
