//! HTML link extraction
//!
//! Links come from `<a href>` tags and `<link rel="canonical">`, resolved
//! against the page URL, in document order.

use crate::ParseError;
use scraper::{Html, Selector};
use url::Url;

/// Turns page content into absolute candidate URLs
pub trait LinkExtractor: Send + Sync {
    /// Extracts the absolute URLs referenced by `content`, in source order
    fn extract_links(&self, content: &[u8], base_url: &Url) -> Result<Vec<String>, ParseError>;
}

/// [`LinkExtractor`] for HTML documents, backed by `scraper`
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` tags anywhere in the document
/// - `<link rel="canonical" href="...">`
///
/// **Exclude:**
/// - `<a href="..." download>`
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs
/// - Fragment-only links
/// - Anything that does not resolve to http/https
///
/// `rel="nofollow"` links are followed.
#[derive(Debug, Clone)]
pub struct HtmlLinkExtractor {
    links: Selector,
}

impl HtmlLinkExtractor {
    pub fn new() -> Result<Self, ParseError> {
        // One selector list keeps anchors and canonical links interleaved
        Ok(Self {
            links: parse_selector("a[href]:not([download]), link[rel='canonical'][href]")?,
        })
    }
}

fn parse_selector(selector: &str) -> Result<Selector, ParseError> {
    Selector::parse(selector).map_err(|e| ParseError::InvalidSelector(format!("{}: {}", selector, e)))
}

impl LinkExtractor for HtmlLinkExtractor {
    fn extract_links(&self, content: &[u8], base_url: &Url) -> Result<Vec<String>, ParseError> {
        let html = String::from_utf8_lossy(content);
        let document = Html::parse_document(&html);

        Ok(document
            .select(&self.links)
            .filter_map(|element| element.value().attr("href"))
            .filter_map(|href| resolve_link(href, base_url))
            .collect())
    }
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
pub fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if ["javascript:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
    {
        return None;
    }

    let absolute_url = base_url.join(href).ok()?;
    match absolute_url.scheme() {
        "http" | "https" => Some(absolute_url.to_string()),
        _ => None,
    }
}
