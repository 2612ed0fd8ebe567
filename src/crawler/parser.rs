//! HTML parser for extracting page signals
//!
//! This module handles parsing HTML content to extract:
//! - Page title and meta description
//! - Headings and paragraphs (whitespace collapsed)
//! - Links to follow, resolved to absolute http(s) URLs
//!
//! `scraper::Html` is not `Send`, so parsing is kept synchronous and the
//! document never outlives the call.

use crate::{Result, ScrawlerError};
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use std::collections::HashSet;
use url::Url;

/// Paragraphs of this many bytes or fewer are dropped as noise
const MIN_PARAGRAPH_BYTES: usize = 20;

/// Signals extracted from one HTML page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Signals {
    /// The page URL (after redirects)
    pub url: String,

    /// The page title, empty if missing
    pub title: String,

    /// The meta description, empty if missing
    #[serde(skip_serializing_if = "String::is_empty")]
    pub meta_description: String,

    /// Text of h1-h6 elements in document order
    pub headings: Vec<String>,

    /// Distinct paragraph texts longer than 20 bytes
    pub paragraphs: Vec<String>,

    /// Distinct absolute http(s) links, fragments removed
    pub links: Vec<String>,
}

/// Parses HTML content and extracts signals
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` resolved against `page_url`
///
/// **Exclude:**
/// - `<a href="..." download>`
/// - `javascript:`, `mailto:`, `tel:` links and data URIs
/// - Fragment-only links (same page anchors)
/// - Anything that does not resolve to http or https
///
/// # Arguments
///
/// * `html` - The HTML content to parse
/// * `page_url` - The final URL of the page, used as the base for relative links
///
/// # Returns
///
/// * `Ok(Signals)` - Successfully parsed page
/// * `Err(ScrawlerError::ParseFailed)` - `page_url` cannot serve as a base
///
/// # Example
///
/// ```
/// use scrawler::crawler::parse_page;
/// use url::Url;
///
/// let html = r#"<html><head><title>Test</title></head><body><a href="/page#x">Link</a></body></html>"#;
/// let page_url = Url::parse("https://example.com/").unwrap();
/// let signals = parse_page(html, &page_url).unwrap();
/// assert_eq!(signals.title, "Test");
/// assert_eq!(signals.links, vec!["https://example.com/page".to_string()]);
/// ```
pub fn parse_page(html: &str, page_url: &Url) -> Result<Signals> {
    if page_url.cannot_be_a_base() {
        return Err(ScrawlerError::ParseFailed {
            url: page_url.to_string(),
            message: "URL cannot be used as a base for links".to_string(),
        });
    }

    let document = Html::parse_document(html);

    Ok(Signals {
        url: page_url.to_string(),
        title: extract_title(&document),
        meta_description: extract_meta_description(&document),
        headings: extract_headings(&document),
        paragraphs: extract_paragraphs(&document),
        links: extract_links(&document, page_url),
    })
}

/// Joins whitespace-separated words with single spaces
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> String {
    selector("title")
        .and_then(|sel| document.select(&sel).next().map(element_text))
        .unwrap_or_default()
}

fn extract_meta_description(document: &Html) -> String {
    for css in ["meta[name='description']", "meta[name='Description']"] {
        let Some(sel) = selector(css) else {
            continue;
        };
        let found = document
            .select(&sel)
            .next()
            .and_then(|el| el.value().attr("content"))
            .map(collapse_whitespace)
            .unwrap_or_default();
        if !found.is_empty() {
            return found;
        }
    }
    String::new()
}

fn extract_headings(document: &Html) -> Vec<String> {
    let Some(sel) = selector("h1, h2, h3, h4, h5, h6") else {
        return Vec::new();
    };
    document
        .select(&sel)
        .map(element_text)
        .filter(|text| !text.is_empty())
        .collect()
}

fn extract_paragraphs(document: &Html) -> Vec<String> {
    let Some(sel) = selector("p") else {
        return Vec::new();
    };
    let mut seen = HashSet::new();
    document
        .select(&sel)
        .map(element_text)
        .filter(|text| text.len() > MIN_PARAGRAPH_BYTES)
        .filter(|text| seen.insert(text.clone()))
        .collect()
}

/// Extracts all valid links from the HTML document
fn extract_links(document: &Html, base_url: &Url) -> Vec<String> {
    let Some(sel) = selector("a[href]") else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for element in document.select(&sel) {
        // Skip if it has the download attribute
        if element.value().attr("download").is_some() {
            continue;
        }

        let Some(href) = element.value().attr("href") else {
            continue;
        };

        if let Some(absolute_url) = resolve_link(href, base_url) {
            if seen.insert(absolute_url.clone()) {
                links.push(absolute_url);
            }
        }
    }

    links
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
pub(crate) fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if ["javascript:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|scheme| lowered.starts_with(scheme))
    {
        return None;
    }

    let mut absolute_url = base_url.join(href).ok()?;
    if !matches!(absolute_url.scheme(), "http" | "https") {
        return None;
    }
    absolute_url.set_fragment(None);
    Some(absolute_url.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_url() -> Url {
        Url::parse("https://example.com/page").unwrap()
    }

    fn parse(html: &str) -> Signals {
        parse_page(html, &base_url()).unwrap()
    }

    #[test]
    fn test_extract_title_with_whitespace() {
        let signals = parse("<html><head><title>  Test \n  Page  </title></head></html>");
        assert_eq!(signals.title, "Test Page");
    }

    #[test]
    fn test_no_title() {
        let signals = parse("<html><head></head><body></body></html>");
        assert_eq!(signals.title, "");
    }

    #[test]
    fn test_meta_description_fallback() {
        let lower = parse(r#"<html><head><meta name="description" content=" lower  case "></head></html>"#);
        assert_eq!(lower.meta_description, "lower case");

        let upper = parse(r#"<html><head><meta name="Description" content="Upper"></head></html>"#);
        assert_eq!(upper.meta_description, "Upper");

        let none = parse("<html><head></head></html>");
        assert!(none.meta_description.is_empty());
    }

    #[test]
    fn test_headings_in_document_order() {
        let html = r#"<body><h2>Second level</h2><h1>Top</h1><h6> deep </h6><h3></h3></body>"#;
        let signals = parse(html);
        assert_eq!(signals.headings, vec!["Second level", "Top", "deep"]);
    }

    #[test]
    fn test_paragraphs_filtered_and_deduplicated() {
        let html = r#"<body>
            <p>short one</p>
            <p>exactly twenty bytes</p>
            <p>This paragraph is comfortably long.</p>
            <p>This   paragraph is
               comfortably long.</p>
            <p>Another sufficiently long paragraph.</p>
        </body>"#;
        let signals = parse(html);
        assert_eq!(
            signals.paragraphs,
            vec![
                "This paragraph is comfortably long.",
                "Another sufficiently long paragraph."
            ]
        );
    }

    #[test]
    fn test_extract_relative_link() {
        let signals = parse(r#"<a href="/other">Link</a><a href="sibling">Sib</a>"#);
        assert_eq!(
            signals.links,
            vec!["https://example.com/other", "https://example.com/sibling"]
        );
    }

    #[test]
    fn test_links_strip_fragment_and_deduplicate() {
        let html = r#"<a href="/a#one">1</a><a href="/a#two">2</a><a href="/a">3</a>"#;
        let signals = parse(html);
        assert_eq!(signals.links, vec!["https://example.com/a"]);
    }

    #[test]
    fn test_skip_non_http_links() {
        let html = r##"
            <a href="javascript:void(0)">js</a>
            <a href="mailto:test@example.com">mail</a>
            <a href="tel:+1234567890">tel</a>
            <a href="data:text/html,x">data</a>
            <a href="ftp://example.com/file">ftp</a>
            <a href="#section">jump</a>
            <a href="">empty</a>
            <a href="/file.pdf" download>dl</a>
            <a href="/kept">kept</a>
        "##;
        let signals = parse(html);
        assert_eq!(signals.links, vec!["https://example.com/kept"]);
    }

    #[test]
    fn test_links_resolve_against_given_url() {
        let final_url = Url::parse("https://example.com/docs/intro/").unwrap();
        let signals = parse_page(r#"<a href="next">n</a>"#, &final_url).unwrap();
        assert_eq!(signals.links, vec!["https://example.com/docs/intro/next"]);
    }

    #[test]
    fn test_cannot_be_base_is_parse_failure() {
        let url = Url::parse("mailto:someone@example.com").unwrap();
        assert!(matches!(
            parse_page("<html></html>", &url),
            Err(ScrawlerError::ParseFailed { .. })
        ));
    }

    #[test]
    fn test_serialized_signals_omit_empty_description() {
        let signals = parse("<title>T</title>");
        let json = serde_json::to_value(&signals).unwrap();
        assert!(json.get("meta_description").is_none());
        assert_eq!(json["title"], "T");
        assert!(json["links"].as_array().unwrap().is_empty());
    }
}
