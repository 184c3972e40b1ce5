//! HTML link extraction
//!
//! Collects the links a crawl may follow from <a>, <area> tags and canonical
//! links, resolved to absolute http(s) URLs.

use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

static ANCHOR_SELECTOR: Lazy<Selector> = Lazy::new(|| parse_selector("a[href], area[href]"));
static CANONICAL_SELECTOR: Lazy<Selector> =
    Lazy::new(|| parse_selector("link[rel='canonical'][href]"));
static BASE_SELECTOR: Lazy<Selector> = Lazy::new(|| parse_selector("base[href]"));

fn parse_selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector is valid")
}

/// Extracts the distinct absolute link targets of an HTML document
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` and `<area href="...">` tags
/// - `<link rel="canonical" href="...">`
///
/// **Exclude:**
/// - `<a href="..." download>`
/// - `javascript:`, `mailto:`, `tel:` links and data URIs
/// - Fragment-only links (same page anchors)
/// - Anything that does not resolve to an http or https URL
///
/// Relative links resolve against `<base href>` when the document has one,
/// otherwise against `base_url`. Malformed links are dropped silently.
/// Links come back in document order without duplicates.
///
/// # Example
///
/// ```
/// use mail_ripple::crawler::extract_links;
/// use url::Url;
///
/// let html = r#"<html><body><a href="/page">Link</a><a href="/page">Again</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// assert_eq!(extract_links(html, &base_url), vec!["https://example.com/page".to_string()]);
/// ```
pub fn extract_links(html: &str, base_url: &Url) -> Vec<String> {
    let document = Html::parse_document(html);
    collect_links(&document, base_url)
}

fn collect_links(document: &Html, page_url: &Url) -> Vec<String> {
    let base_url = document
        .select(&BASE_SELECTOR)
        .next()
        .and_then(|element| element.value().attr("href"))
        .and_then(|href| page_url.join(href.trim()).ok())
        .unwrap_or_else(|| page_url.clone());

    let anchors = document
        .select(&ANCHOR_SELECTOR)
        .filter(|element| element.value().attr("download").is_none())
        .filter_map(|element| element.value().attr("href"));
    let canonical = document
        .select(&CANONICAL_SELECTOR)
        .filter_map(|element| element.value().attr("href"));

    let mut seen = HashSet::new();
    anchors
        .chain(canonical)
        .filter_map(|href| resolve_link(href, &base_url))
        .filter(|link| seen.insert(link.clone()))
        .collect()
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
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
        "http" | "https" if absolute_url.host_str().is_some() => Some(absolute_url.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_url() -> Url {
        Url::parse("https://example.com/dir/page").unwrap()
    }

    #[test]
    fn test_extract_absolute_link() {
        let html = r#"<html><body><a href="https://other.com/page">Link</a></body></html>"#;
        let links = extract_links(html, &base_url());
        assert_eq!(links, vec!["https://other.com/page"]);
    }

    #[test]
    fn test_extract_root_relative_link() {
        let html = r#"<html><body><a href="/other">Link</a></body></html>"#;
        let links = extract_links(html, &base_url());
        assert_eq!(links, vec!["https://example.com/other"]);
    }

    #[test]
    fn test_extract_path_relative_link() {
        let html = r#"<html><body><a href="other">Link</a><a href="../up">Up</a></body></html>"#;
        let links = extract_links(html, &base_url());
        assert_eq!(
            links,
            vec!["https://example.com/dir/other", "https://example.com/up"]
        );
    }

    #[test]
    fn test_base_tag_overrides_page_url() {
        let html = r#"<html><head><base href="https://cdn.example.com/docs/"></head>
            <body><a href="intro">Intro</a></body></html>"#;
        let links = extract_links(html, &base_url());
        assert_eq!(links, vec!["https://cdn.example.com/docs/intro"]);
    }

    #[test]
    fn test_skip_non_http_schemes() {
        let html = r#"<html><body>
            <a href="javascript:void(0)">JS</a>
            <a href="JavaScript:alert(1)">JS</a>
            <a href="mailto:test@example.com">Email</a>
            <a href="tel:+1234567890">Call</a>
            <a href="data:text/html,<h1>Test</h1>">Data</a>
            <a href="ftp://files.example.com/file">FTP</a>
            </body></html>"#;
        assert!(extract_links(html, &base_url()).is_empty());
    }

    #[test]
    fn test_skip_download_link() {
        let html = r#"<html><body><a href="/file.pdf" download>Download</a></body></html>"#;
        assert!(extract_links(html, &base_url()).is_empty());
    }

    #[test]
    fn test_skip_fragment_only() {
        let html = r##"<html><body><a href="#section">Jump</a></body></html>"##;
        assert!(extract_links(html, &base_url()).is_empty());
    }

    #[test]
    fn test_skip_malformed_link() {
        let html = r#"<html><body><a href="http://[::1">Broken</a><a href="/ok">Ok</a></body></html>"#;
        let links = extract_links(html, &base_url());
        assert_eq!(links, vec!["https://example.com/ok"]);
    }

    #[test]
    fn test_area_and_canonical_links() {
        let html = r#"<html><head><link rel="canonical" href="https://example.com/canonical" /></head>
            <body><map><area href="/map-target"></map></body></html>"#;
        let links = extract_links(html, &base_url());
        assert!(links.contains(&"https://example.com/map-target".to_string()));
        assert!(links.contains(&"https://example.com/canonical".to_string()));
    }

    #[test]
    fn test_duplicate_links_collapsed() {
        let html = r#"<html><body>
            <a href="/page1">One</a>
            <a href="https://example.com/page1">One again</a>
            <a href="/page2">Two</a>
            </body></html>"#;
        let links = extract_links(html, &base_url());
        assert_eq!(
            links,
            vec!["https://example.com/page1", "https://example.com/page2"]
        );
    }

    #[test]
    fn test_follow_nofollow_links() {
        let html = r#"<html><body><a href="/page" rel="nofollow">Link</a></body></html>"#;
        assert_eq!(extract_links(html, &base_url()).len(), 1);
    }

    #[test]
    fn test_plain_text_has_no_links() {
        assert!(extract_links("contact: info@example.com", &base_url()).is_empty());
    }
}
