//! HTML link extraction
//!
//! Pulls `a[href]` targets out of a fetched page and resolves them to
//! absolute URLs against the page's own URL.

use scraper::{Html, Selector};
use url::Url;

/// Link-extraction capability used by the crawl engine.
pub trait LinkExtractor: Send + Sync {
    /// Returns the absolute URL of every hyperlink in `body`, resolved
    /// against `base_url`. Non-navigational and unresolvable hrefs are
    /// dropped silently.
    fn extract_links(&self, body: &str, base_url: &Url) -> Vec<String>;
}

/// Extractor backed by the `scraper` HTML parser.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlLinkExtractor;

impl LinkExtractor for HtmlLinkExtractor {
    fn extract_links(&self, body: &str, base_url: &Url) -> Vec<String> {
        let document = Html::parse_document(body);
        let mut links = Vec::new();

        if let Ok(selector) = Selector::parse("a[href]") {
            for element in document.select(&selector) {
                if let Some(href) = element.value().attr("href") {
                    if let Some(absolute) = resolve_href(href, base_url) {
                        links.push(absolute);
                    }
                }
            }
        }

        links
    }
}

/// Resolves an href against the page URL.
///
/// Returns None for targets the crawler never follows:
/// - `javascript:`, `mailto:`, `tel:`, `data:` schemes
/// - fragment-only anchors (same-page jumps)
/// - hrefs that fail to resolve, or resolve to a non-HTTP(S) URL
fn resolve_href(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    for scheme in ["javascript:", "mailto:", "tel:", "data:"] {
        if href.starts_with(scheme) {
            return None;
        }
    }

    let absolute = base_url.join(href).ok()?;
    match absolute.scheme() {
        "http" | "https" => Some(absolute.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_url() -> Url {
        Url::parse("https://example.com/page").unwrap()
    }

    fn extract(html: &str) -> Vec<String> {
        HtmlLinkExtractor.extract_links(html, &base_url())
    }

    #[test]
    fn test_extract_absolute_link() {
        let links = extract(r#"<html><body><a href="https://other.com/page">Link</a></body></html>"#);
        assert_eq!(links, vec!["https://other.com/page"]);
    }

    #[test]
    fn test_extract_relative_link() {
        let links = extract(r#"<html><body><a href="/other">Link</a></body></html>"#);
        assert_eq!(links, vec!["https://example.com/other"]);
    }

    #[test]
    fn test_extract_relative_path_link() {
        let links = extract(r#"<html><body><a href="other">Link</a></body></html>"#);
        assert_eq!(links, vec!["https://example.com/other"]);
    }

    #[test]
    fn test_skip_javascript_link() {
        let links = extract(r#"<html><body><a href="javascript:void(0)">Link</a></body></html>"#);
        assert!(links.is_empty());
    }

    #[test]
    fn test_skip_mailto_and_tel() {
        let links = extract(
            r#"<html><body>
            <a href="mailto:test@example.com">Email</a>
            <a href="tel:+1234567890">Call</a>
            </body></html>"#,
        );
        assert!(links.is_empty());
    }

    #[test]
    fn test_skip_data_uri() {
        let links = extract(r#"<html><body><a href="data:text/html,<h1>x</h1>">Data</a></body></html>"#);
        assert!(links.is_empty());
    }

    #[test]
    fn test_skip_fragment_only() {
        let links = extract(r##"<html><body><a href="#section">Jump</a></body></html>"##);
        assert!(links.is_empty());
    }

    #[test]
    fn test_multiple_links_in_document_order() {
        let links = extract(
            r#"<html><body>
            <a href="/page1">Link 1</a>
            <a href="/page2">Link 2</a>
            <a href="https://other.com/page3">Link 3</a>
            </body></html>"#,
        );
        assert_eq!(
            links,
            vec![
                "https://example.com/page1",
                "https://example.com/page2",
                "https://other.com/page3",
            ]
        );
    }

    #[test]
    fn test_mixed_valid_and_invalid_links() {
        let links = extract(
            r#"<html><body>
            <a href="/valid">Valid</a>
            <a href="javascript:alert('no')">Invalid</a>
            <a href="/another-valid">Valid</a>
            </body></html>"#,
        );
        assert_eq!(links.len(), 2);
    }

    #[test]
    fn test_anchor_without_href_ignored() {
        let links = extract(r#"<html><body><a name="top">Anchor</a></body></html>"#);
        assert!(links.is_empty());
    }

    #[test]
    fn test_malformed_html_still_yields_links() {
        // scraper is lenient; a missing closing tag must not drop the link.
        let links = extract(r#"<html><body><a href="/page">Link<p>text</body>"#);
        assert_eq!(links, vec!["https://example.com/page"]);
    }
}
