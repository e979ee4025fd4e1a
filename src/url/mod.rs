//! URL handling module for Scoped-Harvest
//!
//! This module provides URL canonicalization, page/document classification,
//! origin checks, and the link relevance heuristic.

mod normalize;
mod relevance;

use crate::config::DocumentConfig;
use url::Url;

// Re-export main functions
pub use normalize::normalize_url;
pub use relevance::RelevanceFilter;

/// What a discovered link points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkKind {
    /// An HTML page that may be crawled further
    Page,
    /// A binary document (PDF) to download and extract
    Document,
}

/// Decides whether a URL points at a document
///
/// A URL is a document if its path ends in one of the configured extensions
/// (case-insensitive), or its lowercase path/query contains one of the
/// configured markers.
#[derive(Debug, Clone)]
pub struct DocumentMatcher {
    extensions: Vec<String>,
    markers: Vec<String>,
}

impl DocumentMatcher {
    /// Creates a matcher from lowercase-insensitive extension and marker lists
    pub fn new(extensions: &[String], markers: &[String]) -> Self {
        Self {
            extensions: extensions
                .iter()
                .map(|e| format!(".{}", e.trim_start_matches('.').to_lowercase()))
                .collect(),
            markers: markers.iter().map(|m| m.to_lowercase()).collect(),
        }
    }

    /// Builds the matcher described by the document configuration
    pub fn from_config(config: &DocumentConfig) -> Self {
        Self::new(&config.extensions, &config.markers)
    }

    /// Classifies a parsed URL
    pub fn classify(&self, url: &Url) -> LinkKind {
        let path = url.path().to_lowercase();

        if self.extensions.iter().any(|ext| path.ends_with(ext.as_str())) {
            return LinkKind::Document;
        }

        let query = url.query().unwrap_or("").to_lowercase();
        if self
            .markers
            .iter()
            .any(|marker| path.contains(marker.as_str()) || query.contains(marker.as_str()))
        {
            return LinkKind::Document;
        }

        LinkKind::Page
    }

    /// Convenience wrapper for `classify(url) == Document`
    pub fn is_document(&self, url: &Url) -> bool {
        self.classify(url) == LinkKind::Document
    }
}

impl Default for DocumentMatcher {
    fn default() -> Self {
        Self::from_config(&DocumentConfig::default())
    }
}

/// Returns true iff scheme, host and port of both URLs match exactly
///
/// # Examples
///
/// ```
/// use url::Url;
/// use scoped_harvest::url::same_origin;
///
/// let root = Url::parse("https://example.com/cards/x").unwrap();
/// assert!(same_origin(&Url::parse("https://example.com/other").unwrap(), &root));
/// assert!(!same_origin(&Url::parse("http://example.com/other").unwrap(), &root));
/// assert!(!same_origin(&Url::parse("https://cdn.example.com/a.pdf").unwrap(), &root));
/// ```
pub fn same_origin(url: &Url, root: &Url) -> bool {
    url.origin() == root.origin()
}

/// Returns true if the URL's lowercase path contains the scope substring
///
/// An empty scope matches everything.
pub fn in_scope(url: &Url, scope: &str) -> bool {
    scope.is_empty() || url.path().to_lowercase().contains(scope)
}

/// Path-derived hint describing the crawl root
///
/// Holds both the lowercase root path (`/cards/x`) and its dashed form
/// (`cards-x`), which some sites use in slugs of related pages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathHint {
    pub path: String,
    pub dashed: String,
}

impl PathHint {
    /// Derives the hint from the crawl root URL
    pub fn from_root(root: &Url) -> Self {
        let segments: Vec<String> = root
            .path()
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| s.to_lowercase())
            .collect();

        if segments.is_empty() {
            return Self::default();
        }

        Self {
            path: format!("/{}", segments.join("/")),
            dashed: segments.join("-"),
        }
    }

    /// True when the root is the site root, which gives no useful hint
    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_pdf_extension_is_document() {
        let matcher = DocumentMatcher::default();
        assert_eq!(
            matcher.classify(&url("https://example.com/cards/x/terms.pdf")),
            LinkKind::Document
        );
        assert_eq!(
            matcher.classify(&url("https://example.com/cards/x/TERMS.PDF")),
            LinkKind::Document
        );
    }

    #[test]
    fn test_marker_in_query_is_document() {
        let matcher = DocumentMatcher::default();
        assert!(matcher.is_document(&url(
            "https://example.com/content/bbp/repositories/abc/?path=%2Fcards%2Fmitc"
        )));
        assert!(matcher.is_document(&url("https://example.com/download?type=brochure")));
    }

    #[test]
    fn test_plain_page_is_page() {
        let matcher = DocumentMatcher::default();
        assert_eq!(
            matcher.classify(&url("https://example.com/cards/x/details")),
            LinkKind::Page
        );
    }

    #[test]
    fn test_custom_extensions() {
        let matcher = DocumentMatcher::new(&["docx".to_string()], &[]);
        assert!(matcher.is_document(&url("https://example.com/a/form.DOCX")));
        assert!(!matcher.is_document(&url("https://example.com/a/form.pdf")));
    }

    #[test]
    fn test_same_origin_port_mismatch() {
        let root = url("http://127.0.0.1:8080/cards");
        assert!(same_origin(&url("http://127.0.0.1:8080/x"), &root));
        assert!(!same_origin(&url("http://127.0.0.1:9090/x"), &root));
    }

    #[test]
    fn test_default_port_is_same_origin() {
        assert!(same_origin(
            &url("https://example.com:443/a"),
            &url("https://example.com/b")
        ));
    }

    #[test]
    fn test_in_scope() {
        let page = url("https://example.com/Cards/X/Details");
        assert!(in_scope(&page, "/cards/x"));
        assert!(!in_scope(&page, "/loans"));
        assert!(in_scope(&page, ""));
    }

    #[test]
    fn test_path_hint() {
        let hint = PathHint::from_root(&url("https://example.com/Cards/Diners-Privilege/"));
        assert_eq!(hint.path, "/cards/diners-privilege");
        assert_eq!(hint.dashed, "cards-diners-privilege");

        assert!(PathHint::from_root(&url("https://example.com/")).is_empty());
    }
}
