use crate::url::{DocumentMatcher, LinkKind};
use url::Url;

/// Canonicalizes a raw link into the form used for crawling and deduplication
///
/// # Normalization Steps
///
/// 1. Resolve `raw` against `base`; reject if malformed or not HTTP(S)
/// 2. Remove fragment (everything after #)
/// 3. Classify as page or document
/// 4. Drop the query string, unless the URL is a document and
///    `keep_query_for_document` is set (some servers carry the real path in a
///    query parameter)
/// 5. For pages, remove trailing slashes from non-root paths
///
/// Step 5 reclassifies after step 4, so a URL that only looked like a document
/// because of its query is treated as a page once the query is gone. This keeps
/// the function idempotent.
///
/// # Returns
///
/// * `Some(Url)` - Canonical URL
/// * `None` - The input could not be resolved into an HTTP(S) URL
///
/// # Examples
///
/// ```
/// use scoped_harvest::url::{normalize_url, DocumentMatcher};
/// use url::Url;
///
/// let base = Url::parse("https://example.com/cards/x").unwrap();
/// let rules = DocumentMatcher::default();
///
/// let page = normalize_url("details/?tab=2#fees", &base, true, &rules).unwrap();
/// assert_eq!(page.as_str(), "https://example.com/cards/details");
///
/// let doc = normalize_url("/docs/mitc.pdf?v=3#p2", &base, true, &rules).unwrap();
/// assert_eq!(doc.as_str(), "https://example.com/docs/mitc.pdf?v=3");
/// ```
pub fn normalize_url(
    raw: &str,
    base: &Url,
    keep_query_for_document: bool,
    rules: &DocumentMatcher,
) -> Option<Url> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let mut url = base.join(raw).ok()?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }
    url.host_str()?;

    url.set_fragment(None);

    let kind = rules.classify(&url);
    if kind == LinkKind::Page || !keep_query_for_document {
        url.set_query(None);
    }

    if rules.classify(&url) == LinkKind::Page {
        let path = url.path();
        if path.len() > 1 && path.ends_with('/') {
            let trimmed = path.trim_end_matches('/');
            let trimmed = if trimmed.is_empty() { "/" } else { trimmed };
            let trimmed = trimmed.to_string();
            url.set_path(&trimmed);
        }
    }

    Some(url)
}
