//! URL-shape repairs and fallbacks for document downloads
//!
//! Document links on the target sites are often wrong in small ways: double
//! percent-encoding, casing that differs from the stored file, spaces where the
//! server expects hyphens, or relative paths that only resolve through a
//! repository endpoint. The functions here produce the alternative shapes the
//! retriever walks through after a 404.

use crate::config::RepositoryRewrite;
use percent_encoding::percent_decode_str;
use std::collections::HashSet;
use url::Url;

/// Collapses double-encoded spaces and slashes (`%2520` → `%20`, `%252F` → `%2F`)
///
/// # Example
///
/// ```
/// use scoped_harvest::documents::repair_double_encoding;
///
/// assert_eq!(
///     repair_double_encoding("https://example.com/My%2520Card%252Fterms.pdf"),
///     "https://example.com/My%20Card%2Fterms.pdf"
/// );
/// ```
pub fn repair_double_encoding(url: &str) -> String {
    url.replace("%2520", "%20")
        .replace("%252F", "%2F")
        .replace("%252f", "%2F")
}

/// Fallback shapes in priority order, starting with `url` itself
///
/// 1. The URL as given
/// 2. Repository rewrite, when configured and the path matches its prefix
/// 3. Whole path lowercased
/// 4. Directory segments lowercased, filename case preserved
/// 5. Segments slugified (whitespace/underscores → hyphens, lowercase)
///
/// Shapes identical to an earlier one are dropped.
pub fn candidate_urls(url: &Url, repository: Option<&RepositoryRewrite>) -> Vec<Url> {
    let candidates = [
        Some(url.clone()),
        repository.and_then(|repo| repository_url(url, repo)),
        rewrite_segments(url, |_, segment| segment.to_lowercase()),
        rewrite_segments(url, |is_last, segment| {
            if is_last {
                segment.to_string()
            } else {
                segment.to_lowercase()
            }
        }),
        rewrite_segments(url, |_, segment| slugify(segment)),
    ];

    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .flatten()
        .filter(|candidate| seen.insert(candidate.as_str().to_string()))
        .collect()
}

/// Builds `<repository-url>?<param>=<decoded path>` for eligible paths
pub fn repository_url(url: &Url, repo: &RepositoryRewrite) -> Option<Url> {
    let mut target = Url::parse(&repo.repository_url).ok()?;

    // Already in repository form
    if url.host_str() == target.host_str() && url.path().starts_with(target.path()) {
        return None;
    }

    let decoded_path = percent_decode_str(url.path()).decode_utf8_lossy();
    if !decoded_path.starts_with(&repo.path_prefix) {
        return None;
    }

    target
        .query_pairs_mut()
        .clear()
        .append_pair(&repo.query_param, &decoded_path);
    Some(target)
}

/// Lowercases a segment and turns whitespace/underscore runs into single hyphens
pub fn slugify(segment: &str) -> String {
    let mut slug = String::with_capacity(segment.len());
    let mut last_was_hyphen = false;

    for c in segment.chars() {
        if c.is_whitespace() || c == '_' || c == '-' {
            if !last_was_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            last_was_hyphen = true;
        } else {
            slug.extend(c.to_lowercase());
            last_was_hyphen = false;
        }
    }

    slug.trim_end_matches('-').to_string()
}

/// Applies `transform(is_last, decoded_segment)` to every path segment
fn rewrite_segments<F>(url: &Url, transform: F) -> Option<Url>
where
    F: Fn(bool, &str) -> String,
{
    let segments: Vec<String> = url
        .path_segments()?
        .map(|s| percent_decode_str(s).decode_utf8_lossy().into_owned())
        .collect();
    let last = segments.len().saturating_sub(1);

    let rewritten: Vec<String> = segments
        .iter()
        .enumerate()
        .map(|(i, segment)| transform(i == last, segment))
        .collect();

    let mut out = url.clone();
    out.path_segments_mut()
        .ok()?
        .clear()
        .extend(rewritten.iter().map(String::as_str));
    Some(out)
}
