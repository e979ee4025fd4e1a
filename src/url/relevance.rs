use crate::config::{CompoundRule, RelevanceConfig};
use crate::url::{DocumentMatcher, PathHint};
use url::Url;

/// Link relevance heuristic
///
/// The crawl is scoped to one product's informational subtree, so links are
/// accepted only when they look like they lead to terms, fees, benefits and
/// similar content. All term lists come from [`RelevanceConfig`].
#[derive(Debug, Clone)]
pub struct RelevanceFilter {
    keywords: Vec<String>,
    reject_markers: Vec<String>,
    compound: Vec<CompoundRule>,
}

impl RelevanceFilter {
    /// Builds a filter from configuration, lowercasing every term
    pub fn from_config(config: &RelevanceConfig) -> Self {
        Self {
            keywords: lowercase_all(&config.keywords),
            reject_markers: lowercase_all(&config.reject_markers),
            compound: config
                .compound
                .iter()
                .map(|rule| CompoundRule {
                    anchor: rule.anchor.to_lowercase(),
                    any_of: lowercase_all(&rule.any_of),
                })
                .collect(),
        }
    }

    /// Returns true if the link should be followed or downloaded
    ///
    /// # Decision Order
    ///
    /// 1. Reject markers in the URL or anchor text reject the link
    /// 2. Documents are always accepted
    /// 3. URLs whose path contains the root hint are accepted
    /// 4. Keywords in the anchor text or URL accept the link
    /// 5. Compound rules accept generic anchors paired with a qualifying term
    pub fn is_relevant(
        &self,
        url: &Url,
        anchor_text: &str,
        root_hint: &PathHint,
        documents: &DocumentMatcher,
    ) -> bool {
        let url_lower = url.as_str().to_lowercase();
        let text_lower = anchor_text.to_lowercase();

        if self.reject_markers.iter().any(|marker| {
            url_lower.contains(marker.as_str()) || text_lower.contains(marker.as_str())
        }) {
            return false;
        }

        if documents.is_document(url) {
            return true;
        }

        if !root_hint.is_empty() {
            let path = url.path().to_lowercase();
            if path.contains(&root_hint.path) || url_lower.contains(&root_hint.dashed) {
                return true;
            }
        }

        if self
            .keywords
            .iter()
            .any(|k| text_lower.contains(k.as_str()) || url_lower.contains(k.as_str()))
        {
            return true;
        }

        self.compound.iter().any(|rule| {
            text_lower.contains(&rule.anchor)
                && rule
                    .any_of
                    .iter()
                    .any(|t| text_lower.contains(t.as_str()) || url_lower.contains(t.as_str()))
        })
    }
}

impl Default for RelevanceFilter {
    fn default() -> Self {
        Self::from_config(&RelevanceConfig::default())
    }
}

fn lowercase_all(terms: &[String]) -> Vec<String> {
    terms.iter().map(|t| t.to_lowercase()).collect()
}
