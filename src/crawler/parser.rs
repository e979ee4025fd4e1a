//! HTML parser for extracting main-content text and anchors
//!
//! This module handles parsing fetched HTML to extract:
//! - The page title (from the `<title>` tag)
//! - Main-content text with navigation, scripts and banners left out
//! - Every anchor in DOM order with its visible text
//! - The `<base href>` used to resolve relative links

use crate::config::PageConfig;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;

/// Extracted information from an HTML page
#[derive(Debug, Clone, Default)]
pub struct ParsedPage {
    /// The page title (from `<title>`)
    pub title: Option<String>,

    /// Main-content text, whitespace collapsed
    pub text: String,

    /// Anchors in DOM order, hrefs not yet resolved
    pub anchors: Vec<RawAnchor>,

    /// Value of `<base href>`, if the page declares one
    pub base_href: Option<String>,
}

/// An `<a href>` as it appears in the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAnchor {
    pub href: String,
    pub text: String,
}

/// Compiled text extraction rules
#[derive(Debug, Clone)]
pub struct ContentRules {
    selectors: Vec<Selector>,
    min_content_chars: usize,
    noise_tags: HashSet<String>,
    noise_markers: Vec<String>,
}

impl ContentRules {
    /// Compiles the page configuration; selectors that fail to parse are skipped
    pub fn from_config(config: &PageConfig) -> Self {
        let selectors = config
            .content_selectors
            .iter()
            .filter_map(|s| match Selector::parse(s) {
                Ok(selector) => Some(selector),
                Err(_) => {
                    tracing::warn!("Ignoring invalid content selector '{}'", s);
                    None
                }
            })
            .collect();

        Self {
            selectors,
            min_content_chars: config.min_content_chars,
            noise_tags: config.noise_tags.iter().map(|t| t.to_lowercase()).collect(),
            noise_markers: config
                .noise_markers
                .iter()
                .map(|m| m.to_lowercase())
                .collect(),
        }
    }

    /// Returns true if the element and its subtree carry no content
    fn is_noise(&self, element: &ElementRef) -> bool {
        let value = element.value();
        let name = value.name();

        if self.noise_tags.contains(name) {
            return true;
        }

        // A marker class on <body> (e.g. "modal-open") must not blank the page
        if name == "html" || name == "body" {
            return false;
        }

        let class_and_id = format!(
            "{} {}",
            value.attr("class").unwrap_or(""),
            value.attr("id").unwrap_or("")
        )
        .to_lowercase();

        self.noise_markers
            .iter()
            .any(|marker| class_and_id.contains(marker.as_str()))
    }
}

impl Default for ContentRules {
    fn default() -> Self {
        Self::from_config(&PageConfig::default())
    }
}

/// Parses HTML content and extracts text, anchors and metadata
///
/// # Text Extraction Rules
///
/// 1. Try each main-content selector in order; within a selector, the first
///    matching element whose text is longer than `min_content_chars` wins
/// 2. If no selector qualifies, use the whole `<body>`
/// 3. Noise subtrees (scripts, styles, nav, banners, popups...) never contribute
///
/// # Example
///
/// ```
/// use scoped_harvest::crawler::{parse_html, ContentRules};
///
/// let html = r#"<html><head><title>Card</title></head>
///     <body><nav>Menu</nav><p>Annual fee: 2,500</p><a href="/fees">Fees</a></body></html>"#;
/// let parsed = parse_html(html, &ContentRules::default());
/// assert_eq!(parsed.title.as_deref(), Some("Card"));
/// assert_eq!(parsed.text, "Annual fee: 2,500 Fees");
/// assert_eq!(parsed.anchors[0].href, "/fees");
/// ```
pub fn parse_html(html: &str, rules: &ContentRules) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        title: extract_title(&document),
        text: extract_main_text(&document, rules),
        anchors: extract_anchors(&document),
        base_href: extract_base_href(&document),
    }
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| collapse_whitespace(&element.text().collect::<String>()))
        .filter(|s| !s.is_empty())
}

/// Picks the main-content text following the selector priority list
fn extract_main_text(document: &Html, rules: &ContentRules) -> String {
    for selector in &rules.selectors {
        for element in document.select(selector) {
            let text = element_text(element, rules);
            if text.chars().count() > rules.min_content_chars {
                return text;
            }
        }
    }

    let body = Selector::parse("body")
        .ok()
        .and_then(|s| document.select(&s).next())
        .unwrap_or_else(|| document.root_element());

    element_text(body, rules)
}

/// Collects an element's text, skipping noise subtrees
fn element_text(element: ElementRef, rules: &ContentRules) -> String {
    let mut raw = String::new();
    collect_text(element, rules, &mut raw);
    collapse_whitespace(&raw)
}

fn collect_text(element: ElementRef, rules: &ContentRules, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                out.push_str(text);
                out.push(' ');
            }
            Node::Element(_) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    if !rules.is_noise(&child_element) {
                        collect_text(child_element, rules, out);
                    }
                }
            }
            _ => {}
        }
    }
}

/// Extracts every anchor with an href, in DOM order
fn extract_anchors(document: &Html) -> Vec<RawAnchor> {
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| {
            let href = element.value().attr("href")?.trim();
            if href.is_empty() || href.starts_with('#') {
                return None;
            }

            let mut text = collapse_whitespace(&element.text().collect::<String>());
            if text.is_empty() {
                text = element
                    .value()
                    .attr("title")
                    .or_else(|| element.value().attr("aria-label"))
                    .map(collapse_whitespace)
                    .unwrap_or_default();
            }

            Some(RawAnchor {
                href: href.to_string(),
                text,
            })
        })
        .collect()
}

fn extract_base_href(document: &Html) -> Option<String> {
    let selector = Selector::parse("base[href]").ok()?;
    document
        .select(&selector)
        .next()
        .and_then(|element| element.value().attr("href"))
        .map(|href| href.trim().to_string())
        .filter(|href| !href.is_empty())
}

/// Collapses runs of whitespace into single spaces and trims the ends
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
