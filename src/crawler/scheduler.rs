//! Crawl state: frontier, visited sets, limits and text aggregation
//!
//! This module handles:
//! - The FIFO frontier of pages waiting to be fetched
//! - Page and document deduplication
//! - Depth, scope and count limits
//! - Building the aggregated `[PAGE:<url>]` text buffer
//!
//! All state lives in one [`CrawlState`] owned by a single crawl call, so
//! independent crawls never share anything.

use crate::config::{Config, CrawlerConfig};
use crate::crawler::fetcher::{DiscoveredLink, PageContent};
use crate::documents::DocumentOutcome;
use crate::url::{in_scope, same_origin, LinkKind};
use std::collections::{HashSet, VecDeque};
use url::Url;

/// Count and scope limits for one crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlLimits {
    /// Maximum number of pages fetched
    pub page_limit: usize,

    /// Maximum number of documents scheduled
    pub document_limit: usize,

    /// Scope substring; `None` uses the start URL's path
    pub path_must_contain: Option<String>,
}

impl CrawlLimits {
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            page_limit: config.page_limit,
            document_limit: config.document_limit,
            path_must_contain: config.path_must_contain.clone(),
        }
    }
}

impl Default for CrawlLimits {
    fn default() -> Self {
        Self::from_config(&CrawlerConfig::default())
    }
}

/// A page waiting in the frontier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    pub url: Url,
    pub depth: u32,

    /// Page the link was found on; `None` for the start URL
    pub parent: Option<String>,
}

/// A page that was fetched during the crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitedPage {
    pub url: String,
    pub depth: u32,
    pub parent: Option<String>,
    pub title: Option<String>,

    /// Length of the extracted main text, in characters
    pub text_chars: usize,
}

/// Everything one crawl produced
#[derive(Debug, Clone, Default)]
pub struct CrawlResult {
    /// `[PAGE:<url>]` and `[DOCUMENT:<url>]` blocks separated by blank lines
    pub aggregated_text: String,

    /// Fetched pages in visit order
    pub pages: Vec<VisitedPage>,

    /// Unique document links in discovery order
    pub discovered_documents: Vec<DiscoveredLink>,

    /// One outcome per discovered document, once documents were processed
    pub document_outcomes: Vec<DocumentOutcome>,
}

impl CrawlResult {
    /// Appends a tagged text block to the aggregated buffer
    pub fn append_block(&mut self, tag: &str, url: &str, text: &str) {
        if !self.aggregated_text.is_empty() {
            self.aggregated_text.push_str("\n\n");
        }
        self.aggregated_text
            .push_str(&format!("[{}:{}]\n{}", tag, url, text));
    }

    /// Appends the text of every extracted document, in discovery order
    pub fn append_document_texts(&mut self) {
        let blocks: Vec<(String, String)> = self
            .document_outcomes
            .iter()
            .filter_map(|outcome| {
                outcome
                    .text()
                    .map(|text| (outcome.link.url.to_string(), text.to_string()))
            })
            .collect();

        for (url, text) in blocks {
            self.append_block("DOCUMENT", &url, &text);
        }
    }

    pub fn successful_documents(&self) -> usize {
        self.document_outcomes
            .iter()
            .filter(|o| o.is_success())
            .count()
    }
}

/// Mutable state of a single breadth-first crawl
#[derive(Debug)]
pub struct CrawlState {
    root: Url,
    scope: String,
    max_depth: u32,
    limits: CrawlLimits,
    require_document_scope: bool,
    min_text_chars: usize,

    frontier: VecDeque<FrontierEntry>,
    /// Pages fetched or enqueued
    seen_pages: HashSet<String>,
    visited: Vec<VisitedPage>,
    seen_documents: HashSet<String>,
    documents: Vec<DiscoveredLink>,
    result: CrawlResult,
}

impl CrawlState {
    /// Creates the state for a crawl rooted at `root`, seeding the frontier
    pub fn new(root: Url, max_depth: u32, limits: CrawlLimits, config: &Config) -> Self {
        let scope = limits
            .path_must_contain
            .as_deref()
            .map(|s| s.trim().to_lowercase())
            .unwrap_or_else(|| root.path().to_lowercase());

        let mut seen_pages = HashSet::new();
        seen_pages.insert(root.to_string());

        let mut frontier = VecDeque::new();
        frontier.push_back(FrontierEntry {
            url: root.clone(),
            depth: 0,
            parent: None,
        });

        Self {
            root,
            scope,
            max_depth,
            limits,
            require_document_scope: config.documents.require_scope,
            min_text_chars: config.crawler.min_page_text_chars,
            frontier,
            seen_pages,
            visited: Vec::new(),
            seen_documents: HashSet::new(),
            documents: Vec::new(),
            result: CrawlResult::default(),
        }
    }

    /// The lowercase scope substring in effect
    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    pub fn queued_count(&self) -> usize {
        self.frontier.len()
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    /// Dequeues the next page to fetch, or `None` when the crawl is over
    ///
    /// Stops once the page limit is reached. Entries past the depth limit or
    /// outside the scope are dropped.
    pub fn next_entry(&mut self) -> Option<FrontierEntry> {
        while self.visited.len() < self.limits.page_limit {
            let entry = self.frontier.pop_front()?;

            if entry.depth > self.max_depth {
                tracing::debug!("Skipping {}: depth {} over limit", entry.url, entry.depth);
                continue;
            }

            if !in_scope(&entry.url, &self.scope) {
                tracing::debug!("Skipping {}: outside scope '{}'", entry.url, self.scope);
                continue;
            }

            return Some(entry);
        }

        None
    }

    /// Records a fetched page and aggregates its text
    pub fn record_visit(&mut self, entry: &FrontierEntry, content: &PageContent) {
        let text_chars = content.text.chars().count();

        self.visited.push(VisitedPage {
            url: entry.url.to_string(),
            depth: entry.depth,
            parent: entry.parent.clone(),
            title: content.title.clone(),
            text_chars,
        });

        if text_chars > self.min_text_chars {
            self.result
                .append_block("PAGE", entry.url.as_str(), &content.text);
        } else {
            tracing::debug!("Not aggregating {}: only {} chars", entry.url, text_chars);
        }
    }

    /// Sorts the links of a visited page into the frontier and document list
    pub fn triage(&mut self, entry: &FrontierEntry, links: &[DiscoveredLink]) {
        for link in links {
            if !same_origin(&link.url, &self.root) {
                continue;
            }

            match link.kind {
                LinkKind::Document => self.add_document(entry, link),
                LinkKind::Page => self.enqueue_page(entry, link),
            }
        }
    }

    fn add_document(&mut self, entry: &FrontierEntry, link: &DiscoveredLink) {
        if self.require_document_scope && !in_scope(&link.url, &self.scope) {
            tracing::debug!("Skipping document {}: outside scope", link.url);
            return;
        }

        if self.documents.len() >= self.limits.document_limit {
            return;
        }

        if !self.seen_documents.insert(link.url.to_string()) {
            return;
        }

        tracing::debug!("Discovered document {}", link.url);
        let mut link = link.clone();
        if link.referer.is_none() {
            link.referer = Some(entry.url.to_string());
        }
        self.documents.push(link);
    }

    fn enqueue_page(&mut self, entry: &FrontierEntry, link: &DiscoveredLink) {
        let depth = entry.depth + 1;
        if depth > self.max_depth {
            return;
        }

        if !in_scope(&link.url, &self.scope) {
            return;
        }

        if self.visited.len() + self.frontier.len() >= self.limits.page_limit {
            return;
        }

        if !self.seen_pages.insert(link.url.to_string()) {
            return;
        }

        self.frontier.push_back(FrontierEntry {
            url: link.url.clone(),
            depth,
            parent: Some(entry.url.to_string()),
        });
    }

    /// Consumes the state into the crawl result
    pub fn finish(self) -> CrawlResult {
        CrawlResult {
            pages: self.visited,
            discovered_documents: self.documents,
            ..self.result
        }
    }
}
