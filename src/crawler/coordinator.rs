//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that ties the pieces together:
//! - Validating and canonicalizing the start URL
//! - Driving the frontier owned by a per-crawl [`CrawlState`]
//! - Fetching pages with a fixed delay between requests
//! - Handing discovered documents to the batched document processor

use crate::config::Config;
use crate::crawler::fetcher::{build_http_client, PageFetcher};
use crate::crawler::scheduler::{CrawlLimits, CrawlResult, CrawlState};
use crate::documents::DocumentProcessor;
use crate::url::{normalize_url, DocumentMatcher, PathHint};
use crate::HarvestError;
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// Main crawler coordinator structure
///
/// A coordinator holds only immutable configuration and the shared HTTP
/// client; every crawl builds its own state, so one coordinator can run
/// several crawls concurrently.
pub struct Coordinator {
    config: Arc<Config>,
    fetcher: PageFetcher,
    documents: DocumentProcessor,
    request_delay: Duration,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The harvest configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(HarvestError)` - The HTTP client could not be built
    pub fn new(config: Config) -> Result<Self, HarvestError> {
        let client = build_http_client(&config.http)?;

        Ok(Self {
            fetcher: PageFetcher::new(client.clone(), &config),
            documents: DocumentProcessor::new(client, &config),
            request_delay: Duration::from_millis(config.crawler.request_delay_ms),
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Crawls the scoped subtree below `start_url`
    ///
    /// Pages are fetched one at a time in breadth-first order. Page failures
    /// are logged and skipped; only a malformed start URL is an error.
    /// Discovered documents are listed in the result but not downloaded.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use scoped_harvest::{Config, Coordinator, CrawlLimits};
    ///
    /// # async fn example() -> Result<(), scoped_harvest::HarvestError> {
    /// let coordinator = Coordinator::new(Config::default())?;
    /// let result = coordinator
    ///     .crawl("https://example.com/cards/x", 2, &CrawlLimits::default())
    ///     .await?;
    /// println!("{} pages, {} documents", result.pages.len(), result.discovered_documents.len());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn crawl(
        &self,
        start_url: &str,
        max_depth: u32,
        limits: &CrawlLimits,
    ) -> Result<CrawlResult, HarvestError> {
        let root = self.parse_start_url(start_url)?;
        let hint = PathHint::from_root(&root);
        let mut state = CrawlState::new(root.clone(), max_depth, limits.clone(), &self.config);

        tracing::info!(
            "Starting crawl of {} (max depth {}, page limit {}, document limit {}, scope '{}')",
            root,
            max_depth,
            limits.page_limit,
            limits.document_limit,
            state.scope()
        );

        let start_time = Instant::now();
        let mut first = true;

        while let Some(entry) = state.next_entry() {
            if !first && !self.request_delay.is_zero() {
                tokio::time::sleep(self.request_delay).await;
            }
            first = false;

            tracing::debug!("Visiting {} (depth {})", entry.url, entry.depth);
            let content = self.fetcher.fetch_page(&entry.url, &hint).await;

            state.record_visit(&entry, &content);
            state.triage(&entry, &content.links);

            tracing::info!(
                "Progress: {} pages visited, {} queued, {} documents",
                state.visited_count(),
                state.queued_count(),
                state.document_count()
            );
        }

        let result = state.finish();
        tracing::info!(
            "Crawl completed: {} pages, {} documents in {:?}",
            result.pages.len(),
            result.discovered_documents.len(),
            start_time.elapsed()
        );

        Ok(result)
    }

    /// Crawls, then downloads and extracts every discovered document
    ///
    /// Document texts are appended to the aggregated text as
    /// `[DOCUMENT:<url>]` blocks in discovery order, after all page blocks.
    pub async fn harvest(
        &self,
        start_url: &str,
        max_depth: u32,
        limits: &CrawlLimits,
    ) -> Result<CrawlResult, HarvestError> {
        let mut result = self.crawl(start_url, max_depth, limits).await?;
        self.process_documents(&mut result).await;
        Ok(result)
    }

    /// Fills `document_outcomes` and appends extracted texts
    pub async fn process_documents(&self, result: &mut CrawlResult) {
        result.document_outcomes = self
            .documents
            .process_all(result.discovered_documents.clone())
            .await;
        result.append_document_texts();

        tracing::info!(
            "Documents: {} of {} extracted",
            result.successful_documents(),
            result.document_outcomes.len()
        );
    }

    /// Validates and canonicalizes the start URL
    fn parse_start_url(&self, start_url: &str) -> Result<Url, HarvestError> {
        let invalid = || HarvestError::InvalidStartUrl {
            url: start_url.to_string(),
        };

        let parsed = Url::parse(start_url.trim()).map_err(|_| invalid())?;
        let matcher = DocumentMatcher::from_config(&self.config.documents);

        normalize_url(
            parsed.as_str(),
            &parsed,
            self.config.documents.keep_query,
            &matcher,
        )
        .ok_or_else(invalid)
    }
}
