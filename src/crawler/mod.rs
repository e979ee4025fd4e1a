//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with retry logic
//! - HTML parsing and link extraction
//! - Frontier, deduplication and limits
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod parser;
mod retry;
mod scheduler;

pub use coordinator::Coordinator;
pub use fetcher::{
    build_http_client, is_success_status, DiscoveredLink, FetchError, PageContent, PageFetcher,
};
pub use parser::{collapse_whitespace, parse_html, ContentRules, ParsedPage, RawAnchor};
pub use retry::{retry_with_backoff, RetryPolicy};
pub use scheduler::{CrawlLimits, CrawlResult, CrawlState, FrontierEntry, VisitedPage};

use crate::config::{validate, Config};
use crate::HarvestError;

/// Runs a complete harvest with limits taken from the configuration
///
/// This is the main entry point for library users. It will:
/// 1. Validate the configuration and build the HTTP client
/// 2. Crawl the scoped subtree below `start_url`
/// 3. Download and extract every discovered document
///
/// # Arguments
///
/// * `config` - The harvest configuration
/// * `start_url` - Product page the crawl starts from
///
/// # Returns
///
/// * `Ok(CrawlResult)` - Aggregated text plus per-page and per-document records
/// * `Err(HarvestError)` - The configuration was invalid, the start URL was
///   malformed, or the client failed
pub async fn harvest(config: Config, start_url: &str) -> Result<CrawlResult, HarvestError> {
    validate(&config)?;
    let max_depth = config.crawler.max_depth;
    let limits = CrawlLimits::from_config(&config.crawler);
    let coordinator = Coordinator::new(config)?;
    coordinator.harvest(start_url, max_depth, &limits).await
}
