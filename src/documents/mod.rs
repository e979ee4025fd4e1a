//! Document retrieval and text extraction
//!
//! This module turns discovered document links into text:
//! - Downloading bytes with browser headers, retries and URL-shape fallbacks
//! - Page-capped PDF text extraction on an isolated worker with a timeout
//! - Batched processing that keeps results in discovery order

mod extractor;
mod retriever;
mod variants;
mod worker;

pub use extractor::extract_text;
pub use retriever::{DocumentRetriever, Downloaded};
pub use variants::{candidate_urls, repair_double_encoding, repository_url, slugify};
pub use worker::{extract_isolated, ExtractionJob};

use crate::batch::run_batched;
use crate::config::Config;
use crate::crawler::DiscoveredLink;
use reqwest::Client;
use std::time::Duration;

/// What happened to one discovered document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentStatus {
    /// Downloaded and extracted
    Extracted {
        /// URL shape that answered the download
        source_url: String,
        /// Size of the downloaded file
        bytes: usize,
        /// Extracted `[PAGE n]` text
        text: String,
    },

    /// Every URL shape failed
    DownloadFailed(String),

    /// Downloaded, but text extraction failed or timed out
    ExtractionFailed(String),
}

/// One document link with its processing result
#[derive(Debug, Clone)]
pub struct DocumentOutcome {
    pub link: DiscoveredLink,
    pub status: DocumentStatus,
}

impl DocumentOutcome {
    /// Extracted text, if the document succeeded and produced any
    pub fn text(&self) -> Option<&str> {
        match &self.status {
            DocumentStatus::Extracted { text, .. } if !text.trim().is_empty() => Some(text),
            _ => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, DocumentStatus::Extracted { .. })
    }
}

/// Downloads and extracts documents in bounded-parallel batches
#[derive(Debug, Clone)]
pub struct DocumentProcessor {
    retriever: DocumentRetriever,
    page_cap: usize,
    extraction_timeout: Duration,
    concurrency: usize,
    pause: Duration,
}

impl DocumentProcessor {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            retriever: DocumentRetriever::new(client, config),
            page_cap: config.documents.page_cap,
            extraction_timeout: Duration::from_millis(config.documents.extraction_timeout_ms),
            concurrency: config.documents.concurrency,
            pause: Duration::from_millis(config.documents.batch_pause_ms),
        }
    }

    /// Downloads and extracts a single document; never fails
    pub async fn process_one(&self, link: &DiscoveredLink) -> DocumentStatus {
        let url = link.url.as_str();

        let downloaded = match self.retriever.fetch(url, link.referer.as_deref()).await {
            Ok(downloaded) => downloaded,
            Err(e) => return DocumentStatus::DownloadFailed(e.to_string()),
        };

        let job = ExtractionJob {
            url: url.to_string(),
            bytes: downloaded.bytes,
        };
        let bytes = job.bytes.len();

        match extract_isolated(job, self.page_cap, self.extraction_timeout).await {
            Ok(text) => {
                tracing::info!("Extracted {} chars from {}", text.len(), url);
                DocumentStatus::Extracted {
                    source_url: downloaded.source_url.to_string(),
                    bytes,
                    text,
                }
            }
            Err(e) => {
                tracing::warn!("Text extraction failed for {}: {}", url, e);
                DocumentStatus::ExtractionFailed(e.to_string())
            }
        }
    }

    /// Processes every link, returning outcomes in the same order as `links`
    pub async fn process_all(&self, links: Vec<DiscoveredLink>) -> Vec<DocumentOutcome> {
        if links.is_empty() {
            return Vec::new();
        }

        tracing::info!(
            "Processing {} documents ({} at a time)",
            links.len(),
            self.concurrency
        );

        run_batched(links, self.concurrency, self.pause, |_, link| async move {
            let status = self.process_one(&link).await;
            DocumentOutcome { link, status }
        })
        .await
    }
}
