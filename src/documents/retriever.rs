//! Document downloads with URL-shape fallbacks
//!
//! Each candidate shape from [`candidate_urls`] is tried in priority order.
//! Transient failures (timeouts, connection errors, 429, 5xx) are retried on the
//! same shape through the shared retry utility. A 404 moves on to the next
//! shape; any other terminal failure ends the download.

use crate::config::{Config, RepositoryRewrite};
use crate::crawler::{is_success_status, retry_with_backoff, FetchError, RetryPolicy};
use crate::documents::variants::{candidate_urls, repair_double_encoding};
use crate::DownloadError;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, ORIGIN, REFERER};
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// A successful download
#[derive(Debug, Clone)]
pub struct Downloaded {
    /// Raw response body
    pub bytes: Vec<u8>,

    /// The URL shape that answered
    pub source_url: Url,
}

/// Downloads documents with retries and URL-shape fallbacks
#[derive(Debug, Clone)]
pub struct DocumentRetriever {
    client: Client,
    timeout: Duration,
    retry: RetryPolicy,
    repository: Option<RepositoryRewrite>,
}

impl DocumentRetriever {
    /// Creates a retriever from configuration and a shared client
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            timeout: Duration::from_millis(config.http.document_timeout_ms),
            retry: RetryPolicy::from_config(&config.http),
            repository: config.documents.repository.clone(),
        }
    }

    /// Downloads a document's bytes
    ///
    /// # Arguments
    ///
    /// * `url` - Absolute document URL, possibly double-encoded
    /// * `referer` - Page the link was found on; the URL's origin is sent otherwise
    pub async fn download(&self, url: &str, referer: Option<&str>) -> Result<Vec<u8>, DownloadError> {
        self.fetch(url, referer).await.map(|d| d.bytes)
    }

    /// Like [`download`](Self::download), but also reports which shape answered
    pub async fn fetch(&self, url: &str, referer: Option<&str>) -> Result<Downloaded, DownloadError> {
        let repaired = repair_double_encoding(url.trim());
        let parsed =
            Url::parse(&repaired).map_err(|e| DownloadError::InvalidUrl(format!("{}: {}", url, e)))?;

        let mut tried = Vec::new();
        let mut last_error = String::new();

        for candidate in candidate_urls(&parsed, self.repository.as_ref()) {
            tried.push(candidate.to_string());
            let label = format!("GET {}", candidate);

            let result = retry_with_backoff(&self.retry, &label, FetchError::is_transient, |_| {
                self.fetch_bytes(&candidate, referer)
            })
            .await;

            match result {
                Ok(bytes) => {
                    if tried.len() > 1 {
                        tracing::info!("Downloaded {} via fallback {}", url, candidate);
                    }
                    tracing::debug!("Downloaded {} bytes from {}", bytes.len(), candidate);
                    return Ok(Downloaded {
                        bytes,
                        source_url: candidate,
                    });
                }
                Err(FetchError::NotFound) => {
                    tracing::debug!("404 for {}, trying next URL shape", candidate);
                    last_error = FetchError::NotFound.to_string();
                }
                Err(e) => {
                    last_error = e.to_string();
                    break;
                }
            }
        }

        tracing::warn!("Download failed for {}: {}", url, last_error);
        Err(DownloadError::Exhausted {
            url: url.to_string(),
            tried,
            last_error,
        })
    }

    /// One GET attempt for one URL shape
    async fn fetch_bytes(&self, url: &Url, referer: Option<&str>) -> Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .headers(document_headers(url, referer))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(FetchError::from_reqwest)?;

        let status = response.status();
        if !is_success_status(status) {
            return Err(FetchError::from_status(status));
        }

        let bytes = response.bytes().await.map_err(FetchError::from_reqwest)?;
        Ok(bytes.to_vec())
    }
}

/// Browser-like headers for a same-origin document request
fn document_headers(url: &Url, referer: Option<&str>) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("application/pdf,application/octet-stream;q=0.9,*/*;q=0.8"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert("sec-fetch-dest", HeaderValue::from_static("document"));
    headers.insert("sec-fetch-mode", HeaderValue::from_static("navigate"));
    headers.insert("sec-fetch-site", HeaderValue::from_static("same-origin"));

    let origin = url.origin().ascii_serialization();
    if let Ok(value) = HeaderValue::from_str(&origin) {
        headers.insert(ORIGIN, value);
    }

    let referer = referer.map(str::to_string).unwrap_or(origin);
    if let Ok(value) = HeaderValue::from_str(&referer) {
        headers.insert(REFERER, value);
    }

    headers
}
