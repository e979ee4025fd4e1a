//! HTTP page fetcher
//!
//! This module handles all page requests for the crawler, including:
//! - Building the shared HTTP client with a browser-like identity
//! - GET requests with navigation headers
//! - Retry logic for transient failures
//! - Error classification
//! - Turning one page into text plus classified links

use crate::config::{Config, HttpConfig};
use crate::crawler::parser::{parse_html, ContentRules};
use crate::crawler::retry::{retry_with_backoff, RetryPolicy};
use crate::url::{normalize_url, same_origin, DocumentMatcher, LinkKind, PathHint, RelevanceFilter};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::{redirect::Policy, Client, StatusCode};
use std::fmt;
use std::time::Duration;
use url::Url;

/// A link found on a page, already normalized and classified
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredLink {
    /// Canonical absolute URL
    pub url: Url,

    /// Page or document
    pub kind: LinkKind,

    /// Visible anchor text
    pub anchor_text: String,

    /// Page the link was found on (set for documents)
    pub referer: Option<String>,
}

/// Text and links of one fetched page
#[derive(Debug, Clone, Default)]
pub struct PageContent {
    /// Page title, if any
    pub title: Option<String>,

    /// Main-content text
    pub text: String,

    /// Relevant same-origin links in DOM order
    pub links: Vec<DiscoveredLink>,
}

impl PageContent {
    /// The degraded result of a failed fetch
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Failure of a single HTTP attempt
#[derive(Debug)]
pub enum FetchError {
    /// HTTP 404: the resource is absent, never retried
    NotFound,
    /// Any other status outside [200, 400)
    Status(u16),
    /// The request timed out
    Timeout,
    /// Connection, TLS, redirect or body errors
    Transport(String),
}

impl FetchError {
    /// Whether another attempt at the same URL may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            Self::NotFound => false,
            Self::Status(code) => *code == 429 || *code >= 500,
            Self::Timeout | Self::Transport(_) => true,
        }
    }

    /// Classifies a reqwest error
    pub fn from_reqwest(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else if let Some(status) = error.status() {
            Self::from_status(status)
        } else {
            Self::Transport(error.to_string())
        }
    }

    /// Classifies a non-success status code
    pub fn from_status(status: StatusCode) -> Self {
        if status == StatusCode::NOT_FOUND {
            Self::NotFound
        } else {
            Self::Status(status.as_u16())
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "HTTP 404"),
            Self::Status(code) => write!(f, "HTTP {}", code),
            Self::Timeout => write!(f, "request timeout"),
            Self::Transport(message) => write!(f, "{}", message),
        }
    }
}

/// Returns true for statuses treated as success: [200, 400)
pub fn is_success_status(status: StatusCode) -> bool {
    (200..400).contains(&status.as_u16())
}

/// Builds the HTTP client shared by the page fetcher and document retriever
///
/// Redirects are followed up to `max_redirects` hops. Per-request timeouts are
/// applied by the callers, since pages and documents use different budgets.
///
/// # Example
///
/// ```
/// use scoped_harvest::config::HttpConfig;
/// use scoped_harvest::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
        .redirect(Policy::limited(config.max_redirects))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Standard browser navigation headers
fn navigation_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        ),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert("upgrade-insecure-requests", HeaderValue::from_static("1"));
    headers
}

/// Fetches pages and turns them into text plus classified links
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | HTTP 404 | Immediate → empty result |
/// | HTTP 429 / 5xx | Retry with linear backoff |
/// | Timeout / connection error | Retry with linear backoff |
/// | Other 4xx | Immediate → empty result |
///
/// After the last attempt every failure degrades to [`PageContent::empty`].
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
    timeout: Duration,
    retry: RetryPolicy,
    content_rules: ContentRules,
    documents: DocumentMatcher,
    relevance: RelevanceFilter,
    keep_document_query: bool,
}

impl PageFetcher {
    /// Creates a fetcher from configuration and a shared client
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            timeout: Duration::from_millis(config.http.page_timeout_ms),
            retry: RetryPolicy::from_config(&config.http),
            content_rules: ContentRules::from_config(&config.page),
            documents: DocumentMatcher::from_config(&config.documents),
            relevance: RelevanceFilter::from_config(&config.relevance),
            keep_document_query: config.documents.keep_query,
        }
    }

    /// Fetches one page; never fails
    ///
    /// # Arguments
    ///
    /// * `url` - The page to fetch
    /// * `root_hint` - Path hint of the crawl root, used by the relevance filter
    pub async fn fetch_page(&self, url: &Url, root_hint: &PathHint) -> PageContent {
        let label = format!("GET {}", url);
        let result = retry_with_backoff(&self.retry, &label, FetchError::is_transient, |_| {
            self.fetch_html(url)
        })
        .await;

        match result {
            Ok((final_url, body)) => self.process_html(&body, url, &final_url, root_hint),
            Err(FetchError::NotFound) => {
                tracing::info!("Page not found: {}", url);
                PageContent::empty()
            }
            Err(e) => {
                tracing::warn!("Failed to fetch {}: {}", url, e);
                PageContent::empty()
            }
        }
    }

    /// One GET attempt returning the final URL and body
    async fn fetch_html(&self, url: &Url) -> Result<(Url, String), FetchError> {
        let response = self
            .client
            .get(url.clone())
            .headers(navigation_headers())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(FetchError::from_reqwest)?;

        let status = response.status();
        if !is_success_status(status) {
            return Err(FetchError::from_status(status));
        }

        let final_url = response.url().clone();
        let body = response.text().await.map_err(FetchError::from_reqwest)?;
        Ok((final_url, body))
    }

    /// Parses a fetched body into text and filtered links
    ///
    /// Links are resolved against `<base href>` when present, else the final
    /// URL after redirects; the origin check uses the requested page URL.
    pub fn process_html(
        &self,
        body: &str,
        page_url: &Url,
        final_url: &Url,
        root_hint: &PathHint,
    ) -> PageContent {
        let parsed = parse_html(body, &self.content_rules);

        let base = parsed
            .base_href
            .as_deref()
            .and_then(|href| final_url.join(href).ok())
            .unwrap_or_else(|| final_url.clone());

        let mut links = Vec::new();
        for anchor in &parsed.anchors {
            let Some(url) =
                normalize_url(&anchor.href, &base, self.keep_document_query, &self.documents)
            else {
                continue;
            };

            if !same_origin(&url, page_url) {
                continue;
            }

            if !self
                .relevance
                .is_relevant(&url, &anchor.text, root_hint, &self.documents)
            {
                tracing::trace!("Skipping irrelevant link {} ({:?})", url, anchor.text);
                continue;
            }

            let kind = self.documents.classify(&url);
            let referer = match kind {
                LinkKind::Document => Some(page_url.to_string()),
                LinkKind::Page => None,
            };

            links.push(DiscoveredLink {
                url,
                kind,
                anchor_text: anchor.text.clone(),
                referer,
            });
        }

        tracing::debug!(
            "Parsed {}: {} chars of text, {} relevant links",
            page_url,
            parsed.text.len(),
            links.len()
        );

        PageContent {
            title: parsed.title,
            text: parsed.text,
            links,
        }
    }
}
