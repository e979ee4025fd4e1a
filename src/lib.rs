//! Scoped-Harvest: a scoped crawl-and-ingest pipeline
//!
//! This crate walks one product page and its linked subtree on a single site,
//! downloads the PDFs it finds, and aggregates everything into plain text
//! ready for a downstream extraction stage.

pub mod batch;
pub mod config;
pub mod crawler;
pub mod documents;
pub mod extraction;
pub mod output;
pub mod url;

use std::time::Duration;
use thiserror::Error;

/// Main error type for Scoped-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid start URL: {url}")]
    InvalidStartUrl { url: String },

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Errors surfaced by the document retriever once every fallback is spent
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("Invalid document URL: {0}")]
    InvalidUrl(String),

    #[error("Download failed for {url} after trying {} URL shape(s): {last_error}", tried.len())]
    Exhausted {
        url: String,
        tried: Vec<String>,
        last_error: String,
    },
}

/// Errors from document text extraction
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Failed to load document: {0}")]
    Load(String),

    #[error("Extraction timed out for {url} after {after:?}")]
    Timeout { url: String, after: Duration },

    #[error("Extraction worker failed for {url}: {message}")]
    WorkerFailed { url: String, message: String },
}

/// Result type alias for Scoped-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Coordinator, CrawlLimits, CrawlResult};
pub use crate::url::{normalize_url, same_origin, LinkKind};
