//! Configuration module for Scoped-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every field has a default, so an empty file yields a usable configuration.
//!
//! # Example
//!
//! ```no_run
//! use scoped_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    CompoundRule, Config, CrawlerConfig, DocumentConfig, HttpConfig, OutputConfig, PageConfig,
    RelevanceConfig, RepositoryRewrite,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
