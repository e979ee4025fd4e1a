//! Output module for persisting harvest results
//!
//! This module handles:
//! - Writing the aggregated text handed to the extraction stage
//! - Generating a markdown summary of pages, documents and failures

mod markdown;

pub use markdown::{
    format_markdown_summary, generate_markdown_summary, DocumentRow, HarvestSummary,
};

use crate::crawler::CrawlResult;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while writing output
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// File name of the aggregated text inside the output directory
pub const AGGREGATED_FILE: &str = "aggregated.txt";

/// File name of the markdown summary inside the output directory
pub const SUMMARY_FILE: &str = "summary.md";

/// Paths of the files written by [`write_result`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub aggregated: PathBuf,
    pub summary: PathBuf,
}

/// Writes the aggregated text and the markdown summary into `dir`
///
/// The directory is created if needed; existing files are overwritten.
///
/// # Arguments
///
/// * `result` - The crawl result to persist
/// * `start_url` - Start URL, recorded in the summary
/// * `config_hash` - Hash of the config file, if one was used
/// * `dir` - Output directory
pub fn write_result(
    result: &CrawlResult,
    start_url: &str,
    config_hash: Option<&str>,
    dir: &Path,
) -> OutputResult<OutputPaths> {
    if dir.exists() && !dir.is_dir() {
        return Err(OutputError::Write(format!(
            "{} exists and is not a directory",
            dir.display()
        )));
    }
    fs::create_dir_all(dir)?;

    let paths = OutputPaths {
        aggregated: dir.join(AGGREGATED_FILE),
        summary: dir.join(SUMMARY_FILE),
    };

    fs::write(&paths.aggregated, &result.aggregated_text)?;

    let summary = HarvestSummary::from_result(result, start_url, config_hash);
    generate_markdown_summary(&summary, &paths.summary)?;

    tracing::info!(
        "Wrote {} and {}",
        paths.aggregated.display(),
        paths.summary.display()
    );

    Ok(paths)
}
