//! Markdown summary generation
//!
//! This module generates a human-readable markdown summary of one harvest:
//! the pages visited, the documents found and what happened to each of them.

use crate::crawler::{CrawlResult, VisitedPage};
use crate::documents::DocumentStatus;
use crate::output::OutputResult;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// One document row of the summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRow {
    pub url: String,
    pub referer: Option<String>,
    /// `None` when documents were not processed
    pub status: Option<DocumentStatus>,
}

/// Everything the markdown summary reports
#[derive(Debug, Clone)]
pub struct HarvestSummary {
    pub start_url: String,
    pub generated_at: String,
    pub config_hash: Option<String>,
    pub pages: Vec<VisitedPage>,
    pub documents: Vec<DocumentRow>,
    pub aggregated_chars: usize,
}

impl HarvestSummary {
    /// Builds the summary of a crawl result, timestamped now
    pub fn from_result(result: &CrawlResult, start_url: &str, config_hash: Option<&str>) -> Self {
        let documents = result
            .discovered_documents
            .iter()
            .enumerate()
            .map(|(i, link)| DocumentRow {
                url: link.url.to_string(),
                referer: link.referer.clone(),
                status: result.document_outcomes.get(i).map(|o| o.status.clone()),
            })
            .collect();

        Self {
            start_url: start_url.to_string(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            config_hash: config_hash.map(str::to_string),
            pages: result.pages.clone(),
            documents,
            aggregated_chars: result.aggregated_text.chars().count(),
        }
    }

    pub fn extracted_documents(&self) -> usize {
        self.documents
            .iter()
            .filter(|d| matches!(d.status, Some(DocumentStatus::Extracted { .. })))
            .count()
    }

    pub fn failed_documents(&self) -> usize {
        self.documents
            .iter()
            .filter(|d| {
                matches!(
                    d.status,
                    Some(DocumentStatus::DownloadFailed(_) | DocumentStatus::ExtractionFailed(_))
                )
            })
            .count()
    }
}

/// Writes the markdown summary to `output_path`
pub fn generate_markdown_summary(summary: &HarvestSummary, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_summary(summary);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a harvest summary as markdown
pub fn format_markdown_summary(summary: &HarvestSummary) -> String {
    let mut md = String::new();

    md.push_str("# Scoped-Harvest Summary\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Start URL**: {}\n", summary.start_url));
    md.push_str(&format!("- **Generated**: {}\n", summary.generated_at));
    if let Some(hash) = &summary.config_hash {
        md.push_str(&format!("- **Config Hash**: {}\n", hash));
    }
    md.push('\n');

    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!("- **Pages Visited**: {}\n", summary.pages.len()));
    md.push_str(&format!(
        "- **Documents Discovered**: {}\n",
        summary.documents.len()
    ));
    md.push_str(&format!(
        "- **Documents Extracted**: {}\n",
        summary.extracted_documents()
    ));
    md.push_str(&format!(
        "- **Documents Failed**: {}\n",
        summary.failed_documents()
    ));
    md.push_str(&format!(
        "- **Aggregated Text**: {} characters\n\n",
        summary.aggregated_chars
    ));

    md.push_str("## Pages\n\n");
    if summary.pages.is_empty() {
        md.push_str("No pages were visited.\n\n");
    } else {
        md.push_str("| # | Depth | URL | Text Chars |\n");
        md.push_str("|---|-------|-----|------------|\n");
        for (i, page) in summary.pages.iter().enumerate() {
            md.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                i + 1,
                page.depth,
                page.url,
                page.text_chars
            ));
        }
        md.push('\n');
    }

    md.push_str("## Documents\n\n");
    if summary.documents.is_empty() {
        md.push_str("No documents were discovered.\n\n");
    } else {
        md.push_str("| # | URL | Status |\n");
        md.push_str("|---|-----|--------|\n");
        for (i, doc) in summary.documents.iter().enumerate() {
            md.push_str(&format!(
                "| {} | {} | {} |\n",
                i + 1,
                doc.url,
                status_label(doc.status.as_ref())
            ));
        }
        md.push('\n');
    }

    // Failures with their reasons
    let failures: Vec<(&str, &str)> = summary
        .documents
        .iter()
        .filter_map(|doc| match &doc.status {
            Some(DocumentStatus::DownloadFailed(reason))
            | Some(DocumentStatus::ExtractionFailed(reason)) => Some((doc.url.as_str(), reason.as_str())),
            _ => None,
        })
        .collect();

    if !failures.is_empty() {
        md.push_str("## Failures\n\n");
        for (url, reason) in failures {
            md.push_str(&format!("- `{}`: {}\n", url, reason));
        }
        md.push('\n');
    }

    md.push_str("---\n\n");
    md.push_str("*Generated by Scoped-Harvest*\n");

    md
}

fn status_label(status: Option<&DocumentStatus>) -> String {
    match status {
        None => "not processed".to_string(),
        Some(DocumentStatus::Extracted { bytes, text, .. }) => {
            format!("extracted ({} bytes, {} chars)", bytes, text.chars().count())
        }
        Some(DocumentStatus::DownloadFailed(_)) => "download failed".to_string(),
        Some(DocumentStatus::ExtractionFailed(_)) => "extraction failed".to_string(),
    }
}
