//! Page-capped PDF text extraction

use crate::crawler::collapse_whitespace;
use crate::ExtractError;
use lopdf::Document;

/// Extracts text from the first `page_cap` pages of a PDF
///
/// Each page becomes a `[PAGE n]` block (1-based) with whitespace collapsed;
/// blocks are separated by a blank line. Pages past the cap are never read.
/// Pages without text are left out; a page whose text cannot be decoded is
/// logged and left out too.
///
/// # Errors
///
/// Returns [`ExtractError::Load`] if the bytes are not a readable PDF.
pub fn extract_text(bytes: &[u8], page_cap: usize) -> Result<String, ExtractError> {
    let document = Document::load_mem(bytes).map_err(|e| ExtractError::Load(e.to_string()))?;
    let pages = document.get_pages();

    if pages.len() > page_cap {
        tracing::debug!(
            "Document has {} pages, extracting the first {}",
            pages.len(),
            page_cap
        );
    }

    let mut blocks = Vec::new();
    for page_number in pages.keys().take(page_cap) {
        match document.extract_text(&[*page_number]) {
            Ok(text) => {
                let text = collapse_whitespace(&text);
                if text.is_empty() {
                    tracing::debug!("Page {} has no text", page_number);
                    continue;
                }
                blocks.push(format!("[PAGE {}]\n{}", page_number, text));
            }
            Err(e) => {
                tracing::warn!("Skipping unreadable page {}: {}", page_number, e);
            }
        }
    }

    Ok(blocks.join("\n\n"))
}
