//! Hand-off to the structured extraction stage
//!
//! The aggregated text is sent to an external extraction service (typically an
//! LLM) together with free-form instructions. The service's reply is treated as
//! an opaque payload: it is returned as-is and never parsed or repaired here.

use async_trait::async_trait;
use thiserror::Error;

/// Errors reported by an extraction client
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Extraction request failed: {0}")]
    Request(String),

    #[error("Extraction service returned an empty response")]
    EmptyResponse,
}

/// An external service turning aggregated text into structured output
#[async_trait]
pub trait ExtractionClient: Send + Sync {
    /// Sends one chunk of text and returns the raw payload
    async fn extract(&self, instructions: &str, text: &str) -> Result<String, ExtractionError>;
}

const BLOCK_HEADERS: [&str; 2] = ["[PAGE:", "[DOCUMENT:"];

/// Splits aggregated text into chunks of at most `budget` characters
///
/// Chunks break between `[PAGE:`/`[DOCUMENT:` blocks whenever possible; a block
/// larger than the budget is cut on character boundaries.
///
/// # Example
///
/// ```
/// use scoped_harvest::extraction::chunk_text;
///
/// let text = "[PAGE:https://a.example/x]\nfees\n\n[PAGE:https://a.example/y]\nrewards";
/// let chunks = chunk_text(text, 40);
/// assert_eq!(chunks.len(), 2);
/// assert!(chunks[1].starts_with("[PAGE:https://a.example/y]"));
/// ```
pub fn chunk_text(text: &str, budget: usize) -> Vec<String> {
    let budget = budget.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_chars = 0;

    for block in split_blocks(text) {
        let block_chars = block.chars().count();

        if block_chars > budget {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_chars = 0;
            }
            chunks.extend(split_chars(&block, budget));
            continue;
        }

        let joined_chars = if current.is_empty() {
            block_chars
        } else {
            current_chars + 2 + block_chars
        };

        if joined_chars > budget {
            chunks.push(std::mem::take(&mut current));
            current = block;
            current_chars = block_chars;
        } else {
            if !current.is_empty() {
                current.push_str("\n\n");
            }
            current.push_str(&block);
            current_chars = joined_chars;
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

/// Sends every chunk to `client`, one at a time
///
/// Returns one entry per chunk: the raw payload, or `None` if that request
/// failed. Failures are logged and never abort the remaining chunks.
pub async fn run_extraction<C>(
    client: &C,
    instructions: &str,
    text: &str,
    budget: usize,
) -> Vec<Option<String>>
where
    C: ExtractionClient + ?Sized,
{
    let chunks = chunk_text(text, budget);
    let mut payloads = Vec::with_capacity(chunks.len());

    for (index, chunk) in chunks.iter().enumerate() {
        match client.extract(instructions, chunk).await {
            Ok(payload) if payload.trim().is_empty() => {
                tracing::warn!(
                    "Chunk {}/{}: {}",
                    index + 1,
                    chunks.len(),
                    ExtractionError::EmptyResponse
                );
                payloads.push(None);
            }
            Ok(payload) => payloads.push(Some(payload)),
            Err(e) => {
                tracing::warn!("Chunk {}/{} failed: {}", index + 1, chunks.len(), e);
                payloads.push(None);
            }
        }
    }

    payloads
}

/// Groups `\n\n`-separated paragraphs into tagged blocks
fn split_blocks(text: &str) -> Vec<String> {
    let mut blocks: Vec<String> = Vec::new();

    for part in text.split("\n\n") {
        let starts_block = BLOCK_HEADERS.iter().any(|h| part.starts_with(h));
        match blocks.last_mut() {
            Some(last) if !starts_block => {
                last.push_str("\n\n");
                last.push_str(part);
            }
            _ => blocks.push(part.to_string()),
        }
    }

    blocks.retain(|b| !b.trim().is_empty());
    blocks
}

fn split_chars(text: &str, size: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars.chunks(size).map(|c| c.iter().collect()).collect()
}
