//! Document text extraction for uploaded resumes.
//!
//! `pdf-extract` is synchronous and CPU-bound; callers go through `extract_text_blocking`,
//! which runs the extractor inside `tokio::task::spawn_blocking`.

use std::sync::Arc;

use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, warn};

const PDF_MAGIC: &[u8] = b"%PDF-";

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("uploaded file is not a PDF")]
    NotPdf,

    #[error("PDF could not be read: {0}")]
    Unreadable(String),

    #[error("PDF contains no extractable text (scanned or image-only?)")]
    NoText,
}

/// Turns an uploaded document into plain text.
pub trait DocumentExtractor: Send + Sync {
    fn extract_text(&self, bytes: &[u8]) -> Result<String, DocumentError>;
}

/// `pdf-extract` backed extractor.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfExtractor;

impl DocumentExtractor for PdfExtractor {
    fn extract_text(&self, bytes: &[u8]) -> Result<String, DocumentError> {
        if !bytes.starts_with(PDF_MAGIC) {
            return Err(DocumentError::NotPdf);
        }

        // pdf-extract panics on some malformed inputs instead of returning an error.
        let extracted = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes))
            .map_err(|_| DocumentError::Unreadable("parser panicked".to_string()))?
            .map_err(|e| DocumentError::Unreadable(e.to_string()))?;

        let text = normalize_text(&extracted);
        if text.is_empty() {
            return Err(DocumentError::NoText);
        }
        debug!("Extracted {} chars of resume text", text.len());
        Ok(text)
    }
}

/// Runs `extractor` on the blocking pool.
pub async fn extract_text_blocking(
    extractor: Arc<dyn DocumentExtractor>,
    bytes: Bytes,
) -> Result<String, DocumentError> {
    tokio::task::spawn_blocking(move || extractor.extract_text(&bytes))
        .await
        .unwrap_or_else(|e| {
            warn!("document extraction task failed: {e}");
            Err(DocumentError::Unreadable(e.to_string()))
        })
}

/// Trims trailing whitespace per line and collapses runs of blank lines.
fn normalize_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut blank_run = 0;
    for line in raw.lines().map(str::trim_end) {
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push_str(line);
        out.push('\n');
    }
    out.trim().to_string()
}
