//! PDF text extraction
//!
//! Text is pulled page by page with [`pdf_extract`], concatenated and cut to a
//! fixed character budget before it is embedded into prompts.
//!
//! `pdf_extract` can panic on malformed input instead of returning an error,
//! so the call is wrapped in [`std::panic::catch_unwind`].

use std::panic::{self, AssertUnwindSafe};

use tracing::debug;

use crate::error::ComparisonError;
use crate::request::UploadedPdf;

/// Extract up to `limit` characters of text from an uploaded PDF.
///
/// An absent upload yields an empty string. Pages without extractable text
/// contribute nothing.
pub fn extract_text(upload: Option<&UploadedPdf>, limit: usize) -> Result<String, ComparisonError> {
    let Some(upload) = upload else {
        return Ok(String::new());
    };

    let pages = extract_pages(&upload.data)?;
    let text: String = pages.concat();
    let truncated = truncate_chars(&text, limit);

    debug!(
        "Extracted {} pages ({} chars, kept {}) from '{}'",
        pages.len(),
        text.chars().count(),
        truncated.chars().count(),
        upload.file_name
    );

    Ok(truncated)
}

/// First `limit` characters of `text`, cut on a character boundary
pub fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}

fn extract_pages(data: &[u8]) -> Result<Vec<String>, ComparisonError> {
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(data)
    }));

    match result {
        Ok(Ok(pages)) => Ok(pages),
        Ok(Err(e)) => Err(ComparisonError::Extraction(format!(
            "Failed to read PDF: {}",
            e
        ))),
        Err(_) => Err(ComparisonError::Extraction(
            "Failed to read PDF: malformed document".into(),
        )),
    }
}
