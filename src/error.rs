//! Error types for the markpdfdown library.
//!
//! Every error in this enum is **fatal**: the conversion cannot proceed and
//! no Markdown output is produced. Per-page transcription failures are
//! deliberately *not* represented here — an exhausted retry budget degrades
//! to an empty fragment for that page (see [`crate::pipeline::llm`]), so a
//! flaky model call on one page never costs the rest of the document.
//!
//! No component terminates the process itself. Errors propagate as
//! `Err(ConvertError)` up to the binary's `main`, the single boundary that
//! decides on exit behaviour.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the markpdfdown library.
#[derive(Debug, Error)]
pub enum ConvertError {
    // ── Configuration errors ─────────────────────────────────────────────
    /// No API key in the environment. Checked before any work begins.
    #[error("OPENAI_API_KEY is not set.\nExport it first: export OPENAI_API_KEY=sk-...")]
    MissingApiKey,

    // ── Input errors ─────────────────────────────────────────────────────
    /// A start/end page argument did not parse as an integer, or the
    /// resulting range is inverted.
    #[error("Invalid page number: '{value}'")]
    InvalidPageNumber { value: String },

    /// Neither the filename extension nor the leading bytes matched a
    /// recognised document type.
    #[error("Unsupported file type (not PDF, JPEG, PNG, or BMP)")]
    UnsupportedFormat,

    /// Standard input was selected but delivered no bytes.
    #[error("No input data received")]
    EmptyInput,

    /// Input file was not found or could not be read.
    #[error("Cannot read input file '{path}': {detail}")]
    UnreadableInput { path: PathBuf, detail: String },

    // ── Collaborator errors ──────────────────────────────────────────────
    /// The renderer rejected the document (corrupt, or a type it cannot
    /// handle).
    #[error("Invalid document: {detail}")]
    InvalidDocument { detail: String },

    /// The requested page range exceeds the document's page count.
    #[error("Page {page} is out of range (document has {total} pages)")]
    PageOutOfRange { page: u32, total: u32 },

    /// Rasterisation of a specific page failed.
    #[error("Rendering failed for page {page}: {detail}")]
    RenderFailed { page: u32, detail: String },

    // ── Completion errors ────────────────────────────────────────────────
    /// Transport or API-level failure from the chat-completion service.
    ///
    /// Surfaced unmodified by the client; the retry orchestrator decides
    /// whether to try again.
    #[error("API request failed: {message}")]
    Api { message: String },

    // ── I/O errors ───────────────────────────────────────────────────────
    /// Could not create or populate the per-run work area.
    #[error("Failed to prepare work directory '{path}': {source}")]
    WorkDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not write the output Markdown file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_out_of_range_display() {
        let e = ConvertError::PageOutOfRange { page: 12, total: 9 };
        let msg = e.to_string();
        assert!(msg.contains("Page 12"), "got: {msg}");
        assert!(msg.contains("9 pages"), "got: {msg}");
    }

    #[test]
    fn api_error_display() {
        let e = ConvertError::Api {
            message: "HTTP 503".into(),
        };
        assert!(e.to_string().contains("HTTP 503"));
    }

    #[test]
    fn invalid_page_number_display() {
        let e = ConvertError::InvalidPageNumber {
            value: "three".into(),
        };
        assert!(e.to_string().contains("'three'"));
    }
}
