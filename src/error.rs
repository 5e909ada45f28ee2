//! Error types for the pdf2deck library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`Pdf2DeckError`] — **Fatal**: the conversion cannot proceed at all
//!   (bad input file, wrong password, no pages, provider not configured,
//!   serializer failure). Returned as `Err(Pdf2DeckError)` from the top-level
//!   `analyze`/`convert` functions.
//!
//! * [`AnalysisError`] — **Recovered**: the layout-inference call for a single
//!   page failed (network error, timeout, response that violates the layout
//!   schema). It is returned by the adapter boundary and converted by the
//!   batch orchestrator into the whole-page fallback layout — a single image
//!   element covering the canvas — so one bad page degrades to a picture
//!   instead of halting the run.
//!
//! The granularity rule is deliberate and applied consistently: transport- and
//! schema-level failures degrade the *whole page* via [`AnalysisError`];
//! value-level oddities inside a schema-valid response (unknown enum string,
//! missing style field) are defaulted *per field* during
//! [`crate::layout`] normalization and never surface as errors at all.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pdf2deck library.
///
/// Per-page inference failures use [`AnalysisError`] and are absorbed by the
/// orchestrator rather than propagated here.
#[derive(Debug, Error)]
pub enum Pdf2DeckError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'")]
    DownloadTimeout { url: String, secs: u64 },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// The page selection matched nothing, or the document has no pages.
    ///
    /// There is nothing to analyze or compose, so the pipeline aborts before
    /// any inference call is issued.
    #[error("No pages to convert (document has {total} pages)")]
    EmptyDocument { total: usize },

    /// pdfium returned an error for a specific page.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    // ── Provider errors ───────────────────────────────────────────────────
    /// The configured VLM provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    // ── Writer errors ─────────────────────────────────────────────────────
    /// The external presentation serializer failed. Terminal for the run:
    /// there is no partial-success output file.
    #[error("Presentation writer failed: {detail}")]
    WriterFailed { detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A recoverable failure of the layout-inference call for one page.
///
/// Returned as `Err` by [`crate::pipeline::analyze::analyze_page`] so the
/// fallback path in the orchestrator is an explicit, testable branch rather
/// than exception interception. Never propagated past the page boundary.
#[derive(Debug, Clone, Error)]
pub enum AnalysisError {
    /// The VLM API call failed after all retries.
    #[error("page {page}: inference failed after {retries} retries: {detail}")]
    Api {
        page: usize,
        retries: u32,
        detail: String,
    },

    /// The response arrived but does not match the layout schema.
    #[error("page {page}: response violates layout schema: {detail}")]
    Schema { page: usize, detail: String },

    /// The call exceeded the per-call deadline.
    #[error("page {page}: inference timed out after {secs}s")]
    Timeout { page: usize, secs: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_display() {
        let e = Pdf2DeckError::EmptyDocument { total: 0 };
        assert!(e.to_string().contains("0 pages"));
    }

    #[test]
    fn writer_failed_display() {
        let e = Pdf2DeckError::WriterFailed {
            detail: "zip central directory".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("writer failed"), "got: {msg}");
        assert!(msg.contains("zip central directory"));
    }

    #[test]
    fn analysis_timeout_display() {
        let e = AnalysisError::Timeout { page: 4, secs: 60 };
        assert!(e.to_string().contains("page 4"));
        assert!(e.to_string().contains("60s"));
    }

    #[test]
    fn analysis_schema_display() {
        let e = AnalysisError::Schema {
            page: 1,
            detail: "missing field `elements`".into(),
        };
        assert!(e.to_string().contains("layout schema"));
    }
}
