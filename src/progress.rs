//! Progress-callback trait for chunk-level analysis events.
//!
//! Inject an [`Arc<dyn AnalysisProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events as the orchestrator works through the page chunks.
//!
//! # Why chunk boundaries, not per-call events?
//!
//! The orchestrator waits for each whole chunk before starting the next, so
//! the chunk boundary is the only point where a monotonically increasing
//! "pages processed" number exists. Calls within a chunk settle in arbitrary
//! order; reporting them individually would produce a counter that jumps
//! around. `on_chunk_complete(processed, total)` is therefore the only
//! externally observable intermediate state of a run.
//!
//! The callback approach (rather than channels) is the least-invasive
//! integration point: callers can forward events to a broadcast channel, a
//! WebSocket, or a terminal progress bar without the library knowing anything
//! about how the host application communicates.

use std::sync::Arc;

/// Called by the batch orchestrator as analysis progresses.
///
/// Implementations must be `Send + Sync`. All methods have default no-op
/// implementations so callers only override what they care about.
///
/// Every method is invoked from the single orchestrating task: fallbacks are
/// reported when their chunk settles, between the concurrent calls, so
/// implementations never see interleaved invocations.
pub trait AnalysisProgressCallback: Send + Sync {
    /// Called once before the first chunk is issued.
    ///
    /// # Arguments
    /// * `total_pages` — number of pages that will be analyzed
    fn on_analysis_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called after each chunk settles.
    ///
    /// # Arguments
    /// * `processed`   — pages completed so far (`min(chunk_end, total)`)
    /// * `total_pages` — total pages in the run
    fn on_chunk_complete(&self, processed: usize, total_pages: usize) {
        let _ = (processed, total_pages);
    }

    /// Called when a page's inference failed and the whole-page image
    /// fallback was substituted.
    ///
    /// # Arguments
    /// * `page_index` — 0-indexed page that degraded to the fallback
    /// * `error`      — human-readable cause
    fn on_page_fallback(&self, page_index: usize, error: &str) {
        let _ = (page_index, error);
    }

    /// Called once after the last chunk settles.
    ///
    /// # Arguments
    /// * `total_pages`    — total pages in the run
    /// * `fallback_count` — pages that degraded to the fallback layout
    fn on_analysis_complete(&self, total_pages: usize, fallback_count: usize) {
        let _ = (total_pages, fallback_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl AnalysisProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn AnalysisProgressCallback>;
