//! The batch orchestrator: bounded-concurrency analysis with ordering recovery.
//!
//! ## Chunk barriers, not a worker pool
//!
//! Pages are processed in consecutive chunks of at most `batch_size`. All
//! calls in a chunk are issued concurrently and the orchestrator waits for
//! the *entire* chunk to settle before starting the next one. This bounds
//! in-flight calls to `batch_size` at all times and makes the chunk boundary
//! a natural progress checkpoint, at the accepted cost of not overlapping a
//! slow page in one chunk with the start of the next.
//!
//! ## Ordering
//!
//! Calls within a chunk settle in arbitrary order, so results are explicitly
//! re-sorted by `page_index` before being handed downstream. Page index is
//! the sole ordering key — never accumulation order.
//!
//! ## Failure isolation
//!
//! An adapter failure never crosses the page boundary: the failed page is
//! replaced by [`SlideLayout::fallback`] (a single whole-canvas image) and
//! the batch continues. Only upstream structural failures (no pages at all)
//! abort a run, and those never reach this module.
//!
//! The orchestrator is generic over the analysis function so these
//! guarantees are tested with stub adapters, without a provider in the loop.

use crate::error::AnalysisError;
use crate::layout::SlideLayout;
use crate::pipeline::encode::EncodedPage;
use crate::progress::AnalysisProgressCallback;
use futures::future::join_all;
use std::future::Future;
use std::sync::Arc;
use tracing::{info, warn};

/// Drive `analyze_fn` across all pages with bounded concurrency.
///
/// Returns the layouts sorted by ascending `page_index` (one per input page,
/// failed pages replaced by the fallback) and the number of pages that fell
/// back.
pub async fn run_batches<F, Fut>(
    pages: Vec<EncodedPage>,
    batch_size: usize,
    progress: Option<Arc<dyn AnalysisProgressCallback>>,
    analyze_fn: F,
) -> (Vec<SlideLayout>, usize)
where
    F: Fn(EncodedPage) -> Fut,
    Fut: Future<Output = Result<SlideLayout, AnalysisError>>,
{
    let total = pages.len();
    let batch_size = batch_size.max(1);
    let mut results: Vec<SlideLayout> = Vec::with_capacity(total);
    let mut fallback_count = 0usize;

    if let Some(cb) = progress.as_ref() {
        cb.on_analysis_start(total);
    }

    let mut remaining = pages.into_iter();
    loop {
        let chunk: Vec<EncodedPage> = remaining.by_ref().take(batch_size).collect();
        if chunk.is_empty() {
            break;
        }

        // Issue the whole chunk concurrently; the surrounding loop is the
        // barrier. Each future carries its page raster so the fallback can be
        // built without re-touching shared state.
        let settled = join_all(chunk.into_iter().map(|page| {
            let image = page.image.clone();
            let fut = analyze_fn(page);
            async move { (image, fut.await) }
        }))
        .await;

        for (image, outcome) in settled {
            match outcome {
                Ok(layout) => results.push(layout),
                Err(e) => {
                    warn!(
                        "page {}: inference failed, substituting whole-page fallback: {}",
                        image.index + 1,
                        e
                    );
                    if let Some(cb) = progress.as_ref() {
                        cb.on_page_fallback(image.index, &e.to_string());
                    }
                    fallback_count += 1;
                    results.push(SlideLayout::fallback(image));
                }
            }
        }

        if let Some(cb) = progress.as_ref() {
            cb.on_chunk_complete(results.len().min(total), total);
        }
    }

    // Fan-in order is chunk-completion order with arbitrary order inside each
    // chunk; page index alone restores the document order.
    results.sort_by_key(|l| l.page_index);
    debug_assert!(
        results.windows(2).all(|w| w[0].page_index < w[1].page_index),
        "duplicate or unsorted page indices after re-sort"
    );

    info!(
        "Analyzed {} pages ({} fallback)",
        results.len(),
        fallback_count
    );

    if let Some(cb) = progress.as_ref() {
        cb.on_analysis_complete(total, fallback_count);
    }

    (results, fallback_count)
}
