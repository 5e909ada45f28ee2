//! Output types returned by the top-level entry points.

use crate::compose::ImageAsset;
use crate::layout::SlideLayout;
use serde::{Deserialize, Serialize};

/// Result of the analysis half of the pipeline: one Layout Model per selected
/// page, in strict ascending `page_index` order with no gaps or duplicates.
///
/// This is the seam for the optional human-editing step: mutate `layouts`
/// freely, then hand them to [`crate::compose_deck`] or
/// [`crate::convert`]-style composition. Once composition begins the layouts
/// are treated as immutable.
#[derive(Debug)]
pub struct AnalysisOutput {
    /// Ordered Layout Models, `layouts[i].page_index == i`-th selected page.
    pub layouts: Vec<SlideLayout>,
    /// Document metadata extracted from the PDF.
    pub metadata: DocumentMetadata,
    /// Timing and degradation counters for the run.
    pub stats: DeckStats,
}

/// Result of a full conversion: the serialized presentation plus the cropped
/// image byproducts composition derived along the way.
#[derive(Debug)]
pub struct ConversionOutput {
    /// Opaque bytes from the [`crate::writer::PresentationWriter`].
    pub presentation: Vec<u8>,
    /// Derived `{name, bytes}` image byproducts, for external persistence.
    pub assets: Vec<ImageAsset>,
    /// The layouts the deck was composed from (post-fallback, pre-edit).
    pub layouts: Vec<SlideLayout>,
    pub metadata: DocumentMetadata,
    pub stats: DeckStats,
}

/// Counters and timings for one pipeline run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeckStats {
    /// Pages in the source document.
    pub total_pages: usize,
    /// Pages analyzed in this run (after page selection).
    pub analyzed_pages: usize,
    /// Pages that degraded to the whole-image fallback layout.
    pub fallback_pages: usize,
    /// Image byproducts derived during composition.
    pub derived_assets: usize,
    pub total_duration_ms: u64,
    pub render_duration_ms: u64,
    pub analysis_duration_ms: u64,
    pub compose_duration_ms: u64,
}

/// Document metadata extracted from the PDF.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub creation_date: Option<String>,
    pub modification_date: Option<String>,
    pub page_count: usize,
    pub pdf_version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_default_is_zeroed() {
        let s = DeckStats::default();
        assert_eq!(s.total_pages, 0);
        assert_eq!(s.fallback_pages, 0);
    }

    #[test]
    fn stats_round_trip_json() {
        let s = DeckStats {
            total_pages: 7,
            analyzed_pages: 7,
            fallback_pages: 1,
            derived_assets: 3,
            total_duration_ms: 1200,
            render_duration_ms: 100,
            analysis_duration_ms: 1000,
            compose_duration_ms: 100,
        };
        let json = serde_json::to_string(&s).unwrap();
        let back: DeckStats = serde_json::from_str(&json).unwrap();
        assert_eq!(back.fallback_pages, 1);
        assert_eq!(back.derived_assets, 3);
    }
}
