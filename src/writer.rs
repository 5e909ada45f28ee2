//! The presentation-writer boundary.
//!
//! Serializing composed slides into an actual presentation file (PPTX,
//! Keynote, ODP, …) is an external concern: this crate hands a writer fully
//! resolved, absolute-unit directives and never looks at the bytes it gets
//! back. The trait-object seam mirrors how the VLM provider is consumed —
//! an `Arc<dyn …>` the caller constructs and owns.
//!
//! The crate's guarantee at this boundary is determinism of the *inputs*:
//! for fixed layout data, the directive sequences and asset names a writer
//! receives are identical across runs. Whether the writer's own output is
//! byte-stable is the writer's business.

use crate::compose::{CanvasSize, ComposedSlide};

/// Serializes composed slides into an opaque presentation file.
///
/// Implementations receive every slide's background, its ordered directive
/// list (back-to-front; later directives render on top), and the canvas
/// dimensions the geometry was projected onto.
///
/// # Errors
/// A writer error is terminal for the whole run — there is no
/// partial-success output file. It surfaces to the caller as
/// [`crate::error::Pdf2DeckError::WriterFailed`].
pub trait PresentationWriter: Send + Sync {
    /// Serialize the deck and return the encoded file bytes.
    fn write_deck(
        &self,
        slides: &[ComposedSlide],
        canvas: CanvasSize,
    ) -> Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>>;
}
