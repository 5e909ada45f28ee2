//! # pdf2deck
//!
//! Reconstruct an editable slide deck from a flattened PDF using vision
//! language models.
//!
//! A PDF export of a presentation is a bag of positioned glyphs and images;
//! the structure (text boxes, shapes, stacking order) is gone. pdf2deck
//! renders each page to an image, asks a VLM to infer the page's layout as
//! typed elements with percentage geometry, then composes those layouts onto
//! an absolute slide canvas with cropped image assets ready for a
//! presentation serializer.
//!
//! ## Pipeline
//!
//! ```text
//! PDF (file / URL / bytes)
//!   │
//!   ▼
//! ┌─────────┐   ┌─────────┐   ┌─────────┐   ┌──────────────┐   ┌──────────┐
//! │  input   │──▶│ render  │──▶│ encode  │──▶│ batch+analyze │──▶│ compose  │
//! │ resolve  │   │ pdfium  │   │ PNG/b64 │   │  VLM layout   │   │ geometry │
//! └─────────┘   └─────────┘   └─────────┘   └──────────────┘   └──────────┘
//!                                                                    │
//!                                                                    ▼
//!                                                      PresentationWriter → bytes
//! ```
//!
//! Pages are analyzed in bounded chunks (`batch_size` concurrent calls, next
//! chunk only after the previous one settles) and re-sorted by page index, so
//! the output deck always matches the document order. A page whose inference
//! fails degrades to a single whole-page image slide; it never halts the run
//! and never goes missing from the deck.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdf2deck::{analyze, ConversionConfig};
//!
//! # async fn demo() -> Result<(), pdf2deck::Pdf2DeckError> {
//! let config = ConversionConfig::builder()
//!     .provider_name("openai")
//!     .model("gpt-4.1-mini")
//!     .build()?;
//!
//! let output = analyze("slides.pdf", &config).await?;
//! for layout in &output.layouts {
//!     println!("page {}: {} elements", layout.page_index + 1, layout.elements.len());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! To produce a serialized deck, plug in a [`PresentationWriter`]
//! implementation and call [`convert`]; to post-edit inferred layouts before
//! composition, call [`analyze`] then [`compose_deck`].

pub mod compose;
pub mod config;
pub mod convert;
pub mod error;
pub mod layout;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod writer;

// Primary entry points
pub use convert::{analyze, compose_deck, convert, convert_from_bytes, convert_sync, inspect};

// Configuration
pub use config::{ConversionConfig, ConversionConfigBuilder, PageSelection};

// Errors
pub use error::{AnalysisError, Pdf2DeckError};

// Layout model
pub use layout::{Alignment, Element, ElementKind, PageImage, ShapeVariant, SlideLayout};

// Composition
pub use compose::{CanvasSize, ComposedSlide, Composition, Frame, ImageAsset, SlideDirective};

// Outputs
pub use output::{AnalysisOutput, ConversionOutput, DeckStats, DocumentMetadata};

// Progress and writer seams
pub use progress::{AnalysisProgressCallback, NoopProgressCallback, ProgressCallback};
pub use writer::PresentationWriter;
