//! Pipeline stages for deck reconstruction.
//!
//! Each submodule implements exactly one transformation step. Keeping stages
//! separate makes each independently testable and lets us swap
//! implementations (e.g. a different rasterization backend, or a stubbed
//! inference adapter in tests) without touching other stages.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ render ──▶ encode ──▶ batch ──▶ (compose)
//! (URL/path)  (pdfium)  (PNG+b64)  (chunked VLM calls)
//! ```
//!
//! 1. [`input`]   — canonicalise the user-supplied path or URL to a local file
//! 2. [`render`]  — rasterise selected pages; runs in `spawn_blocking` because
//!    pdfium is not async-safe
//! 3. [`encode`]  — PNG-encode each page and base64-wrap it for the
//!    multimodal API request body
//! 4. [`analyze`] — one VLM call per page with retry/backoff and a deadline;
//!    the only stage with network I/O
//! 5. [`batch`]   — drive [`analyze`] across all pages in bounded-size chunks,
//!    substitute the fallback layout for failed pages, restore page order
//!
//! Composition lives outside the pipeline in [`crate::compose`]: it runs
//! after the (optional, external) layout-editing step, not as part of
//! analysis.

pub mod analyze;
pub mod batch;
pub mod encode;
pub mod input;
pub mod render;
