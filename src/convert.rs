//! Eager (full-document) conversion entry points.
//!
//! ## Two halves, one seam
//!
//! [`analyze`] runs everything up to the ordered Layout Model list; the list
//! it returns is the crate's editing seam — callers may adjust inferred
//! elements (fix a color, merge a text box) before composition. [`convert`]
//! is the straight-through path: analyze, compose, serialize, no edit step.
//! Composition itself is exposed as [`compose_deck`] so edited layouts can
//! be re-composed without re-running inference.

use crate::compose::{self, CanvasSize, Composition};
use crate::config::ConversionConfig;
use crate::error::Pdf2DeckError;
use crate::layout::SlideLayout;
use crate::output::{AnalysisOutput, ConversionOutput, DeckStats, DocumentMetadata};
use crate::pipeline::{analyze as analysis, batch, encode, input, render};
use crate::writer::PresentationWriter;
use edgequake_llm::{LLMProvider, ProviderFactory};
use std::io::Write;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Analyze a PDF into one Layout Model per selected page.
///
/// This is the first half of the pipeline: rasterize, infer layouts with
/// bounded concurrency, restore page order. The returned layouts are sorted
/// by `page_index` ascending with no gaps or duplicates; a page whose
/// inference failed is present as the whole-image fallback, never missing.
///
/// # Errors
/// Returns `Err(Pdf2DeckError)` only for structural failures: bad input,
/// corrupt/encrypted PDF, empty page selection, no provider. Per-page
/// inference failures are absorbed (check `stats.fallback_pages`).
pub async fn analyze(
    input_str: impl AsRef<str>,
    config: &ConversionConfig,
) -> Result<AnalysisOutput, Pdf2DeckError> {
    let total_start = Instant::now();
    let input_str = input_str.as_ref();
    info!("Starting analysis: {}", input_str);

    // ── Step 1: Resolve input ────────────────────────────────────────────
    let resolved = input::resolve_input(input_str, config.download_timeout_secs).await?;
    let pdf_path = resolved.path().to_path_buf();

    // ── Step 2: Get/create provider ──────────────────────────────────────
    let provider = resolve_provider(config)?;

    // ── Step 3: Extract metadata ─────────────────────────────────────────
    let metadata = render::extract_metadata(&pdf_path, config.password.as_deref()).await?;
    let total_pages = metadata.page_count;
    info!("PDF has {} pages", total_pages);

    // ── Step 4: Compute page indices ─────────────────────────────────────
    let page_indices = config.pages.to_indices(total_pages);
    if page_indices.is_empty() {
        return Err(Pdf2DeckError::EmptyDocument { total: total_pages });
    }
    debug!("Selected {} pages for analysis", page_indices.len());

    // ── Step 5: Rasterise pages ──────────────────────────────────────────
    let render_start = Instant::now();
    let rendered = render::render_pages(&pdf_path, config, &page_indices).await?;
    let render_duration_ms = render_start.elapsed().as_millis() as u64;
    if rendered.is_empty() {
        return Err(Pdf2DeckError::EmptyDocument { total: total_pages });
    }
    info!("Rendered {} pages in {}ms", rendered.len(), render_duration_ms);

    // ── Step 6: Encode pages ─────────────────────────────────────────────
    // An encode failure would leave a gap in the page sequence, which the
    // orchestrator's ordering contract forbids; it is fatal, not skippable.
    let mut pages = Vec::with_capacity(rendered.len());
    for (idx, img) in &rendered {
        let page = encode::encode_page(*idx, img).map_err(|e| {
            Pdf2DeckError::RasterisationFailed {
                page: idx + 1,
                detail: format!("Image encoding failed: {}", e),
            }
        })?;
        pages.push(page);
    }
    let analyzed_pages = pages.len();

    // ── Step 7: Infer layouts in bounded chunks ──────────────────────────
    let analysis_start = Instant::now();
    let (layouts, fallback_pages) = batch::run_batches(
        pages,
        config.batch_size,
        config.progress_callback.clone(),
        |page| {
            let provider = Arc::clone(&provider);
            let config = config.clone();
            async move { analysis::analyze_page(&provider, &page, &config).await }
        },
    )
    .await;
    let analysis_duration_ms = analysis_start.elapsed().as_millis() as u64;

    let stats = DeckStats {
        total_pages,
        analyzed_pages,
        fallback_pages,
        derived_assets: 0,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
        render_duration_ms,
        analysis_duration_ms,
        compose_duration_ms: 0,
    };

    info!(
        "Analysis complete: {}/{} pages inferred, {} fallback, {}ms total",
        analyzed_pages - fallback_pages,
        analyzed_pages,
        fallback_pages,
        stats.total_duration_ms
    );

    Ok(AnalysisOutput {
        layouts,
        metadata,
        stats,
    })
}

/// Compose ordered layouts (fresh from [`analyze`], or edited) into
/// absolute-geometry slides and derived image assets.
pub fn compose_deck(layouts: &[SlideLayout], config: &ConversionConfig) -> Composition {
    compose::compose(
        layouts,
        CanvasSize {
            width: config.canvas_width,
            height: config.canvas_height,
        },
        config.crop_jpeg_quality,
    )
}

/// Convert a PDF file or URL into a serialized presentation.
///
/// This is the primary entry point for the library: analyze, compose, then
/// hand the composed slides to `writer`.
///
/// # Errors
/// All [`analyze`] errors, plus [`Pdf2DeckError::WriterFailed`] when the
/// external serializer fails — terminal, with no partial-success output.
pub async fn convert(
    input_str: impl AsRef<str>,
    writer: &Arc<dyn PresentationWriter>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Pdf2DeckError> {
    let AnalysisOutput {
        layouts,
        metadata,
        mut stats,
    } = analyze(input_str, config).await?;

    let compose_start = Instant::now();
    let composition = compose_deck(&layouts, config);
    stats.compose_duration_ms = compose_start.elapsed().as_millis() as u64;
    stats.derived_assets = composition.assets.len();

    let canvas = CanvasSize {
        width: config.canvas_width,
        height: config.canvas_height,
    };
    let presentation = writer
        .write_deck(&composition.slides, canvas)
        .map_err(|e| Pdf2DeckError::WriterFailed {
            detail: e.to_string(),
        })?;

    stats.total_duration_ms += stats.compose_duration_ms;
    info!(
        "Conversion complete: {} slides, {} assets, {} presentation bytes",
        composition.slides.len(),
        composition.assets.len(),
        presentation.len()
    );

    Ok(ConversionOutput {
        presentation,
        assets: composition.assets,
        layouts,
        metadata,
        stats,
    })
}

/// Convert PDF bytes in memory.
///
/// Avoids the need for the caller to create a temporary file: the bytes are
/// written to a managed [`tempfile`] that is cleaned up automatically on
/// return or panic. Recommended when the PDF comes from a database or
/// network stream rather than a file on disk.
pub async fn convert_from_bytes(
    bytes: &[u8],
    writer: &Arc<dyn PresentationWriter>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Pdf2DeckError> {
    let mut tmp = tempfile::NamedTempFile::new()
        .map_err(|e| Pdf2DeckError::Internal(format!("tempfile: {e}")))?;
    tmp.write_all(bytes)
        .map_err(|e| Pdf2DeckError::Internal(format!("tempfile write: {e}")))?;
    let path = tmp.path().to_string_lossy().to_string();
    // `tmp` is dropped (and the file deleted) when `convert` returns
    convert(&path, writer, config).await
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(
    input_str: impl AsRef<str>,
    writer: &Arc<dyn PresentationWriter>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Pdf2DeckError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Pdf2DeckError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert(input_str, writer, config))
}

/// Extract PDF metadata without converting content.
///
/// Does not require an LLM provider or API key.
pub async fn inspect(input_str: impl AsRef<str>) -> Result<DocumentMetadata, Pdf2DeckError> {
    let resolved = input::resolve_input(input_str.as_ref(), 120).await?;
    let pdf_path = resolved.path().to_path_buf();
    render::extract_metadata(&pdf_path, None).await
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Resolve the LLM provider, from most-specific to least-specific.
///
/// The four-level fallback chain lets library users set exactly as much or
/// as little as they need:
///
/// 1. **Pre-built provider** (`config.provider`) — the caller constructed and
///    configured the provider entirely; we use it as-is. Useful in tests or
///    when the caller needs custom middleware (caching, rate-limiting).
///
/// 2. **Named provider + model** (`config.provider_name`) — the caller named
///    a provider (e.g. `"openai"`) and optional model. We call
///    [`ProviderFactory::create_llm_provider`] which reads the corresponding
///    API key (`OPENAI_API_KEY`, etc.) from the environment.
///
/// 3. **Environment pair** (`PDF2DECK_LLM_PROVIDER` + `PDF2DECK_MODEL`) —
///    both env vars set means the caller chose at the execution-environment
///    level (Makefile, shell script, CI). Checked before full auto-detection
///    so the model choice is honoured even when multiple API keys are present.
///
/// 4. **Full auto-detection** (`ProviderFactory::from_env`) — the factory
///    scans all known API key variables and picks the first available
///    provider. OpenAI is preferred when its key is present so users with
///    multiple keys get a predictable default.
fn resolve_provider(config: &ConversionConfig) -> Result<Arc<dyn LLMProvider>, Pdf2DeckError> {
    // 1) User-provided provider takes priority
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    // 2) Provider name + model
    if let Some(ref name) = config.provider_name {
        let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);
        return create_vision_provider(name, model);
    }

    // 3) Environment pair
    if let (Ok(prov), Ok(model)) = (
        std::env::var("PDF2DECK_LLM_PROVIDER"),
        std::env::var("PDF2DECK_MODEL"),
    ) {
        if !prov.is_empty() && !model.is_empty() {
            return create_vision_provider(&prov, &model);
        }
    }

    // 4) Auto-detect, preferring OpenAI when its key is present
    if let Ok(openai_key) = std::env::var("OPENAI_API_KEY") {
        if !openai_key.is_empty() {
            let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);
            return create_vision_provider("openai", model);
        }
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| Pdf2DeckError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                Set OPENAI_API_KEY, ANTHROPIC_API_KEY, or configure a provider.\n\
                Error: {}",
                e
            ),
        })?;

    Ok(llm_provider)
}

/// Default vision model. Layout inference needs solid spatial reasoning;
/// the mini tier is the cheapest that localises bounding boxes reliably.
const DEFAULT_MODEL: &str = "gpt-4.1-mini";

/// Instantiate a named provider with the given model.
fn create_vision_provider(
    provider_name: &str,
    model: &str,
) -> Result<Arc<dyn LLMProvider>, Pdf2DeckError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        Pdf2DeckError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}
