//! The compositor: Layout Models in, absolute-geometry slide directives out.
//!
//! This is a pure, page-local transform with no cross-page memory and no
//! concurrency: given the same ordered layouts and canvas it produces
//! byte-identical directive sequences and identical byproduct names on every
//! run. That determinism is the crate's contract with the presentation
//! writer — we guarantee stable *inputs* to the serializer, not stable bytes
//! out of it.
//!
//! Per page, in order: background, then one directive per element in
//! back-to-front stacking order (later directives render above earlier ones
//! in the destination format). Inferred geometry is trusted but clamped —
//! the model may overshoot the `[0,100]` canvas, and a negative coordinate
//! must become 0 rather than an error.
//!
//! Image elements are re-cut from the page raster. An element covering at
//! least [`WHOLE_PAGE_MIN_PCT`] of both axes is treated as the whole page and
//! reuses the source PNG unmodified; anything smaller is cropped out of the
//! decoded raster and re-encoded as JPEG. A single bad image element (corrupt
//! raster, degenerate region) drops that one directive with a warning; it
//! never fails the page.

use crate::layout::{Alignment, Element, ElementKind, ShapeVariant, SlideLayout};
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use std::sync::Arc;
use tracing::{debug, warn};

/// An image element covering at least this much of both axes (in percent) is
/// the whole page: the source raster is reused unmodified instead of cropped.
pub const WHOLE_PAGE_MIN_PCT: f32 = 95.0;

/// Fixed slide canvas dimensions in absolute presentation units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasSize {
    pub width: f32,
    pub height: f32,
}

/// Absolute-unit bounding box of one directive on the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

/// A derived image byproduct: deterministically named, shareable bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageAsset {
    /// `slide_{page+1}_el_{el+1}.png` for whole-page reuse, `.jpg` for crops.
    pub name: String,
    pub bytes: Arc<Vec<u8>>,
}

/// One drawing instruction for the presentation writer, in absolute units.
#[derive(Debug, Clone, PartialEq)]
pub enum SlideDirective {
    /// Filled shape, no outline.
    Shape {
        frame: Frame,
        variant: ShapeVariant,
        fill: String,
    },
    /// Word-wrapped text box.
    Text {
        frame: Frame,
        content: String,
        font_size_pt: f32,
        color: String,
        bold: bool,
        alignment: Alignment,
        wrap: bool,
    },
    /// Raster image; `asset` carries both the renderable payload and the
    /// logical name under which the byproduct is exposed.
    Image { frame: Frame, asset: ImageAsset },
}

/// The compositor's output for one page. Immutable, consumed exactly once by
/// the presentation writer.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedSlide {
    pub page_index: usize,
    /// Canonical `#RRGGBB`.
    pub background_color: String,
    /// Same order as the source elements (back-to-front).
    pub directives: Vec<SlideDirective>,
}

/// All composed slides plus the flat list of derived image byproducts, for
/// any external persistence step.
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    pub slides: Vec<ComposedSlide>,
    pub assets: Vec<ImageAsset>,
}

/// Compose every layout into absolute-geometry slides.
///
/// `layouts` must already be in ascending `page_index` order — the batch
/// orchestrator guarantees this. Processing is strictly sequential; the
/// compositor is cheap relative to inference and is not a bottleneck.
pub fn compose(layouts: &[SlideLayout], canvas: CanvasSize, jpeg_quality: u8) -> Composition {
    let mut slides = Vec::with_capacity(layouts.len());
    let mut assets = Vec::new();

    for layout in layouts {
        slides.push(compose_page(layout, canvas, jpeg_quality, &mut assets));
    }

    debug!(
        "Composed {} slides, {} image assets",
        slides.len(),
        assets.len()
    );

    Composition { slides, assets }
}

fn compose_page(
    layout: &SlideLayout,
    canvas: CanvasSize,
    jpeg_quality: u8,
    assets: &mut Vec<ImageAsset>,
) -> ComposedSlide {
    let mut directives = Vec::with_capacity(layout.elements.len());
    // The raster is decoded at most once per page, and only if some element
    // actually needs a crop. `None` = not yet attempted.
    let mut decoded: Option<Option<DynamicImage>> = None;

    for (el_idx, el) in layout.elements.iter().enumerate() {
        let frame = to_frame(el, canvas);

        match el.kind {
            ElementKind::Shape => directives.push(SlideDirective::Shape {
                frame,
                variant: el.shape_variant,
                fill: el.background_color.clone(),
            }),

            ElementKind::Text => {
                // Empty text boxes contribute no directive.
                if el.content.is_empty() {
                    continue;
                }
                directives.push(SlideDirective::Text {
                    frame,
                    content: el.content.clone(),
                    font_size_pt: el.font_size_pt,
                    color: el.color.clone(),
                    bold: el.bold,
                    alignment: el.alignment,
                    wrap: true,
                });
            }

            ElementKind::Image => {
                match image_asset(layout, el, el_idx, jpeg_quality, &mut decoded) {
                    Some(asset) => {
                        assets.push(asset.clone());
                        directives.push(SlideDirective::Image { frame, asset });
                    }
                    None => warn!(
                        "page {}: dropping image element {} (crop failed)",
                        layout.page_index, el_idx
                    ),
                }
            }
        }
    }

    ComposedSlide {
        page_index: layout.page_index,
        background_color: layout.background_color.clone(),
        directives,
    }
}

/// Convert percentage geometry to absolute canvas units, clamping negative
/// results to 0. Inference is not guaranteed to respect the `[0,100]` bound.
fn to_frame(el: &Element, canvas: CanvasSize) -> Frame {
    Frame {
        x: ((el.x / 100.0) * canvas.width).max(0.0),
        y: ((el.y / 100.0) * canvas.height).max(0.0),
        w: ((el.w / 100.0) * canvas.width).max(0.0),
        h: ((el.h / 100.0) * canvas.height).max(0.0),
    }
}

/// Derive the image payload for one image element.
///
/// Whole-page elements reuse the source PNG without decoding it; smaller
/// elements crop out of the (lazily decoded) raster and re-encode as JPEG.
/// `None` means this element's directive is dropped; the page continues.
fn image_asset(
    layout: &SlideLayout,
    el: &Element,
    el_idx: usize,
    jpeg_quality: u8,
    decoded: &mut Option<Option<DynamicImage>>,
) -> Option<ImageAsset> {
    if el.w >= WHOLE_PAGE_MIN_PCT && el.h >= WHOLE_PAGE_MIN_PCT {
        return Some(ImageAsset {
            name: asset_name(layout.page_index, el_idx, "png"),
            bytes: Arc::clone(&layout.image.png),
        });
    }

    let source = decoded
        .get_or_insert_with(|| match image::load_from_memory(&layout.image.png) {
            Ok(img) => Some(img),
            Err(e) => {
                warn!("page {}: source raster undecodable: {}", layout.page_index, e);
                None
            }
        })
        .as_ref()?;

    let bytes = crop_region(source, el, jpeg_quality)
        .map_err(|e| warn!("page {}: crop element {} failed: {}", layout.page_index, el_idx, e))
        .ok()?;

    Some(ImageAsset {
        name: asset_name(layout.page_index, el_idx, "jpg"),
        bytes: Arc::new(bytes),
    })
}

/// Map the element's percentage geometry onto the raster's pixel grid,
/// extract the region, and re-encode it as JPEG.
///
/// Crop dimensions are floored to a minimum of 1 px per axis so a degenerate
/// inferred box still yields a valid extraction.
fn crop_region(source: &DynamicImage, el: &Element, jpeg_quality: u8) -> image::ImageResult<Vec<u8>> {
    let (img_w, img_h) = (source.width(), source.height());

    let start_x = (((el.x.max(0.0) / 100.0) * img_w as f32) as u32).min(img_w.saturating_sub(1));
    let start_y = (((el.y.max(0.0) / 100.0) * img_h as f32) as u32).min(img_h.saturating_sub(1));
    let crop_w = ((((el.w / 100.0) * img_w as f32) as u32).max(1)).min(img_w - start_x);
    let crop_h = ((((el.h / 100.0) * img_h as f32) as u32).max(1)).min(img_h - start_y);

    let region = source.crop_imm(start_x, start_y, crop_w, crop_h).to_rgb8();

    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, jpeg_quality).encode_image(&region)?;
    Ok(buf)
}

/// Deterministic byproduct name: a pure function of page and element index,
/// so identical inputs produce identical names across runs.
fn asset_name(page_index: usize, el_idx: usize, ext: &str) -> String {
    format!("slide_{}_el_{}.{}", page_index + 1, el_idx + 1, ext)
}
