//! The Layout Model: the normalized, editable description of one page.
//!
//! Two families of types live here:
//!
//! * **Wire types** ([`RawSlideLayout`], [`RawElement`]) — mirror the JSON
//!   schema the VLM is instructed to emit. Every field the model may omit is
//!   an `Option`, and enums arrive as plain strings so an unrecognized value
//!   is data to be defaulted, not a deserialization error. Structural
//!   violations (missing `elements` array, non-numeric geometry) *are*
//!   deserialization errors and are handled as adapter failures upstream.
//!
//! * **Domain types** ([`SlideLayout`], [`Element`]) — what the rest of the
//!   pipeline works with. [`RawSlideLayout::normalize`] fills every optional
//!   style attribute with its documented default and collapses unknown enum
//!   strings onto the documented fallbacks, so the compositor never has to
//!   ask "is this field present".
//!
//! Normalization defaults:
//!
//! | Field | Default |
//! |-------|---------|
//! | slide background | `#FFFFFF` |
//! | text color | `#000000` |
//! | shape fill | `#CCCCCC` |
//! | font size | 14 pt |
//! | alignment | left |
//! | shape variant | rectangle |
//! | geometry | 0.0 |
//! | unknown element type | image (keeps the pixels, invents nothing) |

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Default slide background when the model omits or mangles it.
pub const DEFAULT_BACKGROUND: &str = "#FFFFFF";
/// Default text color.
pub const DEFAULT_TEXT_COLOR: &str = "#000000";
/// Neutral gray used for shapes with no inferred fill.
pub const DEFAULT_SHAPE_FILL: &str = "#CCCCCC";
/// Default font size in points for text elements.
pub const DEFAULT_FONT_SIZE_PT: f32 = 14.0;

/// The encoded raster of one source page.
///
/// Produced once by the render/encode stages and shared by reference into the
/// page's [`SlideLayout`]; the compositor reads it again when cropping image
/// elements. Never mutated after creation.
#[derive(Debug, Clone)]
pub struct PageImage {
    /// 0-based page index, assigned at source time and never reassigned.
    pub index: usize,
    /// PNG-encoded pixels.
    pub png: Arc<Vec<u8>>,
}

/// What an inferred element is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Text,
    Shape,
    Image,
}

/// Geometry primitive for shape elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeVariant {
    #[default]
    Rect,
    Ellipse,
    Line,
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

/// One inferred visual unit on a page, fully normalized.
///
/// Geometry is in percent of canvas (`[0,100]` nominally — inference may
/// overshoot; the compositor clamps rather than rejects), `x`/`y` giving the
/// top-left corner. Every style field is concrete after normalization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Element {
    pub kind: ElementKind,
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    /// Text body; empty for non-text elements.
    pub content: String,
    /// Text color, canonical `#RRGGBB`.
    pub color: String,
    /// Shape fill color, canonical `#RRGGBB`.
    pub background_color: String,
    pub font_size_pt: f32,
    pub bold: bool,
    pub alignment: Alignment,
    /// Meaningful only for `kind == Shape`.
    pub shape_variant: ShapeVariant,
}

/// The normalized, editable layout of one page: background plus elements in
/// back-to-front stacking order, with a reference to the source raster for
/// later cropping.
///
/// Built once by the orchestrator (from a successful inference or the
/// fallback), possibly edited by the caller, then treated as immutable by the
/// compositor.
#[derive(Debug, Clone, Serialize)]
pub struct SlideLayout {
    pub page_index: usize,
    /// Canonical `#RRGGBB`.
    pub background_color: String,
    /// Back-to-front stacking order.
    pub elements: Vec<Element>,
    #[serde(skip)]
    pub image: PageImage,
}

impl SlideLayout {
    /// The degenerate layout substituted when inference fails for a page:
    /// white background, one image element spanning the full canvas. The page
    /// stays in the deck as a whole-page picture.
    pub fn fallback(image: PageImage) -> Self {
        let page_index = image.index;
        Self {
            page_index,
            background_color: DEFAULT_BACKGROUND.to_string(),
            elements: vec![Element {
                kind: ElementKind::Image,
                x: 0.0,
                y: 0.0,
                w: 100.0,
                h: 100.0,
                content: String::new(),
                color: DEFAULT_TEXT_COLOR.to_string(),
                background_color: DEFAULT_SHAPE_FILL.to_string(),
                font_size_pt: DEFAULT_FONT_SIZE_PT,
                bold: false,
                alignment: Alignment::Left,
                shape_variant: ShapeVariant::Rect,
            }],
            image,
        }
    }
}

// ── Wire schema ──────────────────────────────────────────────────────────

/// The JSON layout the VLM is instructed to emit for one page.
#[derive(Debug, Clone, Deserialize)]
pub struct RawSlideLayout {
    #[serde(rename = "backgroundColor")]
    pub background_color: Option<String>,
    #[serde(default)]
    pub elements: Vec<RawElement>,
}

/// One element as it appears on the wire. Enums are strings here so an
/// unknown value falls back to a default instead of failing the page.
#[derive(Debug, Clone, Deserialize)]
pub struct RawElement {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub w: Option<f32>,
    pub h: Option<f32>,
    pub content: Option<String>,
    pub color: Option<String>,
    #[serde(rename = "bgColor")]
    pub bg_color: Option<String>,
    #[serde(rename = "fontSize")]
    pub font_size: Option<f32>,
    pub bold: Option<bool>,
    pub align: Option<String>,
    #[serde(rename = "shapeType")]
    pub shape_type: Option<String>,
}

impl RawSlideLayout {
    /// Normalize a parsed response into a [`SlideLayout`] for `image`'s page.
    ///
    /// Infallible: every malformed individual field is defaulted, never
    /// rejected. Element order is preserved exactly (back-to-front).
    pub fn normalize(self, image: PageImage) -> SlideLayout {
        let page_index = image.index;
        SlideLayout {
            page_index,
            background_color: canonical_hex(self.background_color.as_deref(), DEFAULT_BACKGROUND),
            elements: self.elements.into_iter().map(RawElement::normalize).collect(),
            image,
        }
    }
}

impl RawElement {
    fn normalize(self) -> Element {
        Element {
            kind: parse_kind(self.kind.as_deref()),
            x: self.x.unwrap_or(0.0),
            y: self.y.unwrap_or(0.0),
            w: self.w.unwrap_or(0.0),
            h: self.h.unwrap_or(0.0),
            content: self.content.unwrap_or_default(),
            color: canonical_hex(self.color.as_deref(), DEFAULT_TEXT_COLOR),
            background_color: canonical_hex(self.bg_color.as_deref(), DEFAULT_SHAPE_FILL),
            font_size_pt: self.font_size.unwrap_or(DEFAULT_FONT_SIZE_PT),
            bold: self.bold.unwrap_or(false),
            alignment: parse_alignment(self.align.as_deref()),
            shape_variant: parse_shape_variant(self.shape_type.as_deref()),
        }
    }
}

fn parse_kind(s: Option<&str>) -> ElementKind {
    match s.map(str::trim).map(str::to_ascii_lowercase).as_deref() {
        Some("text") => ElementKind::Text,
        Some("shape") => ElementKind::Shape,
        Some("image") => ElementKind::Image,
        // An element we cannot classify still has pixels under its bounding
        // box; preserving them as a picture invents nothing.
        _ => ElementKind::Image,
    }
}

fn parse_shape_variant(s: Option<&str>) -> ShapeVariant {
    match s.map(str::trim).map(str::to_ascii_lowercase).as_deref() {
        Some("ellipse") => ShapeVariant::Ellipse,
        Some("line") => ShapeVariant::Line,
        Some("rect") | Some("rectangle") => ShapeVariant::Rect,
        _ => ShapeVariant::Rect,
    }
}

fn parse_alignment(s: Option<&str>) -> Alignment {
    match s.map(str::trim).map(str::to_ascii_lowercase).as_deref() {
        Some("center") | Some("centre") => Alignment::Center,
        Some("right") => Alignment::Right,
        Some("left") => Alignment::Left,
        _ => Alignment::Left,
    }
}

static RE_HEX6: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#?([0-9a-fA-F]{6})$").unwrap());

/// Canonicalize a hex color to uppercase `#RRGGBB`; anything else becomes
/// `default`. The leading `#` is optional on the wire.
fn canonical_hex(value: Option<&str>, default: &str) -> String {
    value
        .map(str::trim)
        .and_then(|v| RE_HEX6.captures(v))
        .map(|caps| format!("#{}", caps[1].to_ascii_uppercase()))
        .unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(index: usize) -> PageImage {
        PageImage {
            index,
            png: Arc::new(vec![0x89, b'P', b'N', b'G']),
        }
    }

    fn parse(json: &str) -> RawSlideLayout {
        serde_json::from_str(json).expect("schema-valid json")
    }

    #[test]
    fn normalizes_a_typical_response() {
        let raw = parse(
            r##"{
              "backgroundColor": "#1a2b3c",
              "elements": [
                {"type": "shape", "x": 0, "y": 0, "w": 100, "h": 20,
                 "bgColor": "004488", "shapeType": "rect"},
                {"type": "text", "x": 5, "y": 3, "w": 90, "h": 10,
                 "content": "Quarterly Review", "color": "#FFFFFF",
                 "fontSize": 44, "bold": true, "align": "center"},
                {"type": "image", "x": 10, "y": 30, "w": 40, "h": 50}
              ]
            }"##,
        );
        let layout = raw.normalize(page(2));

        assert_eq!(layout.page_index, 2);
        assert_eq!(layout.background_color, "#1A2B3C");
        assert_eq!(layout.elements.len(), 3);

        let title = &layout.elements[1];
        assert_eq!(title.kind, ElementKind::Text);
        assert_eq!(title.content, "Quarterly Review");
        assert_eq!(title.font_size_pt, 44.0);
        assert!(title.bold);
        assert_eq!(title.alignment, Alignment::Center);

        // '#' was optional on the wire
        assert_eq!(layout.elements[0].background_color, "#004488");
    }

    #[test]
    fn missing_style_fields_get_documented_defaults() {
        let raw = parse(r#"{"elements": [{"type": "text", "content": "hi"}]}"#);
        let layout = raw.normalize(page(0));

        assert_eq!(layout.background_color, DEFAULT_BACKGROUND);
        let el = &layout.elements[0];
        assert_eq!((el.x, el.y, el.w, el.h), (0.0, 0.0, 0.0, 0.0));
        assert_eq!(el.color, DEFAULT_TEXT_COLOR);
        assert_eq!(el.font_size_pt, DEFAULT_FONT_SIZE_PT);
        assert!(!el.bold);
        assert_eq!(el.alignment, Alignment::Left);
    }

    #[test]
    fn unknown_enum_strings_fall_back() {
        let raw = parse(
            r#"{"elements": [
                {"type": "hologram", "x": 1, "y": 1, "w": 1, "h": 1},
                {"type": "shape", "x": 1, "y": 1, "w": 1, "h": 1,
                 "shapeType": "dodecahedron", "align": "justified"}
            ]}"#,
        );
        let layout = raw.normalize(page(0));
        assert_eq!(layout.elements[0].kind, ElementKind::Image);
        assert_eq!(layout.elements[1].shape_variant, ShapeVariant::Rect);
        assert_eq!(layout.elements[1].alignment, Alignment::Left);
    }

    #[test]
    fn invalid_hex_colors_fall_back() {
        let raw = parse(
            r##"{"backgroundColor": "mostly blue",
                "elements": [{"type": "text", "content": "x", "color": "#12"}]}"##,
        );
        let layout = raw.normalize(page(0));
        assert_eq!(layout.background_color, DEFAULT_BACKGROUND);
        assert_eq!(layout.elements[0].color, DEFAULT_TEXT_COLOR);
    }

    #[test]
    fn fallback_is_one_full_canvas_image() {
        let layout = SlideLayout::fallback(page(7));
        assert_eq!(layout.page_index, 7);
        assert_eq!(layout.background_color, "#FFFFFF");
        assert_eq!(layout.elements.len(), 1);
        let el = &layout.elements[0];
        assert_eq!(el.kind, ElementKind::Image);
        assert_eq!((el.x, el.y, el.w, el.h), (0.0, 0.0, 100.0, 100.0));
    }

    #[test]
    fn missing_elements_array_is_a_schema_error() {
        // `elements` defaults to empty only when absent-but-null is not sent;
        // a wrong type must fail deserialization so the adapter treats it as
        // a schema violation.
        let r: Result<RawSlideLayout, _> =
            serde_json::from_str(r#"{"elements": "none"}"#);
        assert!(r.is_err());
    }
}
