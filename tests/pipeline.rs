//! Integration tests: orchestrator → layout → compositor through the public
//! API, with stub inference adapters standing in for the VLM.

use edgequake_llm::ImageData;
use pdf2deck::pipeline::analyze::parse_layout;
use pdf2deck::pipeline::batch::run_batches;
use pdf2deck::pipeline::encode::EncodedPage;
use pdf2deck::{
    compose, AnalysisError, AnalysisProgressCallback, CanvasSize, ComposedSlide, ElementKind,
    PageImage, PresentationWriter, SlideDirective,
};
use std::io::Cursor;
use std::sync::{Arc, Mutex};

const CANVAS: CanvasSize = CanvasSize {
    width: 10.0,
    height: 5.625,
};

fn png_bytes(w: u32, h: u32) -> Vec<u8> {
    let img = image::DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
        w,
        h,
        image::Rgba([30, 60, 90, 255]),
    ));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn page(index: usize) -> EncodedPage {
    EncodedPage {
        image: PageImage {
            index,
            png: Arc::new(png_bytes(100, 56)),
        },
        payload: ImageData::new(String::new(), "image/png"),
    }
}

/// A canned model response with one shape, one text box, one image crop.
fn canned_response() -> &'static str {
    r##"{
      "backgroundColor": "#F0F0F0",
      "elements": [
        {"type": "shape", "x": 0, "y": 0, "w": 100, "h": 18, "bgColor": "#004488"},
        {"type": "text", "x": 5, "y": 4, "w": 90, "h": 10, "content": "Agenda"},
        {"type": "image", "x": 10, "y": 30, "w": 40, "h": 50}
      ]
    }"##
}

struct Checkpoints(Mutex<Vec<(usize, usize)>>);

impl AnalysisProgressCallback for Checkpoints {
    fn on_chunk_complete(&self, processed: usize, total: usize) {
        self.0.lock().unwrap().push((processed, total));
    }
}

#[tokio::test]
async fn stubbed_run_produces_an_ordered_composed_deck() {
    let pages: Vec<EncodedPage> = (0..7).map(page).collect();
    let checkpoints = Arc::new(Checkpoints(Mutex::new(Vec::new())));

    let (layouts, fallbacks) = run_batches(
        pages,
        3,
        Some(checkpoints.clone() as Arc<dyn AnalysisProgressCallback>),
        |p| async move { parse_layout(canned_response(), p.image) },
    )
    .await;

    assert_eq!(fallbacks, 0);
    assert_eq!(*checkpoints.0.lock().unwrap(), vec![(3, 7), (6, 7), (7, 7)]);

    let composition = compose::compose(&layouts, CANVAS, 90);
    assert_eq!(composition.slides.len(), 7);
    for (i, slide) in composition.slides.iter().enumerate() {
        assert_eq!(slide.page_index, i);
        assert_eq!(slide.directives.len(), 3);
        assert_eq!(slide.background_color, "#F0F0F0");
    }
    // One crop asset per page, named for its page and element position.
    assert_eq!(composition.assets.len(), 7);
    assert_eq!(composition.assets[0].name, "slide_1_el_3.jpg");
    assert_eq!(composition.assets[6].name, "slide_7_el_3.jpg");
}

#[tokio::test]
async fn failed_page_becomes_a_whole_page_image_slide() {
    let pages: Vec<EncodedPage> = (0..4).map(page).collect();
    let source_png = pages[2].image.png.clone();

    let (layouts, fallbacks) = run_batches(pages, 2, None, |p| async move {
        if p.image.index == 2 {
            Err(AnalysisError::Timeout {
                page: 3,
                secs: 90,
            })
        } else {
            parse_layout(canned_response(), p.image)
        }
    })
    .await;

    assert_eq!(fallbacks, 1);
    let composition = compose::compose(&layouts, CANVAS, 90);

    // The degraded page is exactly one full-canvas image directive backed by
    // the unmodified source raster.
    let slide = &composition.slides[2];
    assert_eq!(slide.background_color, "#FFFFFF");
    assert_eq!(slide.directives.len(), 1);
    match &slide.directives[0] {
        SlideDirective::Image { frame, asset } => {
            assert_eq!((frame.x, frame.y), (0.0, 0.0));
            assert_eq!((frame.w, frame.h), (CANVAS.width, CANVAS.height));
            assert_eq!(asset.name, "slide_3_el_1.png");
            assert_eq!(asset.bytes, source_png);
        }
        other => panic!("expected image directive, got {other:?}"),
    }

    // Neighbours are unaffected.
    assert_eq!(composition.slides[1].directives.len(), 3);
    assert_eq!(composition.slides[3].directives.len(), 3);
}

#[tokio::test]
async fn normalization_defaults_survive_to_directives() {
    let pages = vec![page(0)];
    // Text with no style fields at all.
    let (layouts, _) = run_batches(pages, 3, None, |p| async move {
        parse_layout(
            r#"{"elements": [{"type": "text", "x": 10, "y": 10, "w": 80, "h": 10, "content": "plain"}]}"#,
            p.image,
        )
    })
    .await;

    let composition = compose::compose(&layouts, CANVAS, 90);
    match &composition.slides[0].directives[0] {
        SlideDirective::Text {
            content,
            font_size_pt,
            color,
            bold,
            ..
        } => {
            assert_eq!(content, "plain");
            assert_eq!(*font_size_pt, 14.0);
            assert_eq!(color, "#000000");
            assert!(!bold);
        }
        other => panic!("expected text directive, got {other:?}"),
    }
}

#[tokio::test]
async fn unclassifiable_elements_keep_their_pixels() {
    let pages = vec![page(0)];
    let (layouts, _) = run_batches(pages, 1, None, |p| async move {
        parse_layout(
            r#"{"elements": [{"type": "chart", "x": 20, "y": 20, "w": 50, "h": 40}]}"#,
            p.image,
        )
    })
    .await;

    assert_eq!(layouts[0].elements[0].kind, ElementKind::Image);
    let composition = compose::compose(&layouts, CANVAS, 90);
    assert!(matches!(
        composition.slides[0].directives[0],
        SlideDirective::Image { .. }
    ));
}

/// Minimal writer proving the serializer seam: counts directives into a
/// fake "document".
struct ManifestWriter;

impl PresentationWriter for ManifestWriter {
    fn write_deck(
        &self,
        slides: &[ComposedSlide],
        canvas: CanvasSize,
    ) -> Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>> {
        let mut out = format!("canvas {}x{}\n", canvas.width, canvas.height);
        for slide in slides {
            out.push_str(&format!(
                "slide {} bg {} directives {}\n",
                slide.page_index + 1,
                slide.background_color,
                slide.directives.len()
            ));
        }
        Ok(out.into_bytes())
    }
}

#[tokio::test]
async fn composed_slides_feed_a_presentation_writer() {
    let pages: Vec<EncodedPage> = (0..2).map(page).collect();
    let (layouts, _) = run_batches(pages, 3, None, |p| async move {
        parse_layout(canned_response(), p.image)
    })
    .await;

    let composition = compose::compose(&layouts, CANVAS, 90);
    let writer: Arc<dyn PresentationWriter> = Arc::new(ManifestWriter);
    let bytes = writer.write_deck(&composition.slides, CANVAS).unwrap();
    let manifest = String::from_utf8(bytes).unwrap();

    assert!(manifest.starts_with("canvas 10x5.625\n"));
    assert!(manifest.contains("slide 1 bg #F0F0F0 directives 3"));
    assert!(manifest.contains("slide 2 bg #F0F0F0 directives 3"));
}

#[tokio::test]
async fn repeated_runs_yield_identical_compositions() {
    let make_layouts = || async {
        let pages: Vec<EncodedPage> = (0..3).map(page).collect();
        run_batches(pages, 2, None, |p| async move {
            parse_layout(canned_response(), p.image)
        })
        .await
        .0
    };

    let a = compose::compose(&make_layouts().await, CANVAS, 90);
    let b = compose::compose(&make_layouts().await, CANVAS, 90);
    assert_eq!(a, b);
}
