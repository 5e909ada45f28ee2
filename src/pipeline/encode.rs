//! Page encoding: `DynamicImage` → shared PNG bytes + base64 `ImageData`.
//!
//! The PNG bytes do double duty. They are base64-wrapped into the VLM request
//! body, and the *same* encoded buffer is kept (behind an `Arc`) as the
//! page's [`PageImage`] so the compositor can later crop image elements out
//! of exactly the pixels the model looked at. Encoding once and sharing the
//! buffer keeps those two views of the page guaranteed-identical.
//!
//! PNG over JPEG because it is lossless: crisp glyph edges matter for the
//! model's text reading, and the whole-page fallback embeds these bytes
//! directly into the output deck.

use crate::layout::PageImage;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use edgequake_llm::ImageData;
use image::DynamicImage;
use std::io::Cursor;
use std::sync::Arc;
use tracing::debug;

/// One page ready for inference: the shared raster plus its request payload.
pub struct EncodedPage {
    pub image: PageImage,
    pub payload: ImageData,
}

/// Encode a rasterised page for both the VLM request and later cropping.
///
/// `detail: "high"` instructs GPT-4-class models to use the full image tile
/// budget; without it small captions and thin divider lines are lost and the
/// inferred layout comes back impoverished.
pub fn encode_page(index: usize, img: &DynamicImage) -> Result<EncodedPage, image::ImageError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;

    let b64 = STANDARD.encode(&buf);
    debug!("Encoded page {} → {} bytes base64", index + 1, b64.len());

    Ok(EncodedPage {
        image: PageImage {
            index,
            png: Arc::new(buf),
        },
        payload: ImageData::new(b64, "image/png").with_detail("high"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn encode_small_image() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(10, 10, Rgba([255, 0, 0, 255])));
        let page = encode_page(3, &img).expect("encode should succeed");

        assert_eq!(page.image.index, 3);
        assert_eq!(page.payload.mime_type, "image/png");

        // The payload is the base64 of exactly the shared PNG buffer.
        let decoded = STANDARD.decode(&page.payload.data).expect("valid base64");
        assert_eq!(decoded, *page.image.png);

        // And the buffer decodes back to the original dimensions.
        let round = image::load_from_memory(&page.image.png).unwrap();
        assert_eq!((round.width(), round.height()), (10, 10));
    }
}
