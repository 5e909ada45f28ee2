//! System prompts for VLM-based slide-layout analysis.
//!
//! Centralising every prompt here serves two purposes:
//!
//! 1. **Single source of truth** — changing the analysis behaviour (element
//!    granularity, coordinate conventions, estimation rules) requires editing
//!    exactly one place.
//!
//! 2. **Testability** — unit tests can inspect prompts directly without
//!    spinning up a real VLM, so a prompt regression (say, dropping the
//!    percentage-coordinate rule) is caught immediately.
//!
//! Callers can override the default via
//! [`crate::config::ConversionConfig::system_prompt`]; the constants here are
//! used only when no override is provided.

/// Default system prompt for extracting a structured layout from a slide image.
///
/// The prompt pins down exactly the JSON schema that
/// [`crate::layout::RawSlideLayout`] deserializes, including the closed enum
/// vocabularies and the percentage coordinate space. Back-to-front output
/// order matters: the compositor preserves element order as stacking order.
pub const DEFAULT_SYSTEM_PROMPT: &str = r##"You are an expert presentation layout parser. You analyze an image of one presentation slide and emit a structured JSON description precise enough to rebuild the slide as an editable file.

Analysis strategy:

1. DECONSTRUCT LAYERS
   - Identify the slide background color first.
   - Then shapes that act as containers or backdrops.
   - Finally the text sitting on top.

2. VISUAL ASSET PRESERVATION (critical)
   - Photos, icons, logos, charts, complex diagrams: emit as type "image".
     Never drop them; visual fidelity must be preserved.
   - Simple rectangles, circles, and divider lines used as design: type "shape".

3. TEXT GRANULARITY
   - Do NOT merge distinct text blocks into one box. A title and a subtitle
     are separate elements; headers and footers are separate elements.
   - If text sits inside a colored box, emit the shape first, then the text.

4. PROPERTIES
   - Coordinates x, y, w, h: percent of the canvas (0-100), x/y being the
     top-left corner. Bounding boxes must be tight around visible content.
   - fontSize: estimate in points. Titles 40-60, subtitles 24-32,
     body 14-20, captions 10-12.
   - Colors: 6-digit hex codes like #FF0000.
   - align: one of "left", "center", "right".
   - shapeType: one of "rect", "ellipse", "line" (shapes only).

5. OUTPUT
   - JSON only, matching exactly:
     {"backgroundColor": "#RRGGBB",
      "elements": [{"type": "text"|"shape"|"image", "x": n, "y": n, "w": n,
                    "h": n, "content": "...", "color": "#RRGGBB",
                    "bgColor": "#RRGGBB", "fontSize": n, "bold": bool,
                    "align": "left"|"center"|"right",
                    "shapeType": "rect"|"ellipse"|"line"}]}
   - Elements in visual stacking order, back to front:
     background shapes, then images, then text.
   - No commentary, no markdown fences."##;

/// User-turn instruction accompanying the slide image.
///
/// VLM APIs require at least one user turn; the image carries the content,
/// this text restates the one thing models most often get wrong (dropping
/// pictures instead of tagging them as image elements).
pub const ANALYSIS_USER_INSTRUCTION: &str = "Analyze this slide image. Extract layout, text, shapes, and IMAGES into the JSON structure. Prioritize preserving diagrams and photos as 'image' elements.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_pins_the_wire_schema() {
        for field in ["backgroundColor", "elements", "bgColor", "fontSize", "shapeType"] {
            assert!(
                DEFAULT_SYSTEM_PROMPT.contains(field),
                "prompt must mention schema field {field}"
            );
        }
    }

    #[test]
    fn prompt_states_percentage_coordinates() {
        assert!(DEFAULT_SYSTEM_PROMPT.contains("percent of the canvas (0-100)"));
    }

    #[test]
    fn prompt_forbids_fences() {
        assert!(DEFAULT_SYSTEM_PROMPT.contains("no markdown fences"));
    }
}
