//! Layout inference: one VLM call per page, returning a typed result.
//!
//! This module is the adapter boundary described in the error taxonomy: it
//! returns `Result<SlideLayout, AnalysisError>` and never panics or
//! propagates provider errors in any other shape, so the orchestrator's
//! fallback substitution is an explicit, testable branch.
//!
//! ## Retry Strategy
//!
//! HTTP 429 / 503 errors from LLM APIs are transient and frequent under
//! concurrent load. Exponential backoff (`retry_backoff_ms * 2^attempt`)
//! avoids thundering-herd: with 500 ms base and 3 retries the wait sequence
//! is 500 ms → 1 s → 2 s. Timeouts are retried the same way. A response that
//! *arrives* but violates the layout schema is not retried: at temperature 0
//! the model would deterministically produce the same malformed answer, so
//! the page degrades to the fallback immediately.

use crate::config::ConversionConfig;
use crate::error::AnalysisError;
use crate::layout::{PageImage, RawSlideLayout, SlideLayout};
use crate::pipeline::encode::EncodedPage;
use crate::prompts::{ANALYSIS_USER_INSTRUCTION, DEFAULT_SYSTEM_PROMPT};
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider};
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{sleep, timeout, Duration};
use tracing::{debug, warn};

/// Infer the layout of a single rasterised page.
///
/// ## Message Layout
///
/// 1. **System message** — the layout-parser prompt (or user-supplied
///    override) pinning the JSON schema.
/// 2. **User message** — the page PNG as a base64 image attachment plus a
///    one-line instruction; the image carries the actual content.
///
/// ## Return Value
///
/// `Ok(SlideLayout)` with every field normalized, or a typed
/// [`AnalysisError`] for the orchestrator to convert into the whole-page
/// fallback. Nothing here aborts the batch.
pub async fn analyze_page(
    provider: &Arc<dyn LLMProvider>,
    page: &EncodedPage,
    config: &ConversionConfig,
) -> Result<SlideLayout, AnalysisError> {
    let start = Instant::now();
    let page_num = page.image.index + 1;

    let system_prompt = config
        .system_prompt
        .as_deref()
        .unwrap_or(DEFAULT_SYSTEM_PROMPT);

    let messages = vec![
        ChatMessage::system(system_prompt),
        ChatMessage::user_with_images(ANALYSIS_USER_INSTRUCTION, vec![page.payload.clone()]),
    ];

    let options = CompletionOptions {
        temperature: Some(config.temperature),
        max_tokens: Some(config.max_tokens),
        ..Default::default()
    };

    let deadline = Duration::from_secs(config.api_timeout_secs);
    let mut last_err: Option<String> = None;
    let mut last_was_timeout = false;

    for attempt in 0..=config.max_retries {
        if attempt > 0 {
            let backoff = config.retry_backoff_ms * 2u64.pow(attempt - 1);
            warn!(
                "Page {}: retry {}/{} after {}ms",
                page_num, attempt, config.max_retries, backoff
            );
            sleep(Duration::from_millis(backoff)).await;
        }

        match timeout(deadline, provider.chat(&messages, Some(&options))).await {
            Ok(Ok(response)) => {
                debug!(
                    "Page {}: {} input tokens, {} output tokens, {:?}",
                    page_num,
                    response.prompt_tokens,
                    response.completion_tokens,
                    start.elapsed()
                );
                return parse_layout(&response.content, page.image.clone());
            }
            Ok(Err(e)) => {
                let err_msg = format!("{}", e);
                warn!("Page {}: attempt {} failed — {}", page_num, attempt + 1, err_msg);
                last_err = Some(err_msg);
                last_was_timeout = false;
            }
            Err(_) => {
                warn!(
                    "Page {}: attempt {} exceeded {}s deadline",
                    page_num,
                    attempt + 1,
                    config.api_timeout_secs
                );
                last_err = Some(format!("deadline of {}s exceeded", config.api_timeout_secs));
                last_was_timeout = true;
            }
        }
    }

    if last_was_timeout {
        Err(AnalysisError::Timeout {
            page: page_num,
            secs: config.api_timeout_secs,
        })
    } else {
        Err(AnalysisError::Api {
            page: page_num,
            retries: config.max_retries,
            detail: last_err.unwrap_or_else(|| "Unknown error".to_string()),
        })
    }
}

// Models occasionally wrap the JSON in ``` fences despite the prompt saying
// not to; strip one outer fence pair before parsing.
static RE_OUTER_FENCES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```(?:json)?\s*\n(.*)\n```\s*$").unwrap());

/// Parse and normalize a raw response body into the page's layout.
///
/// A body that fails to deserialize against [`RawSlideLayout`] is a schema
/// violation; value-level oddities inside a deserializable body are handled
/// field-by-field by normalization and never error.
pub fn parse_layout(content: &str, image: PageImage) -> Result<SlideLayout, AnalysisError> {
    let page_num = image.index + 1;
    let trimmed = content.trim();
    let body = match RE_OUTER_FENCES.captures(trimmed) {
        Some(caps) => caps[1].to_string(),
        None => trimmed.to_string(),
    };

    let raw: RawSlideLayout =
        serde_json::from_str(&body).map_err(|e| AnalysisError::Schema {
            page: page_num,
            detail: e.to_string(),
        })?;

    Ok(raw.normalize(image))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::ElementKind;
    use std::sync::Arc as StdArc;

    fn page(index: usize) -> PageImage {
        PageImage {
            index,
            png: StdArc::new(vec![1, 2, 3]),
        }
    }

    #[test]
    fn parses_bare_json() {
        let layout = parse_layout(
            r##"{"backgroundColor": "#112233", "elements": [
                {"type": "text", "x": 1, "y": 2, "w": 3, "h": 4, "content": "hi"}
            ]}"##,
            page(0),
        )
        .unwrap();
        assert_eq!(layout.background_color, "#112233");
        assert_eq!(layout.elements[0].kind, ElementKind::Text);
    }

    #[test]
    fn strips_markdown_fences() {
        let fenced = "```json\n{\"backgroundColor\": \"#FFFFFF\", \"elements\": []}\n```";
        let layout = parse_layout(fenced, page(1)).unwrap();
        assert_eq!(layout.page_index, 1);
        assert!(layout.elements.is_empty());
    }

    #[test]
    fn strips_anonymous_fences() {
        let fenced = "```\n{\"elements\": []}\n```\n";
        assert!(parse_layout(fenced, page(0)).is_ok());
    }

    #[test]
    fn non_json_is_a_schema_violation() {
        let err = parse_layout("I could not analyze this image, sorry!", page(2)).unwrap_err();
        match err {
            AnalysisError::Schema { page, .. } => assert_eq!(page, 3),
            other => panic!("expected Schema, got {other:?}"),
        }
    }

    #[test]
    fn wrong_shape_is_a_schema_violation() {
        let err = parse_layout(r#"{"elements": 42}"#, page(0)).unwrap_err();
        assert!(matches!(err, AnalysisError::Schema { .. }));
    }
}
