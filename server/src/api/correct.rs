//! `POST /api/correct`: proofread text and report the words that changed.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use shared_types::{CorrectRequest, CorrectResponse};
use tracing::info;

use super::parse_body;
use crate::error::ApiError;
use crate::prompts::{correction_schema, PROOFREADER_INSTRUCTION};
use crate::upstream::{GenerateContentRequest, UpstreamError};
use crate::AppState;

const INPUT_REQUIRED: &str = "inputText is required";

pub async fn correct_text(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<CorrectResponse>, ApiError> {
    let req: CorrectRequest = parse_body(&body, INPUT_REQUIRED)?;
    if req.input_text.trim().is_empty() {
        return Err(ApiError::BadRequest(INPUT_REQUIRED.to_string()));
    }

    let api_key = state.api_key()?;

    let request = GenerateContentRequest::plain(PROOFREADER_INSTRUCTION, &req.input_text)
        .with_json_schema(correction_schema());
    let response = state.upstream.generate(api_key, &request).await?;

    if response.is_safety_blocked() {
        return Err(UpstreamError::Blocked.into());
    }

    let text = response
        .first_text()
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| {
            UpstreamError::InvalidResponse("Invalid response structure from Gemini API.".to_string())
        })?;

    let result = parse_correction(text)?;
    info!(
        input_chars = req.input_text.chars().count(),
        wrong_words = result.wrong_words.len(),
        "correction complete"
    );
    Ok(Json(result))
}

/// Both fields are required; a reply missing either is an upstream failure.
fn parse_correction(text: &str) -> Result<CorrectResponse, UpstreamError> {
    serde_json::from_str(text.trim()).map_err(|e| {
        UpstreamError::InvalidResponse(format!(
            "Gemini API returned a malformed correction: {e}"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_correction_accepts_schema_output() {
        let result =
            parse_correction(r#" {"correctedText":"This is a test","wrongWords":["Ths","tst"]} "#)
                .unwrap();
        assert_eq!(result.corrected_text, "This is a test");
        assert_eq!(result.wrong_words, vec!["Ths", "tst"]);
    }

    #[test]
    fn parse_correction_accepts_empty_values() {
        let result = parse_correction(r#"{"correctedText":"","wrongWords":[]}"#).unwrap();
        assert_eq!(result.corrected_text, "");
        assert!(result.wrong_words.is_empty());
    }

    #[test]
    fn parse_correction_rejects_missing_fields() {
        let err = parse_correction(r#"{"correctedText":"This is a test"}"#).unwrap_err();
        assert!(matches!(err, UpstreamError::InvalidResponse(_)));

        let err = parse_correction(r#"{"wrongWords":["tst"]}"#).unwrap_err();
        assert!(matches!(err, UpstreamError::InvalidResponse(_)));
    }

    #[test]
    fn parse_correction_rejects_non_json() {
        let err = parse_correction("This is a test").unwrap_err();
        assert!(err.to_string().contains("malformed correction"));
    }
}
