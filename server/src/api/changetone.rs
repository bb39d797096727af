//! `POST /api/changetone`: rewrite text in a requested tone.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use shared_types::{ChangeToneRequest, ChangeToneResponse, Tone};
use tracing::{info, warn};

use super::parse_body;
use crate::error::ApiError;
use crate::prompts::tone_instruction;
use crate::upstream::{GenerateContentRequest, UpstreamError};
use crate::AppState;

const FIELDS_REQUIRED: &str = "inputText and tone are required";

pub async fn change_tone(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<ChangeToneResponse>, ApiError> {
    let req: ChangeToneRequest = parse_body(&body, FIELDS_REQUIRED)?;
    if req.input_text.trim().is_empty() || req.tone.trim().is_empty() {
        return Err(ApiError::BadRequest(FIELDS_REQUIRED.to_string()));
    }

    let api_key = state.api_key()?;

    let tone = Tone::from_label(&req.tone);
    if !tone.is_known() {
        warn!(tone = %tone, "unknown tone received, using generic instruction");
    }

    // Plain text output, no schema
    let request = GenerateContentRequest::plain(&tone_instruction(&tone), &req.input_text);
    let response = state.upstream.generate(api_key, &request).await?;

    if response.is_safety_blocked() {
        return Err(UpstreamError::Blocked.into());
    }

    // An empty rewrite is valid; only a structurally absent text is not.
    let Some(new_text) = response.first_text() else {
        return Err(UpstreamError::InvalidResponse(
            "Invalid response structure from Gemini API (missing text).".to_string(),
        )
        .into());
    };

    info!(tone = %tone, output_chars = new_text.chars().count(), "tone rewrite complete");
    Ok(Json(ChangeToneResponse {
        new_text: new_text.trim().to_string(),
    }))
}
