//! HTTP API routes for the tonefix proxy

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::de::DeserializeOwned;
use serde_json::error::Category;
use shared_types::{HealthResponse, CHANGE_TONE_PATH, CORRECT_PATH, HEALTH_PATH};

use crate::error::ApiError;
use crate::AppState;

pub mod changetone;
pub mod correct;

/// Configure all API routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(HEALTH_PATH, get(health_check))
        .route(
            CORRECT_PATH,
            post(correct::correct_text).fallback(method_not_allowed),
        )
        .route(
            CHANGE_TONE_PATH,
            post(changetone::change_tone).fallback(method_not_allowed),
        )
}

async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        upstream_configured: state.config.gemini_api_key.is_some(),
    })
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// Decode a JSON body. Malformed JSON and missing or mistyped fields both
/// map to 400; `missing` is the message used for the latter.
pub(crate) fn parse_body<T: DeserializeOwned>(body: &Bytes, missing: &str) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| match e.classify() {
        Category::Data => ApiError::BadRequest(missing.to_string()),
        Category::Syntax | Category::Eof | Category::Io => {
            ApiError::BadRequest("Request body must be valid JSON".to_string())
        }
    })
}
