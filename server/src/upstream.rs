//! Client for the upstream text model (Gemini `generateContent`).
//!
//! Both proxies issue exactly one call through [`UpstreamClient::generate`];
//! retrying is left to the caller of the proxy.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;

const API_KEY_HEADER: &str = "x-goog-api-key";
const SAFETY_FINISH_REASON: &str = "SAFETY";

#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("Gemini API request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Non-success status; `message` comes from the upstream error envelope
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error("{0}")]
    InvalidResponse(String),
    #[error("The request was blocked due to safety concerns. Please modify your input.")]
    Blocked,
}

// ============================================================================
// Request payload
// ============================================================================

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub system_instruction: Content,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Content {
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Part {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_mime_type: String,
    pub response_schema: serde_json::Value,
}

impl Content {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            parts: vec![Part { text: text.into() }],
        }
    }
}

impl GenerateContentRequest {
    /// User text plus a system instruction, free-form text output.
    pub fn plain(system_instruction: &str, input_text: &str) -> Self {
        Self {
            contents: vec![Content::text(input_text)],
            system_instruction: Content::text(system_instruction),
            generation_config: None,
        }
    }

    /// Ask for JSON output conforming to `schema`.
    pub fn with_json_schema(mut self, schema: serde_json::Value) -> Self {
        self.generation_config = Some(GenerationConfig {
            response_mime_type: "application/json".to_string(),
            response_schema: schema,
        });
        self
    }
}

// ============================================================================
// Response payload
// ============================================================================

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponsePart {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Text of the first part of the first candidate, `None` when structurally absent.
    pub fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .first()?
            .text
            .as_deref()
    }

    /// True when the prompt or the first candidate was stopped by safety filters.
    pub fn is_safety_blocked(&self) -> bool {
        let prompt_blocked = self
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
            .is_some();
        let candidate_blocked = self
            .candidates
            .first()
            .and_then(|c| c.finish_reason.as_deref())
            == Some(SAFETY_FINISH_REASON);
        prompt_blocked || candidate_blocked
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

// ============================================================================
// Client
// ============================================================================

#[derive(Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl UpstreamClient {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.upstream_timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: config.gemini_base_url.clone(),
            model: config.gemini_model.clone(),
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    /// Issue one `generateContent` call.
    ///
    /// The key travels in a header so it never appears in URLs, logs or
    /// `reqwest` error messages.
    pub async fn generate(
        &self,
        api_key: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, UpstreamError> {
        let url = self.endpoint();
        debug!(url = %url, structured = request.generation_config.is_some(), "calling upstream model");

        let resp = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, api_key)
            .json(request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.bytes().await.unwrap_or_default();
            let message = serde_json::from_slice::<ErrorEnvelope>(&body)
                .ok()
                .and_then(|env| env.error)
                .and_then(|e| e.message)
                .unwrap_or_else(|| {
                    format!("Gemini API failed with status {}", status.as_u16())
                });
            warn!(status = status.as_u16(), message = %message, "Gemini API error");
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                message,
            });
        }

        resp.json::<GenerateContentResponse>().await.map_err(|e| {
            UpstreamError::InvalidResponse(format!("Failed to decode Gemini API response: {e}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plain_request_omits_generation_config() {
        let req = GenerateContentRequest::plain("be brief", "hello");
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(
            value,
            json!({
                "contents": [{ "parts": [{ "text": "hello" }] }],
                "systemInstruction": { "parts": [{ "text": "be brief" }] }
            })
        );
    }

    #[test]
    fn schema_request_sets_json_mime_type() {
        let req = GenerateContentRequest::plain("fix", "txt")
            .with_json_schema(json!({ "type": "OBJECT" }));
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(
            value["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(value["generationConfig"]["responseSchema"]["type"], "OBJECT");
    }

    #[test]
    fn first_text_distinguishes_absent_from_empty() {
        let empty: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{ "content": { "parts": [{ "text": "" }] } }]
        }))
        .unwrap();
        assert_eq!(empty.first_text(), Some(""));

        let absent: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{ "content": { "parts": [{}] } }]
        }))
        .unwrap();
        assert_eq!(absent.first_text(), None);

        let no_candidates: GenerateContentResponse =
            serde_json::from_value(json!({})).unwrap();
        assert_eq!(no_candidates.first_text(), None);
    }

    #[test]
    fn safety_block_detection() {
        let finish: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{ "finishReason": "SAFETY" }]
        }))
        .unwrap();
        assert!(finish.is_safety_blocked());

        let prompt: GenerateContentResponse = serde_json::from_value(json!({
            "promptFeedback": { "blockReason": "OTHER" }
        }))
        .unwrap();
        assert!(prompt.is_safety_blocked());

        let ok: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{ "finishReason": "STOP", "content": { "parts": [{ "text": "hi" }] } }]
        }))
        .unwrap();
        assert!(!ok.is_safety_blocked());
    }

    #[test]
    fn endpoint_includes_model_but_not_key() {
        let config = Config::for_upstream("http://127.0.0.1:9/v1beta", Some("secret".into()));
        let client = UpstreamClient::from_config(&config).unwrap();
        let endpoint = client.endpoint();
        assert!(endpoint.ends_with(":generateContent"));
        assert!(endpoint.contains(&config.gemini_model));
        assert!(!endpoint.contains("secret"));
    }
}
