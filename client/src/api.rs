//! Typed client for the proxy endpoints, with every call wrapped in
//! [`retry_with_backoff`].

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared_types::{
    ChangeToneRequest, ChangeToneResponse, CorrectRequest, CorrectResponse, ErrorResponse, Tone,
    CHANGE_TONE_PATH, CORRECT_PATH,
};
use tracing::info;

use crate::error::ClientError;
use crate::retry::{retry_with_backoff, RetryPolicy};

/// The two operations the view-model needs from the backend.
#[async_trait]
pub trait TextApi: Send + Sync {
    async fn correct(&self, input_text: &str) -> Result<CorrectResponse, ClientError>;

    async fn change_tone(
        &self,
        input_text: &str,
        tone: &Tone,
    ) -> Result<ChangeToneResponse, ClientError>;
}

pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    policy: RetryPolicy,
}

impl ApiClient {
    /// `base_url` should be like `http://localhost:3000` (no trailing slash).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_policy(base_url, RetryPolicy::default())
    }

    pub fn with_policy(base_url: impl Into<String>, policy: RetryPolicy) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            policy,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST `body` to `path`, retrying any failure, and decode the reply.
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        retry_with_backoff(&self.policy, path, || self.send_once(&url, body)).await
    }

    async fn send_once<B, T>(&self, url: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self.client.post(url).json(body).send().await?;
        let status = resp.status();
        let bytes = resp.bytes().await?;

        if !status.is_success() {
            return Err(ClientError::Server {
                status: status.as_u16(),
                message: describe_http_error(status.as_u16(), &bytes),
            });
        }

        serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))
    }
}

/// The server's `error` message, or the bare status when the body has none.
fn describe_http_error(status: u16, body: &[u8]) -> String {
    serde_json::from_slice::<ErrorResponse>(body)
        .map(|e| e.error)
        .unwrap_or_else(|_| format!("HTTP error! status: {status}"))
}

#[async_trait]
impl TextApi for ApiClient {
    async fn correct(&self, input_text: &str) -> Result<CorrectResponse, ClientError> {
        let request = CorrectRequest {
            input_text: input_text.to_string(),
        };
        let response: CorrectResponse = self.post_json(CORRECT_PATH, &request).await?;
        info!(wrong_words = response.wrong_words.len(), "correction received");
        Ok(response)
    }

    async fn change_tone(
        &self,
        input_text: &str,
        tone: &Tone,
    ) -> Result<ChangeToneResponse, ClientError> {
        let request = ChangeToneRequest {
            input_text: input_text.to_string(),
            tone: tone.as_str().to_string(),
        };
        let response: ChangeToneResponse = self.post_json(CHANGE_TONE_PATH, &request).await?;
        info!(tone = %tone, "tone rewrite received");
        Ok(response)
    }
}
