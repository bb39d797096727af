//! Shared types between the proxy and its clients
//!
//! These types are used by both:
//! - the axum proxy (`server`)
//! - the Rust client and CLI (`client`)
//!
//! TypeScript bindings are written to `shared-types/bindings/tonefix.ts` for
//! browser front ends.
//! Field names are camelCase on the wire.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ============================================================================
// Endpoints
// ============================================================================

pub const CORRECT_PATH: &str = "/api/correct";
pub const CHANGE_TONE_PATH: &str = "/api/changetone";
pub const HEALTH_PATH: &str = "/health";

// ============================================================================
// Correction
// ============================================================================

/// Body of `POST /api/correct`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "tonefix.ts")]
pub struct CorrectRequest {
    pub input_text: String,
}

/// Successful reply of `POST /api/correct`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "tonefix.ts")]
pub struct CorrectResponse {
    /// Full corrected version of the input
    pub corrected_text: String,

    /// Exact substrings of the original input that were changed.
    /// May contain duplicates.
    pub wrong_words: Vec<String>,
}

// ============================================================================
// Tone rewrite
// ============================================================================

/// Body of `POST /api/changetone`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "tonefix.ts")]
pub struct ChangeToneRequest {
    pub input_text: String,

    /// Tone label. Any string is accepted, see [`Tone::from_label`].
    pub tone: String,
}

/// Successful reply of `POST /api/changetone`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "tonefix.ts")]
pub struct ChangeToneResponse {
    pub new_text: String,
}

/// Tone a rewrite is asked for
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Tone {
    Professional,
    Friendly,
    Concise,
    /// Unrecognised label, kept verbatim
    Other(String),
}

impl Tone {
    pub fn from_label(label: &str) -> Self {
        match label {
            "professional" => Self::Professional,
            "friendly" => Self::Friendly,
            "concise" => Self::Concise,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Professional => "professional",
            Self::Friendly => "friendly",
            Self::Concise => "concise",
            Self::Other(label) => label,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl std::fmt::Display for Tone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Errors & health
// ============================================================================

/// Body of every non-2xx reply from the proxy
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, TS)]
#[ts(export, export_to = "tonefix.ts")]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Reply of `GET /health`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "tonefix.ts")]
pub struct HealthResponse {
    pub status: String,
    pub upstream_configured: bool,
}
