use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    /// Rejected locally, nothing was sent
    #[error("{0}")]
    Validation(String),

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status; `message` is the server's `error` field when present
    #[error("{message}")]
    Server { status: u16, message: String },

    #[error("Failed to parse JSON: {0}")]
    Decode(String),

    /// Displays as the last underlying error
    #[error("{source}")]
    RetryExhausted {
        retries: u32,
        source: Box<ClientError>,
    },
}

impl ClientError {
    /// The error that ended the last attempt.
    pub fn last_error(&self) -> &ClientError {
        match self {
            Self::RetryExhausted { source, .. } => source.last_error(),
            other => other,
        }
    }

    /// HTTP status of the last attempt, if it got that far.
    pub fn status(&self) -> Option<u16> {
        match self.last_error() {
            Self::Server { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
