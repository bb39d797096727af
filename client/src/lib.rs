//! Tonefix client
//!
//! - [`retry`]: exponential-backoff retry for any async call
//! - [`api`]: typed client for `/api/correct` and `/api/changetone`
//! - [`highlight`]: HTML rendering of the input with corrected words marked
//! - [`controller`]: view-model driving a correction UI

pub mod api;
pub mod controller;
pub mod error;
pub mod highlight;
pub mod retry;

pub use api::{ApiClient, TextApi};
pub use controller::{Controller, Outcome, Phase, View};
pub use error::ClientError;
pub use retry::{retry_with_backoff, RetryPolicy};
