//! HTTP clients for the assistant's REST collaborators
//!
//! Two thin clients over the operations backend:
//! - [`AskClient`] — POST a user query, get the answer text
//! - [`DeviceStatusClient`] — GET working/not-working counts per category
//!
//! Failures (network, non-2xx, malformed JSON) surface as [`ClientError`];
//! the orchestrator maps them to its fixed apology message, so raw errors
//! never reach the user.

mod ask;
mod device_status;

pub use ask::AskClient;
pub use device_status::DeviceStatusClient;

use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Network(String),

    #[error("backend returned status {0}")]
    Status(u16),

    #[error("malformed response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Network(err.to_string())
    }
}

impl From<ClientError> for ops_voice_core::CoreError {
    fn from(err: ClientError) -> Self {
        ops_voice_core::CoreError::Backend(err.to_string())
    }
}
