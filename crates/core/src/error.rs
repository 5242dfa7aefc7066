//! Error types shared across the workspace

use thiserror::Error;

/// Core error type
#[derive(Debug, Error)]
pub enum CoreError {
    /// The platform has no speech recognition API at all.
    /// Surfaced once, then the voice feature is disabled for the session.
    #[error("speech recognition is not available on this platform")]
    RecognitionUnavailable,

    /// A recognition session failed mid-turn (recoverable via user restart)
    #[error("recognition error: {0}")]
    Recognition(String),

    /// Speech synthesis failed
    #[error("synthesis error: {0}")]
    Synthesis(String),

    /// The answer backend returned a non-2xx status or malformed payload
    #[error("backend error: {0}")]
    Backend(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
