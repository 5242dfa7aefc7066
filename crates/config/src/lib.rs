//! Settings for the voice conversation orchestrator
//!
//! Loaded from `ops-voice.toml` with an `OPS_VOICE_*` environment overlay.
//! Everything has a default so the assistant runs without any config file.

mod settings;

pub use settings::{
    AssistantSettings, BackendConfig, CommandMapping, VoicePreference,
};

use thiserror::Error;

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
