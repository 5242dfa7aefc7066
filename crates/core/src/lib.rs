//! Core traits and types for the voice conversation orchestrator
//!
//! This crate provides the foundational types used across all other crates:
//! - Message and history types shared by chat and voice mode
//! - Voice session state and the generation guard
//! - Collaborator traits for pluggable platform backends
//!   (recognition, synthesis, answer backend, navigation)
//! - Error types

pub mod error;
pub mod generation;
pub mod message;
pub mod recognition;
pub mod state;
pub mod traits;
pub mod voice;

pub use error::{CoreError, Result};
pub use generation::{Generation, GenerationCounter};
pub use message::{Message, MessageOrigin};
pub use recognition::{RecognitionEvent, RecognitionMode};
pub use state::{AssistantMode, VoiceState};
pub use voice::{VoiceGender, VoiceInfo};

pub use traits::{
    AnswerBackend, BranchContext, DeviceStatusBackend, DeviceStatusCounts, Navigator,
    RecognizerBackend, SynthesizerBackend,
};
