//! Speech pipeline managers
//!
//! Three cooperating managers sit between the platform speech backends and
//! the conversation state machine:
//! - [`SpeechInput`] — the single-shot primary recognition session for one
//!   listening turn, with live caption accumulation
//! - [`BargeInListener`] — a second, continuous recognition session that
//!   watches for the interrupt phrase while speech output is playing
//! - [`SpeechOutput`] — the synthesis queue: memoized voice resolution,
//!   strictly sequential per-line speaking, and cancellation
//!
//! The primary session is single-shot and the barge-in session is
//! continuous; they are separate managers over separate backend instances
//! and are never folded into one.

pub mod barge_in;
pub mod input;
pub mod output;
pub mod testing;

pub use barge_in::BargeInListener;
pub use input::{ListenOutcome, SpeechInput};
pub use output::{SpeakEvent, SpeechOutput};

use thiserror::Error;

/// Pipeline error type
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("recognition error: {0}")]
    Recognition(String),

    #[error("synthesis error: {0}")]
    Synthesis(String),

    #[error("no synthesis voice available for locale {0}")]
    NoVoice(String),

    #[error(transparent)]
    Core(#[from] ops_voice_core::CoreError),
}
