//! Assistant mode and voice session state

use serde::{Deserialize, Serialize};

/// Which surface the assistant is presenting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AssistantMode {
    /// Typed chat; each user message is one ask round-trip, no state machine
    #[default]
    Chat,
    /// Spoken conversation driven by the voice state machine
    Voice,
}

/// Voice conversation state
///
/// Exactly one value at any time. Transitions are owned by the orchestrator;
/// sub-managers only report events and never mutate this directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VoiceState {
    /// Voice mode not active
    #[default]
    Idle,
    /// Speaking the greeting line
    Greeting,
    /// Primary recognition open, waiting for the user's turn
    Listening,
    /// Backend ask request outstanding; no recognition session open
    Processing,
    /// Speaking queued response lines, barge-in listener watching
    Speaking,
    /// Listening again after at least one answered turn
    Followup,
    /// Listening halted (error or post-navigation); explicit restart required
    Stopped,
}

impl VoiceState {
    /// True while a primary recognition session should be open
    pub fn is_listening(&self) -> bool {
        matches!(self, VoiceState::Listening | VoiceState::Followup)
    }
}

impl std::fmt::Display for VoiceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            VoiceState::Idle => "idle",
            VoiceState::Greeting => "greeting",
            VoiceState::Listening => "listening",
            VoiceState::Processing => "processing",
            VoiceState::Speaking => "speaking",
            VoiceState::Followup => "followup",
            VoiceState::Stopped => "stopped",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_listening() {
        assert!(VoiceState::Listening.is_listening());
        assert!(VoiceState::Followup.is_listening());
        assert!(!VoiceState::Speaking.is_listening());
        assert!(!VoiceState::Idle.is_listening());
    }
}
