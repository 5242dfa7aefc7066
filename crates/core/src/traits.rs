//! Collaborator traits
//!
//! These sit at the platform seam: the orchestrator and pipeline managers are
//! written against them, and the embedding application supplies real
//! implementations (browser speech APIs, REST backend, router). Tests plug in
//! scripted backends.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::recognition::{RecognitionEvent, RecognitionMode};
use crate::voice::VoiceInfo;
use crate::Result;

/// Platform speech recognition backend
///
/// One instance per recognition slot: the orchestrator holds one for the
/// primary (single-shot) session and a second for the continuous barge-in
/// session. At most one session per instance is open at any instant;
/// `open()` while a session is live replaces it.
#[async_trait]
pub trait RecognizerBackend: Send + Sync + 'static {
    /// Open a recognition session and return its event stream.
    ///
    /// The stream terminates with exactly one `Ended` or `Error` event.
    /// Fails with [`crate::CoreError::RecognitionUnavailable`] when the
    /// platform has no speech API.
    async fn open(
        &self,
        mode: RecognitionMode,
        locale: &str,
    ) -> Result<mpsc::Receiver<RecognitionEvent>>;

    /// Close the session if one is open. Best-effort: the platform may still
    /// deliver one trailing event, which is why consumers carry a generation
    /// guard.
    fn close(&self);
}

/// Platform speech synthesis backend
#[async_trait]
pub trait SynthesizerBackend: Send + Sync + 'static {
    /// The platform voice list. Awaits until the list is populated, which on
    /// some platforms happens asynchronously after startup.
    async fn voices(&self) -> Vec<VoiceInfo>;

    /// Speak one utterance with the given voice; resolves when the utterance
    /// completes or is cancelled.
    async fn speak(&self, text: &str, voice: &VoiceInfo) -> Result<()>;

    /// Stop the in-flight utterance. Best-effort, may race with completion.
    fn cancel(&self);
}

/// The REST backend that answers a user query
#[async_trait]
pub trait AnswerBackend: Send + Sync + 'static {
    /// Ask the backend for an answer. Errors are mapped to a fixed apology
    /// message by the orchestrator; they never reach the user raw.
    async fn ask(&self, query: &str, branch_context: &str, language: &str) -> Result<String>;
}

/// Device status counts for one category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeviceStatusCounts {
    pub working: u32,
    pub not_working: u32,
    pub partially_working: u32,
}

impl DeviceStatusCounts {
    pub fn total(&self) -> u32 {
        self.working + self.not_working + self.partially_working
    }
}

/// Device-status collaborator backing the quick-action buttons panel
#[async_trait]
pub trait DeviceStatusBackend: Send + Sync + 'static {
    async fn status(&self, branch_context: &str, category: &str) -> Result<DeviceStatusCounts>;
}

/// Application routing collaborator; fire-and-forget
pub trait Navigator: Send + Sync + 'static {
    fn navigate(&self, path: &str);
}

/// Read-only lookup of the ambient branch context
pub trait BranchContext: Send + Sync + 'static {
    /// Current branch code; may be empty when no branch is selected
    fn current_branch_code(&self) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_status_total() {
        let counts = DeviceStatusCounts {
            working: 5,
            not_working: 2,
            partially_working: 1,
        };
        assert_eq!(counts.total(), 8);
    }
}
