//! Speech Input Manager
//!
//! Owns the primary recognition session: single-shot, interim results
//! enabled, fixed locale. One `start()` yields exactly one
//! [`ListenOutcome`] — either the final transcript (possibly empty) or a
//! failure — never both, never twice. Partial results are republished as an
//! accumulated caption (finalized segments plus the latest interim) on a
//! watch channel for live display.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot, watch};

use ops_voice_core::{RecognitionEvent, RecognitionMode, RecognizerBackend};

use crate::PipelineError;

/// Terminal result of one listening turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListenOutcome {
    /// Final transcript; empty when the session ended without speech
    Transcript(String),
    /// The platform reported a recognition error
    Failed(String),
}

/// Primary recognition session manager
pub struct SpeechInput {
    backend: Arc<dyn RecognizerBackend>,
    locale: String,
    caption_tx: watch::Sender<String>,
    /// Guards the single-session invariant
    session_open: Mutex<bool>,
}

impl SpeechInput {
    pub fn new(backend: Arc<dyn RecognizerBackend>, locale: impl Into<String>) -> Self {
        let (caption_tx, _) = watch::channel(String::new());
        Self {
            backend,
            locale: locale.into(),
            caption_tx,
            session_open: Mutex::new(false),
        }
    }

    /// Subscribe to the live caption
    pub fn caption(&self) -> watch::Receiver<String> {
        self.caption_tx.subscribe()
    }

    /// Open a single-shot session for one listening turn.
    ///
    /// Any session still open from a previous turn is closed first, keeping
    /// at most one primary session alive at any instant.
    pub async fn start(&self) -> Result<oneshot::Receiver<ListenOutcome>, PipelineError> {
        {
            let mut open = self.session_open.lock();
            if *open {
                self.backend.close();
            }
            *open = true;
        }

        let rx = self
            .backend
            .open(RecognitionMode::SingleShot, &self.locale)
            .await?;

        let (outcome_tx, outcome_rx) = oneshot::channel();
        let caption_tx = self.caption_tx.clone();
        let _ = caption_tx.send(String::new());

        tokio::spawn(accumulate_turn(rx, caption_tx, outcome_tx));

        Ok(outcome_rx)
    }

    /// Close the session if one is open. The backend may deliver one
    /// trailing event; the orchestrator's generation guard drops it.
    pub fn stop(&self) {
        let mut open = self.session_open.lock();
        if *open {
            self.backend.close();
            *open = false;
        }
    }
}

/// Consume one session's events: accumulate finalized segments plus the
/// latest interim for the caption, and resolve the turn exactly once.
async fn accumulate_turn(
    mut rx: mpsc::Receiver<RecognitionEvent>,
    caption_tx: watch::Sender<String>,
    outcome_tx: oneshot::Sender<ListenOutcome>,
) {
    let mut finals: Vec<String> = Vec::new();
    let mut interim = String::new();

    while let Some(event) = rx.recv().await {
        match event {
            RecognitionEvent::Interim(text) => {
                interim = text;
                let _ = caption_tx.send(join_caption(&finals, &interim));
            }
            RecognitionEvent::FinalSegment(text) => {
                if !text.trim().is_empty() {
                    finals.push(text.trim().to_string());
                }
                interim.clear();
                let _ = caption_tx.send(join_caption(&finals, &interim));
            }
            RecognitionEvent::Ended => {
                let transcript = finals.join(" ");
                tracing::debug!(transcript = %transcript, "listening turn ended");
                let _ = outcome_tx.send(ListenOutcome::Transcript(transcript));
                return;
            }
            RecognitionEvent::Error(reason) => {
                tracing::warn!(reason = %reason, "recognition session failed");
                let _ = outcome_tx.send(ListenOutcome::Failed(reason));
                return;
            }
        }
    }

    // Channel dropped without a terminal event: treat as an ended turn so
    // the exactly-once guarantee still holds.
    let _ = outcome_tx.send(ListenOutcome::Transcript(finals.join(" ")));
}

fn join_caption(finals: &[String], interim: &str) -> String {
    if interim.is_empty() {
        finals.join(" ")
    } else if finals.is_empty() {
        interim.to_string()
    } else {
        format!("{} {}", finals.join(" "), interim)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedRecognizer;

    #[tokio::test]
    async fn test_single_turn_accumulates_finals() {
        let recognizer = Arc::new(ScriptedRecognizer::new(vec![vec![
            RecognitionEvent::Interim("open".into()),
            RecognitionEvent::Interim("open dash".into()),
            RecognitionEvent::FinalSegment("open dashboard".into()),
            RecognitionEvent::Ended,
        ]]));

        let input = SpeechInput::new(recognizer, "en-IN");
        let outcome = input.start().await.unwrap().await.unwrap();
        assert_eq!(outcome, ListenOutcome::Transcript("open dashboard".into()));
    }

    #[tokio::test]
    async fn test_caption_tracks_interims() {
        let recognizer = Arc::new(ScriptedRecognizer::new(vec![vec![
            RecognitionEvent::FinalSegment("show".into()),
            RecognitionEvent::Interim("alerts".into()),
            RecognitionEvent::Ended,
        ]]));

        let input = SpeechInput::new(recognizer, "en-IN");
        let mut caption = input.caption();
        let outcome_rx = input.start().await.unwrap();

        // Wait for the turn to finish, then inspect the last caption value.
        let outcome = outcome_rx.await.unwrap();
        assert_eq!(outcome, ListenOutcome::Transcript("show".into()));

        caption.mark_changed();
        let seen = caption.borrow_and_update().clone();
        assert!(seen == "show alerts" || seen == "show");
    }

    #[tokio::test]
    async fn test_error_yields_failed_outcome() {
        let recognizer = Arc::new(ScriptedRecognizer::new(vec![vec![
            RecognitionEvent::Error("no-speech".into()),
        ]]));

        let input = SpeechInput::new(recognizer, "en-IN");
        let outcome = input.start().await.unwrap().await.unwrap();
        assert_eq!(outcome, ListenOutcome::Failed("no-speech".into()));
    }

    #[tokio::test]
    async fn test_empty_turn_yields_empty_transcript() {
        let recognizer = Arc::new(ScriptedRecognizer::new(vec![vec![RecognitionEvent::Ended]]));
        let input = SpeechInput::new(recognizer, "en-IN");
        let outcome = input.start().await.unwrap().await.unwrap();
        assert_eq!(outcome, ListenOutcome::Transcript(String::new()));
    }
}
