//! Scripted backends for tests
//!
//! Counterparts of a real platform's speech APIs: the recognizer replays a
//! pre-written event script per session, the synthesizer completes
//! utterances instantly (or after a fixed delay) and records what it spoke.
//! Used by this crate's tests and by the orchestrator integration tests.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::{mpsc, Notify};

use ops_voice_core::{
    CoreError, RecognitionEvent, RecognitionMode, RecognizerBackend, Result, SynthesizerBackend,
    VoiceGender, VoiceInfo,
};

/// Recognizer that replays one event script per `open()` call.
///
/// A script that ends without a terminal event leaves the session open until
/// `close()`, which then delivers `Ended` — matching how a platform session
/// behaves when nothing is spoken.
pub struct ScriptedRecognizer {
    scripts: Mutex<VecDeque<Vec<RecognitionEvent>>>,
    current: Mutex<Option<Arc<Notify>>>,
    unavailable: bool,
}

impl ScriptedRecognizer {
    pub fn new(scripts: Vec<Vec<RecognitionEvent>>) -> Self {
        Self {
            scripts: Mutex::new(scripts.into()),
            current: Mutex::new(None),
            unavailable: false,
        }
    }

    /// A recognizer standing in for a platform without speech APIs
    pub fn unavailable() -> Self {
        Self {
            scripts: Mutex::new(VecDeque::new()),
            current: Mutex::new(None),
            unavailable: true,
        }
    }

    /// Number of scripts not yet consumed
    pub fn remaining_scripts(&self) -> usize {
        self.scripts.lock().len()
    }
}

#[async_trait]
impl RecognizerBackend for ScriptedRecognizer {
    async fn open(
        &self,
        _mode: RecognitionMode,
        _locale: &str,
    ) -> Result<mpsc::Receiver<RecognitionEvent>> {
        if self.unavailable {
            return Err(CoreError::RecognitionUnavailable);
        }

        let script = self.scripts.lock().pop_front().unwrap_or_default();
        let closed = Arc::new(Notify::new());
        *self.current.lock() = Some(Arc::clone(&closed));

        let (tx, rx) = mpsc::channel(32);
        tokio::spawn(async move {
            for event in script {
                let terminal = event.is_terminal();
                tokio::select! {
                    _ = closed.notified() => {
                        let _ = tx.send(RecognitionEvent::Ended).await;
                        return;
                    }
                    sent = tx.send(event) => {
                        if sent.is_err() {
                            return;
                        }
                    }
                }
                if terminal {
                    return;
                }
            }

            // Script exhausted without a terminal event: stay open.
            closed.notified().await;
            let _ = tx.send(RecognitionEvent::Ended).await;
        });

        Ok(rx)
    }

    fn close(&self) {
        if let Some(notify) = self.current.lock().take() {
            // notify_one stores a permit, so a close racing the script
            // playback is not lost.
            notify.notify_one();
        }
    }
}

/// Synthesizer that resolves utterances immediately (or after a fixed
/// per-line delay) and records every line it finished speaking.
pub struct InstantSynthesizer {
    voices: Vec<VoiceInfo>,
    spoken: Mutex<Vec<String>>,
    line_delay: Duration,
    cancelled: Notify,
}

impl InstantSynthesizer {
    pub fn new() -> Self {
        Self::with_line_delay(Duration::ZERO)
    }

    pub fn with_line_delay(line_delay: Duration) -> Self {
        Self {
            voices: vec![VoiceInfo::new("Test Female", "en-IN", VoiceGender::Female)],
            spoken: Mutex::new(Vec::new()),
            line_delay,
            cancelled: Notify::new(),
        }
    }

    pub fn with_voices(mut self, voices: Vec<VoiceInfo>) -> Self {
        self.voices = voices;
        self
    }

    /// Lines whose utterances ran to completion
    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().clone()
    }
}

impl Default for InstantSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SynthesizerBackend for InstantSynthesizer {
    async fn voices(&self) -> Vec<VoiceInfo> {
        self.voices.clone()
    }

    async fn speak(&self, text: &str, _voice: &VoiceInfo) -> Result<()> {
        if self.line_delay.is_zero() {
            self.spoken.lock().push(text.to_string());
            return Ok(());
        }

        tokio::select! {
            _ = tokio::time::sleep(self.line_delay) => {
                self.spoken.lock().push(text.to_string());
            }
            _ = self.cancelled.notified() => {}
        }
        Ok(())
    }

    fn cancel(&self) {
        // Wake only an in-flight utterance; no permit is stored for lines
        // that have not started.
        self.cancelled.notify_waiters();
    }
}
