//! Barge-in Listener
//!
//! A second, continuous recognition session that is open only while the
//! Speech Output Manager is playing a queue. Any interim or final result
//! containing the interrupt phrase (case-insensitive substring) cancels the
//! in-flight synthesis, closes this session, and signals the orchestrator.
//!
//! This stays separate from [`crate::SpeechInput`]: that session is
//! single-shot per listening turn while this one must keep recognizing for
//! as long as the assistant speaks.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use ops_voice_core::{RecognitionEvent, RecognitionMode, RecognizerBackend};

use crate::{PipelineError, SpeechOutput};

/// Continuous interrupt-phrase watcher
pub struct BargeInListener {
    backend: Arc<dyn RecognizerBackend>,
    locale: String,
    watcher: Mutex<Option<JoinHandle<()>>>,
}

impl BargeInListener {
    pub fn new(backend: Arc<dyn RecognizerBackend>, locale: impl Into<String>) -> Self {
        Self {
            backend,
            locale: locale.into(),
            watcher: Mutex::new(None),
        }
    }

    /// Open the continuous session and watch for `interrupt_phrase`.
    ///
    /// On a match the listener cancels `output`, closes its own session and
    /// fires `interrupted`. A watcher still running from a previous queue is
    /// stopped first, so at most one barge-in session is open at any
    /// instant.
    pub async fn start_watching(
        &self,
        interrupt_phrase: &str,
        output: Arc<SpeechOutput>,
        interrupted: oneshot::Sender<()>,
    ) -> Result<(), PipelineError> {
        self.stop_watching();

        let mut rx = self
            .backend
            .open(RecognitionMode::Continuous, &self.locale)
            .await?;

        let phrase = interrupt_phrase.to_lowercase();
        let backend = Arc::clone(&self.backend);

        let handle = tokio::spawn(async move {
            let mut interrupted = Some(interrupted);
            while let Some(event) = rx.recv().await {
                if let Some(text) = event.text() {
                    if text.to_lowercase().contains(&phrase) {
                        tracing::info!(heard = %text, "barge-in phrase detected");
                        output.cancel();
                        backend.close();
                        if let Some(tx) = interrupted.take() {
                            let _ = tx.send(());
                        }
                        return;
                    }
                }
                if event.is_terminal() {
                    return;
                }
            }
        });

        *self.watcher.lock() = Some(handle);
        Ok(())
    }

    /// Close the session if one is open. Safe to call repeatedly.
    pub fn stop_watching(&self) {
        if let Some(handle) = self.watcher.lock().take() {
            self.backend.close();
            handle.abort();
        }
    }
}

impl Drop for BargeInListener {
    fn drop(&mut self) {
        if let Some(handle) = self.watcher.lock().take() {
            self.backend.close();
            handle.abort();
        }
    }
}
