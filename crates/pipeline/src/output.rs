//! Speech Output Manager
//!
//! Owns the synthesis side: the memoized voice resolver, the utterance
//! queue, and the per-line speaking sequence. Lines are spoken strictly in
//! order; line N+1 never starts before line N's completion resolves.
//! `cancel()` stops the in-flight utterance and drops the rest of the
//! queue, and once it returns no further per-line completion event from the
//! cancelled queue is emitted.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use once_cell::sync::OnceCell;
use tokio::sync::mpsc;

use ops_voice_config::VoicePreference;
use ops_voice_core::{SynthesizerBackend, VoiceInfo};
use ops_voice_text_processing::strip_for_speech;

use crate::PipelineError;

/// Events emitted while a queue is being spoken
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeakEvent {
    /// Line at `index` finished speaking
    LineSpoken { index: usize },
    /// Every queued line was spoken
    Completed,
    /// The queue was cancelled; remaining lines were dropped
    Cancelled,
    /// Synthesis failed
    Error(String),
}

/// Synthesis queue manager
pub struct SpeechOutput {
    backend: Arc<dyn SynthesizerBackend>,
    locale: String,
    preferences: Vec<VoicePreference>,
    /// Resolved once per process lifetime
    resolved_voice: OnceCell<VoiceInfo>,
    /// Bumped by `cancel()`; a speak task stops as soon as its captured
    /// epoch is superseded
    epoch: AtomicU64,
    speaking: AtomicBool,
}

impl SpeechOutput {
    pub fn new(
        backend: Arc<dyn SynthesizerBackend>,
        locale: impl Into<String>,
        preferences: Vec<VoicePreference>,
    ) -> Self {
        Self {
            backend,
            locale: locale.into(),
            preferences,
            resolved_voice: OnceCell::new(),
            epoch: AtomicU64::new(0),
            speaking: AtomicBool::new(false),
        }
    }

    /// Speak the given lines in order, reporting progress on `events`.
    ///
    /// Returns immediately; the queue plays on a background task. The first
    /// call defers until the platform voice list is populated (the backend's
    /// `voices()` awaits it), after which the chosen voice is memoized.
    pub fn speak(self: &Arc<Self>, lines: Vec<String>, events: mpsc::Sender<SpeakEvent>) {
        let this = Arc::clone(self);
        let queue_epoch = this.epoch.load(Ordering::Acquire);

        tokio::spawn(async move {
            this.speaking.store(true, Ordering::Release);
            this.run_queue(lines, queue_epoch, events).await;
            this.speaking.store(false, Ordering::Release);
        });
    }

    async fn run_queue(
        &self,
        lines: Vec<String>,
        queue_epoch: u64,
        events: mpsc::Sender<SpeakEvent>,
    ) {
        let voice = match self.resolve_voice().await {
            Ok(voice) => voice,
            Err(e) => {
                let _ = events.send(SpeakEvent::Error(e.to_string())).await;
                return;
            }
        };

        for (index, line) in lines.into_iter().enumerate() {
            if self.is_cancelled(queue_epoch) {
                let _ = events.send(SpeakEvent::Cancelled).await;
                return;
            }

            let text = strip_for_speech(&line);
            if text.is_empty() {
                continue;
            }

            tracing::debug!(index, voice = %voice.name, "speaking line");
            if let Err(e) = self.backend.speak(&text, &voice).await {
                let _ = events.send(SpeakEvent::Error(e.to_string())).await;
                return;
            }

            // A cancel that landed mid-utterance must suppress this line's
            // completion event.
            if self.is_cancelled(queue_epoch) {
                let _ = events.send(SpeakEvent::Cancelled).await;
                return;
            }
            let _ = events.send(SpeakEvent::LineSpoken { index }).await;
        }

        if self.is_cancelled(queue_epoch) {
            let _ = events.send(SpeakEvent::Cancelled).await;
        } else {
            let _ = events.send(SpeakEvent::Completed).await;
        }
    }

    /// Stop the in-flight utterance and drop all remaining queued lines
    pub fn cancel(&self) {
        self.epoch.fetch_add(1, Ordering::AcqRel);
        self.backend.cancel();
    }

    /// True while a queue is playing
    pub fn is_speaking(&self) -> bool {
        self.speaking.load(Ordering::Acquire)
    }

    fn is_cancelled(&self, queue_epoch: u64) -> bool {
        self.epoch.load(Ordering::Acquire) != queue_epoch
    }

    /// Resolve the synthesis voice, memoized for the process lifetime.
    ///
    /// Preference order: the configured list (name substring + locale +
    /// gender), then any voice in the target locale, then any voice sharing
    /// the locale's language.
    async fn resolve_voice(&self) -> Result<VoiceInfo, PipelineError> {
        if let Some(voice) = self.resolved_voice.get() {
            return Ok(voice.clone());
        }

        let voices = self.backend.voices().await;
        let picked = pick_voice(&voices, &self.preferences, &self.locale)
            .ok_or_else(|| PipelineError::NoVoice(self.locale.clone()))?;

        tracing::info!(voice = %picked.name, locale = %picked.locale, "resolved synthesis voice");
        Ok(self.resolved_voice.get_or_init(|| picked).clone())
    }
}

fn pick_voice(
    voices: &[VoiceInfo],
    preferences: &[VoicePreference],
    locale: &str,
) -> Option<VoiceInfo> {
    for pref in preferences {
        let found = voices.iter().find(|v| {
            v.matches_locale(&pref.locale)
                && v.name.to_lowercase().contains(&pref.name_contains.to_lowercase())
                && pref.gender.map_or(true, |g| v.gender == g)
        });
        if let Some(voice) = found {
            return Some(voice.clone());
        }
    }

    if let Some(voice) = voices.iter().find(|v| v.matches_locale(locale)) {
        return Some(voice.clone());
    }

    let language = locale.split('-').next().unwrap_or(locale).to_lowercase();
    voices
        .iter()
        .find(|v| v.locale.to_lowercase().starts_with(&language))
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::InstantSynthesizer;
    use ops_voice_core::VoiceGender;
    use std::time::Duration;

    fn preferences() -> Vec<VoicePreference> {
        vec![VoicePreference {
            name_contains: "Test".to_string(),
            locale: "en-IN".to_string(),
            gender: Some(VoiceGender::Female),
        }]
    }

    #[tokio::test]
    async fn test_lines_spoken_in_order() {
        let backend = Arc::new(InstantSynthesizer::new());
        let output = Arc::new(SpeechOutput::new(backend.clone(), "en-IN", preferences()));

        let (tx, mut rx) = mpsc::channel(16);
        output.speak(vec!["one".into(), "two".into(), "three".into()], tx);

        let mut seen = Vec::new();
        while let Some(event) = rx.recv().await {
            let done = event == SpeakEvent::Completed;
            seen.push(event);
            if done {
                break;
            }
        }

        assert_eq!(
            seen,
            vec![
                SpeakEvent::LineSpoken { index: 0 },
                SpeakEvent::LineSpoken { index: 1 },
                SpeakEvent::LineSpoken { index: 2 },
                SpeakEvent::Completed,
            ]
        );
        assert_eq!(backend.spoken(), vec!["one", "two", "three"]);
    }

    #[tokio::test]
    async fn test_cancel_drops_remaining_lines() {
        let backend = Arc::new(InstantSynthesizer::with_line_delay(Duration::from_millis(50)));
        let output = Arc::new(SpeechOutput::new(backend.clone(), "en-IN", preferences()));

        let (tx, mut rx) = mpsc::channel(16);
        output.speak(vec!["one".into(), "two".into(), "three".into()], tx);

        // Let line 1 complete, then cancel during line 2.
        let first = rx.recv().await.unwrap();
        assert_eq!(first, SpeakEvent::LineSpoken { index: 0 });
        output.cancel();

        let next = rx.recv().await.unwrap();
        assert_eq!(next, SpeakEvent::Cancelled);
        assert!(rx.recv().await.is_none());

        // Lines 2 and 3 never completed.
        assert_eq!(backend.spoken(), vec!["one"]);
    }

    #[tokio::test]
    async fn test_empty_lines_are_skipped() {
        let backend = Arc::new(InstantSynthesizer::new());
        let output = Arc::new(SpeechOutput::new(backend.clone(), "en-IN", preferences()));

        let (tx, mut rx) = mpsc::channel(16);
        output.speak(vec!["   ".into(), "hello".into()], tx);

        assert_eq!(rx.recv().await.unwrap(), SpeakEvent::LineSpoken { index: 1 });
        assert_eq!(rx.recv().await.unwrap(), SpeakEvent::Completed);
        assert_eq!(backend.spoken(), vec!["hello"]);
    }

    #[test]
    fn test_voice_resolution_fallback_order() {
        let voices = vec![
            VoiceInfo::new("Other Hindi", "hi-IN", VoiceGender::Male),
            VoiceInfo::new("Plain English", "en-IN", VoiceGender::Male),
            VoiceInfo::new("Test Female", "en-IN", VoiceGender::Female),
        ];

        // Preference hit
        let picked = pick_voice(&voices, &preferences(), "en-IN").unwrap();
        assert_eq!(picked.name, "Test Female");

        // No preference match: any voice in the target locale
        let picked = pick_voice(&voices, &[], "en-IN").unwrap();
        assert_eq!(picked.locale, "en-IN");

        // Language-only fallback
        let picked = pick_voice(&voices, &[], "en-GB").unwrap();
        assert!(picked.locale.starts_with("en"));

        // Nothing at all
        assert!(pick_voice(&voices, &[], "ta-IN").is_none());
    }
}
