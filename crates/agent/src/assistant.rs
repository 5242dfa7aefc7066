//! Conversation state machine
//!
//! [`VoiceAssistant`] owns every state transition. The pipeline managers
//! (speech input, speech output, barge-in) report events but never mutate
//! conversation state themselves. A voice conversation runs as one spawned
//! loop per activation: greet, then listen-route-answer-speak turns until a
//! halt (navigation, close, error) or a generation bump ends it.
//!
//! Every await point in the loop re-checks the generation captured at
//! activation; a bump (close, mode switch) makes the loop unwind without
//! touching the logs, which is what keeps late platform callbacks from
//! bleeding into a newer session.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;

use ops_voice_config::AssistantSettings;
use ops_voice_core::{
    AnswerBackend, AssistantMode, BranchContext, CoreError, DeviceStatusBackend, Generation,
    GenerationCounter, Message, Navigator, RecognizerBackend, SynthesizerBackend, VoiceState,
};
use ops_voice_pipeline::{
    BargeInListener, ListenOutcome, PipelineError, SpeakEvent, SpeechInput, SpeechOutput,
};
use ops_voice_text_processing::{normalize_spoken, speech_lines};

use crate::{CommandRouter, HistoryStore};

/// Events published to the presentation layer
#[derive(Debug, Clone)]
pub enum AssistantEvent {
    StateChanged {
        from: VoiceState,
        to: VoiceState,
    },
    MessageAppended {
        mode: AssistantMode,
        message: Message,
    },
    /// Live caption while the primary recognition session is open
    Caption(String),
    Navigated {
        path: String,
    },
    /// The widget was closed; voice log cleared, generation bumped
    Closed,
}

/// Platform and backend collaborators handed to the assistant at startup
pub struct AssistantBackends {
    /// Primary (single-shot) recognition slot
    pub recognizer: Arc<dyn RecognizerBackend>,
    /// Continuous recognition slot for the barge-in watcher
    pub interrupt_recognizer: Arc<dyn RecognizerBackend>,
    pub synthesizer: Arc<dyn SynthesizerBackend>,
    pub answers: Arc<dyn AnswerBackend>,
    pub device_status: Arc<dyn DeviceStatusBackend>,
    pub navigator: Arc<dyn Navigator>,
    pub branch: Arc<dyn BranchContext>,
}

/// How one spoken queue ended
enum SpeakResult {
    Finished,
    Skipped,
    Failed(String),
}

/// Whether the conversation loop keeps listening after a turn
enum TurnFlow {
    Continue,
    Halted,
}

/// The dual-mode conversation orchestrator
pub struct VoiceAssistant {
    settings: AssistantSettings,
    router: CommandRouter,
    history: HistoryStore,
    generations: Arc<GenerationCounter>,
    input: SpeechInput,
    output: Arc<SpeechOutput>,
    barge_in: BargeInListener,
    answers: Arc<dyn AnswerBackend>,
    device_status: Arc<dyn DeviceStatusBackend>,
    navigator: Arc<dyn Navigator>,
    branch: Arc<dyn BranchContext>,
    mode: Mutex<AssistantMode>,
    state: Mutex<VoiceState>,
    /// Listening turns after the first answered one present as Followup
    answered_turns: AtomicU32,
    events: broadcast::Sender<AssistantEvent>,
}

impl VoiceAssistant {
    pub fn new(settings: AssistantSettings, backends: AssistantBackends) -> Self {
        let generations = Arc::new(GenerationCounter::new());
        let (events, _) = broadcast::channel(64);

        let router = CommandRouter::new(settings.commands.clone(), settings.close_phrases.clone());
        let input = SpeechInput::new(backends.recognizer, settings.locale.clone());
        let output = Arc::new(SpeechOutput::new(
            backends.synthesizer,
            settings.locale.clone(),
            settings.voice_preferences.clone(),
        ));
        let barge_in = BargeInListener::new(backends.interrupt_recognizer, settings.locale.clone());

        Self {
            settings,
            router,
            history: HistoryStore::new(Arc::clone(&generations)),
            generations,
            input,
            output,
            barge_in,
            answers: backends.answers,
            device_status: backends.device_status,
            navigator: backends.navigator,
            branch: backends.branch,
            mode: Mutex::new(AssistantMode::Chat),
            state: Mutex::new(VoiceState::Idle),
            answered_turns: AtomicU32::new(0),
            events,
        }
    }

    /// Subscribe to assistant events
    pub fn subscribe(&self) -> broadcast::Receiver<AssistantEvent> {
        self.events.subscribe()
    }

    pub fn mode(&self) -> AssistantMode {
        *self.mode.lock()
    }

    pub fn voice_state(&self) -> VoiceState {
        *self.state.lock()
    }

    pub fn chat_messages(&self) -> Vec<Message> {
        self.history.chat_messages()
    }

    pub fn voice_messages(&self) -> Vec<Message> {
        self.history.voice_messages()
    }

    /// Switch to voice mode and start a conversation.
    ///
    /// No-op unless the session is Idle or Stopped. The conversation runs on
    /// a spawned task; progress is reported through [`AssistantEvent`]s.
    pub fn activate_voice(self: &Arc<Self>) {
        *self.mode.lock() = AssistantMode::Voice;

        // Claim the session in the same lock scope as the check, so two
        // back-to-back activations cannot both pass it and start two
        // conversation loops over one microphone.
        let from = {
            let mut state = self.state.lock();
            if !matches!(*state, VoiceState::Idle | VoiceState::Stopped) {
                tracing::debug!(state = %*state, "activation ignored; conversation already running");
                return;
            }
            std::mem::replace(&mut *state, VoiceState::Greeting)
        };
        tracing::debug!(%from, to = %VoiceState::Greeting, "voice state transition");
        let _ = self.events.send(AssistantEvent::StateChanged {
            from,
            to: VoiceState::Greeting,
        });

        self.answered_turns.store(0, Ordering::Relaxed);
        let generation = self.generations.current();
        tracing::info!(%generation, "voice conversation starting");

        let this = Arc::clone(self);
        tokio::spawn(async move {
            this.conversation_loop(generation).await;
        });
    }

    /// Restart listening after a halt. Identical to activation.
    pub fn restart_listening(self: &Arc<Self>) {
        self.activate_voice();
    }

    /// Stop the in-flight speech queue. The conversation then proceeds to
    /// the next listening turn as if the queue had completed.
    pub fn skip_speaking(&self) {
        let state = *self.state.lock();
        if matches!(state, VoiceState::Greeting | VoiceState::Speaking) {
            tracing::debug!(%state, "speech queue skipped by user");
            self.output.cancel();
        }
    }

    /// Close the widget: cancel all recognition and synthesis, clear the
    /// voice log, and invalidate every callback captured this session.
    pub fn close(&self) {
        self.input.stop();
        self.barge_in.stop_watching();
        self.output.cancel();

        let generation = self.generations.bump();
        self.history.clear_voice();
        self.answered_turns.store(0, Ordering::Relaxed);
        self.set_state(VoiceState::Idle);
        tracing::info!(%generation, "assistant closed");
        let _ = self.events.send(AssistantEvent::Closed);
    }

    /// Switch to chat mode. Leaving voice mode tears the voice session down
    /// exactly like a close.
    pub fn open_chat(&self) {
        let previous = {
            let mut mode = self.mode.lock();
            std::mem::replace(&mut *mode, AssistantMode::Chat)
        };

        if previous == AssistantMode::Voice {
            self.input.stop();
            self.barge_in.stop_watching();
            self.output.cancel();
            self.generations.bump();
            self.history.clear_voice();
            self.answered_turns.store(0, Ordering::Relaxed);
            self.set_state(VoiceState::Idle);
        }

        // The quick-action device panel leads the chat log, once.
        let has_panel = self
            .history
            .chat_messages()
            .iter()
            .any(|m| m.is_device_panel);
        if !has_panel {
            let generation = self.generations.current();
            self.append(AssistantMode::Chat, generation, Message::device_panel());
        }
    }

    /// Handle one typed chat message: route, close, or ask.
    pub async fn send_chat_message(&self, text: &str) {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return;
        }

        let generation = self.generations.current();
        let utterance = normalize_spoken(trimmed);
        self.append(
            AssistantMode::Chat,
            generation,
            Message::user(utterance.clone()),
        );

        if let Some(path) = self.router.route(&utterance) {
            let path = path.to_string();
            self.append(
                AssistantMode::Chat,
                generation,
                Message::bot(self.settings.navigation_ack_line.clone()),
            );
            self.navigator.navigate(&path);
            let _ = self.events.send(AssistantEvent::Navigated { path });
            return;
        }

        if self.router.is_close_command(&utterance) {
            self.close();
            return;
        }

        let branch = self.branch.current_branch_code();
        match self
            .answers
            .ask(&utterance, &branch, &self.settings.language)
            .await
        {
            Ok(answer) => {
                self.append(AssistantMode::Chat, generation, Message::bot_html(answer));
            }
            Err(e) => {
                tracing::warn!(error = %e, "chat answer request failed");
                self.append(
                    AssistantMode::Chat,
                    generation,
                    Message::bot(self.settings.apology_line.clone()),
                );
            }
        }
    }

    /// Fetch status counts for one device category (quick-action panel) and
    /// append the result to the chat log.
    pub async fn request_device_status(&self, category: &str) {
        let generation = self.generations.current();
        let branch = self.branch.current_branch_code();

        match self.device_status.status(&branch, category).await {
            Ok(counts) => {
                let text = format!(
                    "{}: {} working, {} partially working, {} not working ({} total).",
                    category,
                    counts.working,
                    counts.partially_working,
                    counts.not_working,
                    counts.total()
                );
                self.append(AssistantMode::Chat, generation, Message::bot(text));
            }
            Err(e) => {
                tracing::warn!(error = %e, category, "device status request failed");
                self.append(
                    AssistantMode::Chat,
                    generation,
                    Message::bot(self.settings.apology_line.clone()),
                );
            }
        }
    }

    /// Runs one voice conversation. The caller has already moved the state
    /// to Greeting while claiming the session.
    async fn conversation_loop(self: Arc<Self>, generation: Generation) {
        let greeting = self.settings.greeting_line.clone();
        self.append(
            AssistantMode::Voice,
            generation,
            Message::bot(greeting.clone()),
        );

        match self.speak_plain(vec![greeting]).await {
            SpeakResult::Finished | SpeakResult::Skipped => {}
            SpeakResult::Failed(reason) => {
                tracing::warn!(reason = %reason, "greeting synthesis failed");
                self.halt(generation, Message::system(self.settings.stopped_line.clone()));
                return;
            }
        }

        loop {
            if self.generations.is_stale(generation) {
                return;
            }
            match self.listen_turn(generation).await {
                TurnFlow::Continue => continue,
                TurnFlow::Halted => return,
            }
        }
    }

    /// One listening turn: open recognition, resolve the transcript, then
    /// route / close / answer.
    async fn listen_turn(self: &Arc<Self>, generation: Generation) -> TurnFlow {
        let listening_state = if self.answered_turns.load(Ordering::Relaxed) == 0 {
            VoiceState::Listening
        } else {
            VoiceState::Followup
        };
        self.set_state(listening_state);

        let outcome_rx = match self.input.start().await {
            Ok(rx) => rx,
            Err(e) => {
                tracing::warn!(error = %e, "could not open recognition session");
                let notice = match &e {
                    PipelineError::Core(CoreError::RecognitionUnavailable) => {
                        self.settings.unsupported_line.clone()
                    }
                    _ => self.settings.stopped_line.clone(),
                };
                self.halt(generation, Message::system(notice));
                return TurnFlow::Halted;
            }
        };

        let forwarder = self.spawn_caption_forwarder(generation);
        let outcome = outcome_rx.await;
        forwarder.abort();

        if self.generations.is_stale(generation) {
            return TurnFlow::Halted;
        }

        // The forwarder may have been stopped before it relayed the last
        // caption value; publish the settled caption once more.
        let settled = self.input.caption().borrow().clone();
        let _ = self.events.send(AssistantEvent::Caption(settled));

        let outcome = match outcome {
            Ok(outcome) => outcome,
            // Sender dropped without resolving: the session was torn down.
            Err(_) => return TurnFlow::Halted,
        };

        match outcome {
            ListenOutcome::Failed(reason) => {
                tracing::warn!(reason = %reason, "listening turn failed");
                self.halt(generation, Message::system(self.settings.stopped_line.clone()));
                TurnFlow::Halted
            }
            ListenOutcome::Transcript(raw) => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    // Silence: listen again without logging anything.
                    return TurnFlow::Continue;
                }

                let utterance = normalize_spoken(trimmed);
                tracing::info!(utterance = %utterance, "user turn");
                self.append(
                    AssistantMode::Voice,
                    generation,
                    Message::user(utterance.clone()),
                );

                // Navigation outranks close, so "close the dashboard" opens
                // the dashboard instead of exiting.
                if let Some(path) = self.router.route(&utterance) {
                    let path = path.to_string();
                    self.append(
                        AssistantMode::Voice,
                        generation,
                        Message::bot(self.settings.navigation_ack_line.clone()),
                    );
                    self.navigator.navigate(&path);
                    let _ = self.events.send(AssistantEvent::Navigated { path });
                    self.set_state(VoiceState::Stopped);
                    return TurnFlow::Halted;
                }

                if self.router.is_close_command(&utterance) {
                    self.close();
                    return TurnFlow::Halted;
                }

                self.answer_turn(generation, &utterance).await
            }
        }
    }

    /// Ask the backend and speak the answer with the barge-in watcher open.
    async fn answer_turn(self: &Arc<Self>, generation: Generation, utterance: &str) -> TurnFlow {
        self.set_state(VoiceState::Processing);
        let branch = self.branch.current_branch_code();

        let answer = match self
            .answers
            .ask(utterance, &branch, &self.settings.language)
            .await
        {
            Ok(answer) => answer,
            Err(e) => {
                if self.generations.is_stale(generation) {
                    return TurnFlow::Halted;
                }
                tracing::warn!(error = %e, "answer request failed");
                self.halt(generation, Message::bot(self.settings.apology_line.clone()));
                return TurnFlow::Halted;
            }
        };

        if self.generations.is_stale(generation) {
            return TurnFlow::Halted;
        }
        self.append(
            AssistantMode::Voice,
            generation,
            Message::bot_html(answer.clone()),
        );

        self.set_state(VoiceState::Speaking);
        let mut lines = speech_lines(&answer);
        // The follow-up prompt rides at the end of the same queue, so a
        // barge-in skips it along with the rest of the answer.
        lines.push(self.settings.followup_line.clone());

        let result = self.speak_with_barge_in(lines).await;
        if self.generations.is_stale(generation) {
            return TurnFlow::Halted;
        }

        match result {
            SpeakResult::Finished | SpeakResult::Skipped => {
                self.answered_turns.fetch_add(1, Ordering::Relaxed);
                TurnFlow::Continue
            }
            SpeakResult::Failed(reason) => {
                tracing::warn!(reason = %reason, "answer synthesis failed");
                self.halt(generation, Message::system(self.settings.stopped_line.clone()));
                TurnFlow::Halted
            }
        }
    }

    /// Speak a queue with no interrupt watcher (greeting).
    async fn speak_plain(&self, lines: Vec<String>) -> SpeakResult {
        let (events_tx, mut events_rx) = mpsc::channel(16);
        self.output.speak(lines, events_tx);

        while let Some(event) = events_rx.recv().await {
            match event {
                SpeakEvent::LineSpoken { .. } => continue,
                SpeakEvent::Completed => return SpeakResult::Finished,
                SpeakEvent::Cancelled => return SpeakResult::Skipped,
                SpeakEvent::Error(reason) => return SpeakResult::Failed(reason),
            }
        }
        SpeakResult::Skipped
    }

    /// Speak a queue while the barge-in listener watches for the interrupt
    /// phrase. The watcher is closed before returning, whatever the outcome.
    async fn speak_with_barge_in(&self, lines: Vec<String>) -> SpeakResult {
        let (events_tx, mut events_rx) = mpsc::channel(16);
        let (interrupt_tx, mut interrupt_rx) = oneshot::channel();

        if let Err(e) = self
            .barge_in
            .start_watching(
                &self.settings.interrupt_phrase,
                Arc::clone(&self.output),
                interrupt_tx,
            )
            .await
        {
            // Speaking proceeds without an interrupt watcher; the skip
            // button still works through skip_speaking.
            tracing::debug!(error = %e, "barge-in watcher unavailable");
        }

        self.output.speak(lines, events_tx);

        let mut watcher_live = true;
        let result = loop {
            tokio::select! {
                event = events_rx.recv() => match event {
                    Some(SpeakEvent::LineSpoken { .. }) => continue,
                    Some(SpeakEvent::Completed) => break SpeakResult::Finished,
                    Some(SpeakEvent::Cancelled) => break SpeakResult::Skipped,
                    Some(SpeakEvent::Error(reason)) => break SpeakResult::Failed(reason),
                    None => break SpeakResult::Skipped,
                },
                fired = &mut interrupt_rx, if watcher_live => {
                    if fired.is_ok() {
                        tracing::info!("speech interrupted by voice");
                        break SpeakResult::Skipped;
                    }
                    // Watcher ended without a match; keep speaking.
                    watcher_live = false;
                }
            }
        };

        self.barge_in.stop_watching();
        result
    }

    fn spawn_caption_forwarder(&self, generation: Generation) -> JoinHandle<()> {
        let mut caption_rx = self.input.caption();
        let events = self.events.clone();
        let generations = Arc::clone(&self.generations);

        tokio::spawn(async move {
            while caption_rx.changed().await.is_ok() {
                if generations.is_stale(generation) {
                    return;
                }
                let caption = caption_rx.borrow_and_update().clone();
                let _ = events.send(AssistantEvent::Caption(caption));
            }
        })
    }

    /// Append a halt notice and stop listening until explicit restart.
    fn halt(&self, generation: Generation, notice: Message) {
        self.append(AssistantMode::Voice, generation, notice);
        self.set_state(VoiceState::Stopped);
    }

    fn append(&self, mode: AssistantMode, generation: Generation, message: Message) {
        if self.history.append(mode, generation, message.clone()) {
            let _ = self.events.send(AssistantEvent::MessageAppended { mode, message });
        }
    }

    fn set_state(&self, to: VoiceState) {
        let from = {
            let mut state = self.state.lock();
            std::mem::replace(&mut *state, to)
        };
        if from != to {
            tracing::debug!(%from, %to, "voice state transition");
            let _ = self.events.send(AssistantEvent::StateChanged { from, to });
        }
    }
}
