//! Dual-mode history store
//!
//! Chat and voice mode keep separate append-only message logs. Appends carry
//! the generation they were captured under; a stale append is dropped
//! silently, which is what keeps zombie completion handlers from writing
//! into a newer session's log. The presentation layer reads cloned
//! snapshots, never references into the store.

use std::sync::Arc;

use parking_lot::RwLock;

use ops_voice_core::{AssistantMode, Generation, GenerationCounter, Message};

/// Append-only chat/voice message logs behind one lock each
pub struct HistoryStore {
    chat: RwLock<Vec<Message>>,
    voice: RwLock<Vec<Message>>,
    generations: Arc<GenerationCounter>,
}

impl HistoryStore {
    pub fn new(generations: Arc<GenerationCounter>) -> Self {
        Self {
            chat: RwLock::new(Vec::new()),
            voice: RwLock::new(Vec::new()),
            generations,
        }
    }

    pub fn generations(&self) -> &Arc<GenerationCounter> {
        &self.generations
    }

    /// Append to the given mode's log unless `captured` has been superseded.
    /// Returns whether the message was actually appended.
    pub fn append(&self, mode: AssistantMode, captured: Generation, message: Message) -> bool {
        if self.generations.is_stale(captured) {
            tracing::debug!(%captured, origin = %message.origin, "dropping stale append");
            return false;
        }
        match mode {
            AssistantMode::Chat => self.chat.write().push(message),
            AssistantMode::Voice => self.voice.write().push(message),
        }
        true
    }

    /// Snapshot of the chat log
    pub fn chat_messages(&self) -> Vec<Message> {
        self.chat.read().clone()
    }

    /// Snapshot of the voice log
    pub fn voice_messages(&self) -> Vec<Message> {
        self.voice.read().clone()
    }

    /// Clear the voice log only (widget close keeps chat history)
    pub fn clear_voice(&self) {
        self.voice.write().clear();
    }

    /// Clear both logs and start a new generation
    pub fn reset(&self) -> Generation {
        self.chat.write().clear();
        self.voice.write().clear();
        self.generations.bump()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> HistoryStore {
        HistoryStore::new(Arc::new(GenerationCounter::new()))
    }

    #[test]
    fn test_logs_are_independent() {
        let store = store();
        let gen = store.generations().current();

        store.append(AssistantMode::Chat, gen, Message::user("typed"));
        store.append(AssistantMode::Voice, gen, Message::user("spoken"));

        assert_eq!(store.chat_messages().len(), 1);
        assert_eq!(store.voice_messages().len(), 1);
        assert_eq!(store.chat_messages()[0].text, "typed");
        assert_eq!(store.voice_messages()[0].text, "spoken");
    }

    #[test]
    fn test_stale_append_is_dropped() {
        let store = store();
        let old = store.generations().current();
        store.generations().bump();

        assert!(!store.append(AssistantMode::Voice, old, Message::bot("late answer")));
        assert!(store.voice_messages().is_empty());

        let fresh = store.generations().current();
        assert!(store.append(AssistantMode::Voice, fresh, Message::bot("on time")));
        assert_eq!(store.voice_messages().len(), 1);
    }

    #[test]
    fn test_clear_voice_keeps_chat() {
        let store = store();
        let gen = store.generations().current();
        store.append(AssistantMode::Chat, gen, Message::user("typed"));
        store.append(AssistantMode::Voice, gen, Message::user("spoken"));

        store.clear_voice();
        assert!(store.voice_messages().is_empty());
        assert_eq!(store.chat_messages().len(), 1);
    }

    #[test]
    fn test_reset_clears_both_and_bumps() {
        let store = store();
        let gen = store.generations().current();
        store.append(AssistantMode::Chat, gen, Message::user("typed"));
        store.append(AssistantMode::Voice, gen, Message::user("spoken"));

        let next = store.reset();
        assert!(store.chat_messages().is_empty());
        assert!(store.voice_messages().is_empty());
        assert!(store.generations().is_stale(gen));
        assert_eq!(next, store.generations().current());
    }
}
