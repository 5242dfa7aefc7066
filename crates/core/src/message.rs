//! Conversation message types
//!
//! Messages are immutable once appended and owned exclusively by the history
//! log (chat or voice) they were appended to. The presentation layer only
//! ever sees cloned snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who produced a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageOrigin {
    /// Spoken or typed by the user
    User,
    /// Assistant response
    Bot,
    /// UI-level notice (e.g. "stopped listening")
    System,
}

impl MessageOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageOrigin::User => "user",
            MessageOrigin::Bot => "bot",
            MessageOrigin::System => "system",
        }
    }
}

impl std::fmt::Display for MessageOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single entry in a conversation log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Who produced it
    pub origin: MessageOrigin,
    /// Raw body; may contain HTML when `is_html` is set
    pub text: String,
    /// When the message was appended
    pub timestamp: DateTime<Utc>,
    /// Body is HTML and must go through the display/speech converters
    pub is_html: bool,
    /// Marks the special quick-action device-buttons panel
    pub is_device_panel: bool,
}

impl Message {
    pub fn new(origin: MessageOrigin, text: impl Into<String>) -> Self {
        Self {
            origin,
            text: text.into(),
            timestamp: Utc::now(),
            is_html: false,
            is_device_panel: false,
        }
    }

    /// Plain user message
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(MessageOrigin::User, text)
    }

    /// Plain bot message
    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(MessageOrigin::Bot, text)
    }

    /// Bot message whose body is HTML (backend answers arrive this way)
    pub fn bot_html(text: impl Into<String>) -> Self {
        let mut msg = Self::new(MessageOrigin::Bot, text);
        msg.is_html = true;
        msg
    }

    /// System notice
    pub fn system(text: impl Into<String>) -> Self {
        Self::new(MessageOrigin::System, text)
    }

    /// The quick-action device-buttons panel placeholder
    pub fn device_panel() -> Self {
        let mut msg = Self::new(MessageOrigin::System, "");
        msg.is_device_panel = true;
        msg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        let msg = Message::user("open dashboard");
        assert_eq!(msg.origin, MessageOrigin::User);
        assert!(!msg.is_html);
        assert!(!msg.is_device_panel);

        let msg = Message::bot_html("Line1<br>Line2");
        assert_eq!(msg.origin, MessageOrigin::Bot);
        assert!(msg.is_html);

        let msg = Message::device_panel();
        assert_eq!(msg.origin, MessageOrigin::System);
        assert!(msg.is_device_panel);
    }
}
