//! Recognition session event model
//!
//! The platform backend pushes these over an mpsc channel; the pipeline
//! managers interpret them. `Ended` or `Error` is always the last event of a
//! session, so consumers see exactly one terminal outcome per `open()`.

/// How a recognition session behaves once speech ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecognitionMode {
    /// One listening turn: the session ends after the first utterance
    SingleShot,
    /// Keeps recognizing until explicitly closed (barge-in watcher)
    Continuous,
}

/// Event emitted by an open recognition session
#[derive(Debug, Clone)]
pub enum RecognitionEvent {
    /// Partial hypothesis for the segment currently being spoken
    Interim(String),
    /// A segment was finalized; more may follow in continuous mode
    FinalSegment(String),
    /// Session ended normally (single-shot turn complete, or closed)
    Ended,
    /// Session ended with a platform error
    Error(String),
}

impl RecognitionEvent {
    /// True for the two terminal events
    pub fn is_terminal(&self) -> bool {
        matches!(self, RecognitionEvent::Ended | RecognitionEvent::Error(_))
    }

    /// Text carried by the event, if any
    pub fn text(&self) -> Option<&str> {
        match self {
            RecognitionEvent::Interim(t) | RecognitionEvent::FinalSegment(t) => Some(t),
            _ => None,
        }
    }
}
