//! Spoken-text and HTML normalization
//!
//! Two independent pure transforms used by the orchestrator:
//! - spoken-to-canonical: rewrites spoken number words and date phrases to
//!   digits (`"one january 2024"` becomes `"01/01/2024"`)
//! - HTML conversion: turns backend answer bodies into speech-ready or
//!   display-ready plain text
//!
//! Everything here is a pure function over `&str`; no shared state.

pub mod html;
pub mod spoken;

pub use html::{html_to_display, html_to_speech, speech_lines, strip_for_speech};
pub use spoken::{month_number, normalize_spoken, word_to_number};
