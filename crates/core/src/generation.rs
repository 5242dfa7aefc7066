//! Session generation guard
//!
//! A `Generation` identifies one assistant lifetime. The counter is bumped
//! whenever the widget is closed or the mode is switched, and every
//! asynchronous completion handler (recognition end, synthesis end, backend
//! response) captures the generation at subscription time and compares it
//! before touching shared state. A mismatch means the callback outlived its
//! session and must be dropped silently.
//!
//! This replaces the ambient "is the session still active" flag that such
//! assistants usually carry as a free-standing mutable, with an explicit,
//! testable ownership token.

use std::sync::atomic::{AtomicU64, Ordering};

/// A monotonically increasing token identifying one assistant session lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(pub u64);

impl std::fmt::Display for Generation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "gen#{}", self.0)
    }
}

/// Shared atomic generation counter
///
/// Cheap to clone behind an `Arc`; all sub-managers of one assistant share
/// the same counter instance.
#[derive(Debug, Default)]
pub struct GenerationCounter {
    current: AtomicU64,
}

impl GenerationCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// The generation currently live
    pub fn current(&self) -> Generation {
        Generation(self.current.load(Ordering::Acquire))
    }

    /// Invalidate everything captured so far and start a new lifetime
    pub fn bump(&self) -> Generation {
        let next = self.current.fetch_add(1, Ordering::AcqRel) + 1;
        Generation(next)
    }

    /// Check whether a captured generation has been superseded
    pub fn is_stale(&self, captured: Generation) -> bool {
        captured != self.current()
    }
}
