//! Editor-side input buffer with trailing-edge debounce.
//!
//! # Responsibility
//! - Echo typed text immediately from a local buffer.
//! - Hand the latest text to the store only after input pauses, or on flush.
//!
//! # Invariants
//! - At most one commit is pending; each input pushes its deadline back.
//! - A commit always carries the most recent input, never an older one.

use crate::scheduler::Scheduler;
use chrono::{DateTime, Utc};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CommitTimer;

/// Local echo buffer for the note being edited.
#[derive(Debug, Clone)]
pub struct EditorBuffer {
    text: String,
    dirty: bool,
    debounce: Duration,
    timers: Scheduler<CommitTimer>,
}

impl EditorBuffer {
    pub fn new(debounce: Duration) -> Self {
        Self {
            text: String::new(),
            dirty: false,
            debounce,
            timers: Scheduler::new(),
        }
    }

    /// Text to display right now.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the buffer holds input the store has not seen yet.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// When the pending commit fires, if any.
    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.timers.deadline(&CommitTimer)
    }

    /// Records new input and (re)arms the commit timer.
    pub fn input(&mut self, text: impl Into<String>, now: DateTime<Utc>) {
        self.text = text.into();
        self.dirty = true;
        self.timers.schedule(CommitTimer, self.debounce, now);
    }

    /// Returns the text to commit once the debounce window has elapsed.
    pub fn poll(&mut self, now: DateTime<Utc>) -> Option<String> {
        if self.timers.take_due(now).is_empty() {
            return None;
        }
        self.take_pending()
    }

    /// Returns pending text immediately, bypassing the window.
    pub fn flush(&mut self) -> Option<String> {
        self.timers.cancel(&CommitTimer);
        self.take_pending()
    }

    /// Drops any pending commit but keeps the echoed text.
    pub fn cancel(&mut self) -> bool {
        let was_dirty = self.dirty;
        self.timers.cancel(&CommitTimer);
        self.dirty = false;
        was_dirty
    }

    /// Loads a different note's text, discarding pending state.
    pub fn reset(&mut self, text: impl Into<String>) {
        self.cancel();
        self.text = text.into();
    }

    fn take_pending(&mut self) -> Option<String> {
        if !self.dirty {
            return None;
        }
        self.dirty = false;
        Some(self.text.clone())
    }
}
