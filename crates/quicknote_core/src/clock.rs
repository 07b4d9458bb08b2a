//! Time sources.
//!
//! # Responsibility
//! - Abstract "now" so timestamps and debounce deadlines share one source.
//! - Provide a virtual clock that tests advance explicitly.

use chrono::{DateTime, Duration, Utc};
use std::cell::Cell;
use std::rc::Rc;

/// Source of the current wall-clock time.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Real system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Virtual clock that only moves when told to.
///
/// Clones share the same current time, so a test can keep one handle while
/// the manager owns another.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    /// Moves time forward by `by`.
    pub fn advance(&self, by: std::time::Duration) {
        let step = Duration::from_std(by).unwrap_or(Duration::zero());
        self.now.set(self.now.get() + step);
    }

    pub fn advance_ms(&self, millis: i64) {
        self.now.set(self.now.get() + Duration::milliseconds(millis));
    }

    /// Jumps to an absolute time, which may be earlier than the current one.
    pub fn set(&self, at: DateTime<Utc>) {
        self.now.set(at);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}
