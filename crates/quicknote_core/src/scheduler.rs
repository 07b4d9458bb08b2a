//! Keyed trailing-edge timer queue driven by an external clock.
//!
//! # Responsibility
//! - Track at most one deadline per key.
//! - Report expired keys when polled with the current time.
//!
//! # Invariants
//! - Scheduling a key that is already pending replaces its deadline
//!   (cancel-and-reschedule), so bursts coalesce into one firing.
//! - `take_due` returns keys ordered by deadline, ties broken by the order
//!   they were scheduled, and removes them from the queue.
//! - Nothing fires on its own; the owner decides when to poll.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::time::Duration;

#[derive(Debug, Clone)]
struct Timer<K> {
    key: K,
    deadline: DateTime<Utc>,
    seq: u64,
}

/// Pending timers keyed by `K`.
#[derive(Debug, Clone)]
pub struct Scheduler<K> {
    timers: Vec<Timer<K>>,
    next_seq: u64,
}

impl<K> Default for Scheduler<K> {
    fn default() -> Self {
        Self {
            timers: Vec::new(),
            next_seq: 0,
        }
    }
}

impl<K: PartialEq + Clone> Scheduler<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms `key` to fire `delay` after `now`, replacing any pending deadline.
    ///
    /// Returns the effective deadline.
    pub fn schedule(&mut self, key: K, delay: Duration, now: DateTime<Utc>) -> DateTime<Utc> {
        let deadline = deadline_after(now, delay);
        self.cancel(&key);
        self.timers.push(Timer {
            key,
            deadline,
            seq: self.next_seq,
        });
        self.next_seq += 1;
        deadline
    }

    /// Disarms `key`. Returns whether it was pending.
    pub fn cancel(&mut self, key: &K) -> bool {
        let before = self.timers.len();
        self.timers.retain(|timer| timer.key != *key);
        self.timers.len() != before
    }

    pub fn cancel_all(&mut self) {
        self.timers.clear();
    }

    pub fn is_pending(&self, key: &K) -> bool {
        self.deadline(key).is_some()
    }

    pub fn deadline(&self, key: &K) -> Option<DateTime<Utc>> {
        self.timers
            .iter()
            .find(|timer| timer.key == *key)
            .map(|timer| timer.deadline)
    }

    /// Earliest pending deadline, if any.
    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        self.timers.iter().map(|timer| timer.deadline).min()
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Removes and returns every key whose deadline is `<= now`.
    pub fn take_due(&mut self, now: DateTime<Utc>) -> Vec<K> {
        let mut due: Vec<Timer<K>> = Vec::new();
        let mut index = 0;
        while index < self.timers.len() {
            if self.timers[index].deadline <= now {
                due.push(self.timers.swap_remove(index));
            } else {
                index += 1;
            }
        }
        due.sort_by_key(|timer| (timer.deadline, timer.seq));
        due.into_iter().map(|timer| timer.key).collect()
    }
}

fn deadline_after(now: DateTime<Utc>, delay: Duration) -> DateTime<Utc> {
    ChronoDuration::from_std(delay)
        .ok()
        .and_then(|step| now.checked_add_signed(step))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[cfg(test)]
mod tests {
    use super::Scheduler;
    use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
    use std::time::Duration;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
    }

    fn ms(value: i64) -> ChronoDuration {
        ChronoDuration::milliseconds(value)
    }

    #[test]
    fn rescheduling_resets_the_deadline() {
        let mut timers = Scheduler::new();
        timers.schedule("persist", Duration::from_millis(500), t0());
        timers.schedule("persist", Duration::from_millis(500), t0() + ms(400));

        assert_eq!(timers.len(), 1);
        assert!(timers.take_due(t0() + ms(500)).is_empty());
        assert_eq!(timers.take_due(t0() + ms(900)), vec!["persist"]);
        assert!(timers.is_empty());
    }

    #[test]
    fn due_keys_come_back_in_deadline_order() {
        let mut timers = Scheduler::new();
        timers.schedule("late", Duration::from_millis(300), t0());
        timers.schedule("early", Duration::from_millis(100), t0());
        timers.schedule("tie", Duration::from_millis(100), t0());
        timers.schedule("future", Duration::from_secs(10), t0());

        assert_eq!(timers.next_deadline(), Some(t0() + ms(100)));
        assert_eq!(
            timers.take_due(t0() + ms(300)),
            vec!["early", "tie", "late"]
        );
        assert!(timers.is_pending(&"future"));
    }

    #[test]
    fn cancel_disarms_a_pending_key() {
        let mut timers = Scheduler::new();
        timers.schedule(1_u8, Duration::from_millis(10), t0());

        assert!(timers.cancel(&1));
        assert!(!timers.cancel(&1));
        assert!(timers.take_due(t0() + ms(1_000)).is_empty());
    }

    #[test]
    fn oversized_delay_saturates() {
        let mut timers = Scheduler::new();
        let deadline = timers.schedule((), Duration::from_secs(u64::MAX), t0());
        assert_eq!(deadline, DateTime::<Utc>::MAX_UTC);
    }
}
