//! Note store manager: state, selection and debounced persistence.
//!
//! # Responsibility
//! - Own the authoritative `Store` and route every mutation through
//!   `state::reduce`.
//! - Mirror the store into a key-value backend after a quiescence window.
//! - Absorb accidental double create requests with a short cool-down.
//!
//! # Invariants
//! - At most one persistence write is pending; new mutations push its
//!   deadline back instead of queueing another write.
//! - Persistence writes only happen from `poll`, `flush` or teardown, never
//!   from a mutation call.
//! - Storage failures never propagate out of mutation calls; the in-memory
//!   store stays authoritative and `persistence_status()` reports the failure.
//! - Dropping the manager flushes a pending write.

use crate::clock::{Clock, SystemClock};
use crate::config::NoteStoreConfig;
use crate::id::{IdGenerator, UuidIdGenerator};
use crate::model::note::{truncate_to_millis, Note, NoteId};
use crate::model::store::Store;
use crate::scheduler::Scheduler;
use crate::snapshot::{self, HydrationOutcome};
use crate::state::{reduce, Action, Transition};
use crate::storage::{KeyValueStorage, StorageError};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerKey {
    Persist,
    CreateCooldown,
}

/// Details of the most recent failed persistence write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistFailure {
    /// `StorageError::code()` of the failure.
    pub code: &'static str,
    pub message: String,
    pub at: DateTime<Utc>,
}

/// Durability of the latest in-memory state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceStatus {
    /// Storage mirrors the in-memory store.
    Clean,
    /// A write is scheduled or still owed.
    Pending,
    /// The last write failed; recent changes are not durable.
    Failed(PersistFailure),
}

impl PersistenceStatus {
    pub fn is_durable(&self) -> bool {
        matches!(self, Self::Clean)
    }
}

/// Single owner of the note store.
pub struct NoteStoreManager<S, C = SystemClock, G = UuidIdGenerator>
where
    S: KeyValueStorage,
    C: Clock,
    G: IdGenerator,
{
    store: Store,
    storage: S,
    clock: C,
    ids: G,
    config: NoteStoreConfig,
    timers: Scheduler<TimerKey>,
    hydration: HydrationOutcome,
    status: PersistenceStatus,
    cooldown_started: Option<DateTime<Utc>>,
    dirty: bool,
    closed: bool,
}

impl<S: KeyValueStorage> NoteStoreManager<S> {
    /// Hydrates from `storage` using the system clock and UUID ids.
    pub fn hydrate(storage: S, config: NoteStoreConfig) -> Self {
        Self::hydrate_with(storage, config, SystemClock, UuidIdGenerator)
    }
}

impl<S, C, G> NoteStoreManager<S, C, G>
where
    S: KeyValueStorage,
    C: Clock,
    G: IdGenerator,
{
    /// Loads the persisted snapshot (or an empty store) and takes ownership
    /// of the collaborators.
    ///
    /// Never fails; the outcome is available from `hydration()`.
    pub fn hydrate_with(storage: S, config: NoteStoreConfig, clock: C, ids: G) -> Self {
        let (store, hydration) = snapshot::hydrate(&storage, config.storage_key.as_str());
        Self {
            store,
            storage,
            clock,
            ids,
            config,
            timers: Scheduler::new(),
            hydration,
            status: PersistenceStatus::Clean,
            cooldown_started: None,
            dirty: false,
            closed: false,
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn notes(&self) -> &[Note] {
        &self.store.notes
    }

    pub fn active_note(&self) -> Option<&Note> {
        self.store.active_note()
    }

    pub fn active_note_id(&self) -> Option<&NoteId> {
        self.store.active_note_id.as_ref()
    }

    pub fn config(&self) -> &NoteStoreConfig {
        &self.config
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn hydration(&self) -> &HydrationOutcome {
        &self.hydration
    }

    pub fn persistence_status(&self) -> &PersistenceStatus {
        &self.status
    }

    /// Current time at storage precision.
    pub fn now(&self) -> DateTime<Utc> {
        truncate_to_millis(self.clock.now())
    }

    /// Whether a recent create is still inside its cool-down window.
    pub fn is_creating(&self) -> bool {
        self.is_creating_at(self.now())
    }

    /// Whether a persistence write is scheduled.
    pub fn has_pending_write(&self) -> bool {
        self.timers.is_pending(&TimerKey::Persist)
    }

    /// Earliest time at which `poll` has work to do.
    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        self.timers.next_deadline()
    }

    /// Applies one action and schedules persistence when the store changed.
    pub fn dispatch(&mut self, action: Action) -> Transition {
        let name = action.name();
        let transition = reduce(&mut self.store, action);
        if transition.is_changed() {
            self.schedule_persist();
        }
        debug!(
            "event=store_dispatch module=manager action={} changed={} notes={}",
            name,
            transition.is_changed(),
            self.store.len()
        );
        transition
    }

    /// Creates an empty note, makes it active and returns its id.
    ///
    /// Returns `None` when a previous create is still cooling down.
    pub fn create_note(&mut self) -> Option<NoteId> {
        let now = self.now();
        if self.is_creating_at(now) {
            debug!("event=create_note module=manager status=suppressed reason=cooldown");
            return None;
        }

        let id = self.ids.next_id();
        let transition = self.dispatch(Action::CreateNote {
            id: id.clone(),
            at: now,
        });
        if !transition.is_changed() {
            warn!("event=create_note module=manager status=rejected reason=duplicate_id");
            return None;
        }
        self.timers.schedule(
            TimerKey::CreateCooldown,
            self.config.create_cooldown(),
            now,
        );
        self.cooldown_started = Some(now);
        Some(id)
    }

    /// Makes `id` the active note. Returns `false` if no such note exists or
    /// it is already active.
    pub fn select_note(&mut self, id: &str) -> bool {
        self.dispatch(Action::SelectNote {
            id: NoteId::from(id),
        })
        .is_changed()
    }

    /// Replaces the active note's content. Returns `false` when nothing is
    /// active.
    pub fn update_active_note_content(&mut self, content: impl Into<String>) -> bool {
        let at = self.now();
        self.dispatch(Action::UpdateActiveContent {
            content: content.into(),
            at,
        })
        .is_changed()
    }

    /// Removes `id`. Returns `false` if no such note exists.
    pub fn delete_note(&mut self, id: &str) -> bool {
        self.dispatch(Action::DeleteNote {
            id: NoteId::from(id),
        })
        .is_changed()
    }

    /// Fires every timer whose deadline has passed.
    ///
    /// Returns whether a persistence write was attempted.
    pub fn poll(&mut self) -> bool {
        let now = self.now();
        let mut wrote = false;
        for key in self.timers.take_due(now) {
            match key {
                TimerKey::Persist => {
                    if self.dirty {
                        let _ = self.persist();
                        wrote = true;
                    }
                }
                TimerKey::CreateCooldown => {}
            }
        }
        wrote
    }

    /// Writes the current store immediately if it has unsaved changes.
    ///
    /// Returns `Ok(true)` when a write happened, `Ok(false)` when storage was
    /// already up to date.
    pub fn flush(&mut self) -> Result<bool, StorageError> {
        self.timers.cancel(&TimerKey::Persist);
        if !self.dirty {
            return Ok(false);
        }
        self.persist().map(|()| true)
    }

    /// Cancels timers and performs the final flush.
    pub fn close(mut self) -> Result<(), StorageError> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Result<(), StorageError> {
        self.closed = true;
        self.timers.cancel_all();
        let result = if self.dirty {
            self.persist()
        } else {
            Ok(())
        };
        info!(
            "event=store_close module=manager status={} notes={}",
            if result.is_ok() { "ok" } else { "error" },
            self.store.len()
        );
        result
    }

    /// A clock that moved behind the create that armed the cool-down ends it.
    fn is_creating_at(&self, now: DateTime<Utc>) -> bool {
        match (
            self.cooldown_started,
            self.timers.deadline(&TimerKey::CreateCooldown),
        ) {
            (Some(started), Some(until)) => started <= now && now < until,
            _ => false,
        }
    }

    fn schedule_persist(&mut self) {
        self.dirty = true;
        self.status = PersistenceStatus::Pending;
        let now = self.now();
        self.timers
            .schedule(TimerKey::Persist, self.config.persist_debounce(), now);
    }

    fn persist(&mut self) -> Result<(), StorageError> {
        let started_at = Instant::now();
        let result = snapshot::encode(&self.store)
            .map_err(|err| StorageError::Serialization(err.to_string()))
            .and_then(|encoded| {
                self.storage
                    .write(self.config.storage_key.as_str(), encoded.as_str())
                    .map(|()| encoded.len())
            });

        match result {
            Ok(bytes) => {
                self.dirty = false;
                self.status = PersistenceStatus::Clean;
                info!(
                    "event=store_persist module=manager status=ok notes={} bytes={} duration_ms={}",
                    self.store.len(),
                    bytes,
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                warn!(
                    "event=store_persist module=manager status=error notes={} duration_ms={} error_code={} error={}",
                    self.store.len(),
                    started_at.elapsed().as_millis(),
                    err.code(),
                    err
                );
                self.status = PersistenceStatus::Failed(PersistFailure {
                    code: err.code(),
                    message: err.to_string(),
                    at: self.now(),
                });
                Err(err)
            }
        }
    }
}

impl<S, C, G> Drop for NoteStoreManager<S, C, G>
where
    S: KeyValueStorage,
    C: Clock,
    G: IdGenerator,
{
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        let _ = self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::{NoteStoreManager, PersistenceStatus};
    use crate::clock::ManualClock;
    use crate::config::NoteStoreConfig;
    use crate::id::SequentialIdGenerator;
    use crate::storage::MemoryStorage;
    use chrono::{TimeZone, Utc};

    type TestManager = NoteStoreManager<MemoryStorage, ManualClock, SequentialIdGenerator>;

    fn manager(storage: MemoryStorage) -> (TestManager, ManualClock) {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2026, 10, 16, 9, 0, 0).unwrap());
        let manager = NoteStoreManager::hydrate_with(
            storage,
            NoteStoreConfig::default(),
            clock.clone(),
            SequentialIdGenerator::default(),
        );
        (manager, clock)
    }

    #[test]
    fn cooldown_flag_clears_after_window() {
        let (mut manager, clock) = manager(MemoryStorage::new());
        assert!(!manager.is_creating());

        manager.create_note().unwrap();
        assert!(manager.is_creating());

        clock.advance_ms(299);
        assert!(manager.is_creating());
        clock.advance_ms(1);
        assert!(!manager.is_creating());
    }

    #[test]
    fn clock_moving_backwards_ends_cooldown() {
        let (mut manager, clock) = manager(MemoryStorage::new());
        let start = manager.now();
        manager.create_note().unwrap();
        assert!(manager.is_creating());

        clock.set(start - chrono::Duration::seconds(60));
        assert!(!manager.is_creating());
        let second = manager.create_note().unwrap();
        assert_eq!(manager.active_note_id(), Some(&second));
        assert_eq!(manager.store().len(), 2);
        assert!(manager.is_creating());
    }

    #[test]
    fn status_goes_pending_then_clean() {
        let (mut manager, clock) = manager(MemoryStorage::new());
        assert_eq!(manager.persistence_status(), &PersistenceStatus::Clean);

        manager.create_note();
        assert_eq!(manager.persistence_status(), &PersistenceStatus::Pending);
        assert!(manager.has_pending_write());
        let armed_at = manager.now();
        assert_eq!(
            manager.next_deadline(),
            Some(armed_at + chrono::Duration::milliseconds(300))
        );

        clock.advance_ms(500);
        assert!(manager.poll());
        assert_eq!(manager.persistence_status(), &PersistenceStatus::Clean);
        assert!(!manager.has_pending_write());
        assert_eq!(manager.next_deadline(), None);
    }

    #[test]
    fn drop_flushes_pending_write() {
        let storage = MemoryStorage::new();
        {
            let (mut manager, _clock) = manager(storage.clone());
            manager.create_note();
            manager.update_active_note_content("unsaved burst");
        }
        let raw = storage.get("quicknote.store").unwrap();
        assert!(raw.contains("unsaved burst"));
        assert_eq!(storage.write_count("quicknote.store"), 1);
    }
}
