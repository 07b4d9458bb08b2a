//! Core state logic for QuickNote.
//! This crate is the single source of truth for note store invariants.

pub mod clock;
pub mod config;
pub mod db;
pub mod editor;
pub mod id;
pub mod logging;
pub mod manager;
pub mod model;
pub mod scheduler;
pub mod session;
pub mod snapshot;
pub mod state;
pub mod storage;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, NoteStoreConfig};
pub use editor::EditorBuffer;
pub use id::{IdGenerator, SequentialIdGenerator, UuidIdGenerator};
pub use logging::{default_log_level, init_logging, logging_status};
pub use manager::{NoteStoreManager, PersistFailure, PersistenceStatus};
pub use model::note::{Note, NoteId};
pub use model::store::{Store, StoreViolation};
pub use scheduler::Scheduler;
pub use session::{Event, EventOutcome, NoteSession, SessionView};
pub use snapshot::{HydrationOutcome, SnapshotError};
pub use state::{reduce, Action, Transition};
pub use storage::{
    FileStorage, KeyValueStorage, MemoryStorage, SqliteStorage, StorageError, StorageResult,
};

/// Minimal health-check API for smoke probes.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
