//! Store snapshot encoding and startup hydration.
//!
//! # Responsibility
//! - Encode the whole `Store` as one JSON document and decode it back.
//! - Turn whatever the backend holds at startup into a usable `Store`.
//!
//! # Invariants
//! - Hydration never fails: absent, unreadable or malformed snapshots all
//!   fall back to an empty store.
//! - A hydrated store always satisfies `Store::check_invariants()`.
//! - The format carries no version field; anything that does not decode is
//!   discarded.

use crate::model::store::{Store, StoreViolation};
use crate::storage::KeyValueStorage;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Snapshot codec failure.
#[derive(Debug)]
pub enum SnapshotError {
    /// Text is not a JSON document with the store shape.
    Malformed(serde_json::Error),
    /// Store could not be encoded.
    Encode(serde_json::Error),
}

impl Display for SnapshotError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(err) => write!(f, "malformed snapshot: {err}"),
            Self::Encode(err) => write!(f, "failed to encode snapshot: {err}"),
        }
    }
}

impl Error for SnapshotError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Malformed(err) | Self::Encode(err) => Some(err),
        }
    }
}

/// What startup hydration found in storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HydrationOutcome {
    /// A snapshot was decoded and loaded.
    Restored {
        notes: usize,
        repaired: Vec<StoreViolation>,
    },
    /// Nothing was stored under the key.
    Empty,
    /// A value existed but did not decode.
    Corrupted(String),
    /// The backend read itself failed.
    ReadFailed(String),
}

impl HydrationOutcome {
    /// Whether the store fell back to empty because of a problem.
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Corrupted(_) | Self::ReadFailed(_))
    }
}

/// Encodes the complete store.
pub fn encode(store: &Store) -> Result<String, SnapshotError> {
    serde_json::to_string(store).map_err(SnapshotError::Encode)
}

/// Decodes a snapshot without repairing invariants.
pub fn decode(raw: &str) -> Result<Store, SnapshotError> {
    serde_json::from_str(raw).map_err(SnapshotError::Malformed)
}

/// Reads the snapshot under `key` and returns the store to start with.
pub fn hydrate<S: KeyValueStorage + ?Sized>(storage: &S, key: &str) -> (Store, HydrationOutcome) {
    let raw = match storage.read(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            info!("event=store_hydrate module=snapshot status=empty");
            return (Store::default(), HydrationOutcome::Empty);
        }
        Err(err) => {
            warn!(
                "event=store_hydrate module=snapshot status=fallback error_code={} error={}",
                err.code(),
                err
            );
            return (Store::default(), HydrationOutcome::ReadFailed(err.to_string()));
        }
    };

    let mut store = match decode(raw.as_str()) {
        Ok(store) => store,
        Err(err) => {
            warn!(
                "event=store_hydrate module=snapshot status=fallback error_code=snapshot_malformed bytes={} error={}",
                raw.len(),
                err
            );
            return (Store::default(), HydrationOutcome::Corrupted(err.to_string()));
        }
    };

    let repaired = store.repair();
    for violation in &repaired {
        warn!("event=store_repair module=snapshot status=fixed detail={violation}");
    }
    info!(
        "event=store_hydrate module=snapshot status=ok notes={} active={} repairs={}",
        store.len(),
        store.active_note_id.is_some(),
        repaired.len()
    );

    let notes = store.len();
    (store, HydrationOutcome::Restored { notes, repaired })
}

#[cfg(test)]
mod tests {
    use super::{decode, encode, hydrate, HydrationOutcome};
    use crate::model::note::{Note, NoteId};
    use crate::model::store::{Store, StoreViolation};
    use crate::storage::{KeyValueStorage, MemoryStorage};
    use chrono::{TimeZone, Utc};

    #[test]
    fn encoded_snapshot_uses_camel_case_wire_fields() {
        let at = Utc.with_ymd_and_hms(2026, 10, 16, 9, 30, 0).unwrap();
        let store = Store {
            notes: vec![Note::new(NoteId::from("n1"), at)],
            active_note_id: None,
        };

        let value: serde_json::Value = serde_json::from_str(&encode(&store).unwrap()).unwrap();
        assert_eq!(value["activeNoteId"], serde_json::Value::Null);
        assert_eq!(value["notes"][0]["id"], "n1");
        assert_eq!(value["notes"][0]["content"], "");
        assert_eq!(value["notes"][0]["createdAt"], "2026-10-16T09:30:00.000Z");
        assert_eq!(value["notes"][0]["updatedAt"], "2026-10-16T09:30:00.000Z");
    }

    #[test]
    fn decode_accepts_offsets_and_missing_active_id() {
        let store = decode(
            r#"{"notes":[{"id":"x","content":"hi","createdAt":"2026-10-16T11:30:00+02:00","updatedAt":"2026-10-16T09:31:00Z"}]}"#,
        )
        .unwrap();
        assert_eq!(store.active_note_id, None);
        assert_eq!(
            store.notes[0].created_at,
            Utc.with_ymd_and_hms(2026, 10, 16, 9, 30, 0).unwrap()
        );
    }

    #[test]
    fn decode_rejects_wrong_shape() {
        assert!(decode(r#"{"activeNoteId":null}"#).is_err());
        assert!(decode(r#"{"notes":[{"id":1}],"activeNoteId":null}"#).is_err());
        assert!(decode("not json").is_err());
    }

    #[test]
    fn hydrate_clears_dangling_active_id() {
        let mut storage = MemoryStorage::new();
        storage
            .write(
                "k",
                r#"{"notes":[],"activeNoteId":"ghost"}"#,
            )
            .unwrap();

        let (store, outcome) = hydrate(&storage, "k");
        assert_eq!(store, Store::default());
        assert_eq!(
            outcome,
            HydrationOutcome::Restored {
                notes: 0,
                repaired: vec![StoreViolation::DanglingActiveId(NoteId::from("ghost"))],
            }
        );
    }
}
