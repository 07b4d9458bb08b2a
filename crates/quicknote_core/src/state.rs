//! Reducer-style mutation choke point for the note store.
//!
//! # Responsibility
//! - Define every mutation the store accepts as one `Action` value.
//! - Apply actions atomically, one at a time, in the order received.
//!
//! # Invariants
//! - `reduce` is the only code path that mutates a live `Store`.
//! - Unknown ids are silent no-ops reported as `Transition::Unchanged`.
//! - Every action leaves `Store::check_invariants()` empty when it was empty
//!   before.

use crate::model::note::{Note, NoteId};
use crate::model::store::Store;
use chrono::{DateTime, Utc};

/// User intent already resolved to concrete inputs (ids, timestamps).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Prepend a new empty note and make it active.
    CreateNote { id: NoteId, at: DateTime<Utc> },
    /// Make an existing note active.
    SelectNote { id: NoteId },
    /// Replace the active note's content.
    UpdateActiveContent { content: String, at: DateTime<Utc> },
    /// Remove a note, clearing the selection if it was active.
    DeleteNote { id: NoteId },
}

impl Action {
    /// Stable short name used in log events.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateNote { .. } => "create_note",
            Self::SelectNote { .. } => "select_note",
            Self::UpdateActiveContent { .. } => "update_active_content",
            Self::DeleteNote { .. } => "delete_note",
        }
    }
}

/// Whether an action changed the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Changed,
    Unchanged,
}

impl Transition {
    pub fn is_changed(self) -> bool {
        self == Self::Changed
    }
}

/// Applies one action to the store.
pub fn reduce(store: &mut Store, action: Action) -> Transition {
    match action {
        Action::CreateNote { id, at } => {
            if store.contains(id.as_str()) {
                return Transition::Unchanged;
            }
            store.notes.insert(0, Note::new(id.clone(), at));
            store.active_note_id = Some(id);
            Transition::Changed
        }
        Action::SelectNote { id } => {
            if !store.contains(id.as_str()) || store.active_note_id.as_ref() == Some(&id) {
                return Transition::Unchanged;
            }
            store.active_note_id = Some(id);
            Transition::Changed
        }
        Action::UpdateActiveContent { content, at } => match store.active_note_mut() {
            Some(note) => {
                note.set_content(content, at);
                Transition::Changed
            }
            None => Transition::Unchanged,
        },
        Action::DeleteNote { id } => {
            let Some(index) = store.position(id.as_str()) else {
                return Transition::Unchanged;
            };
            store.notes.remove(index);
            if store.active_note_id.as_ref() == Some(&id) {
                store.active_note_id = None;
            }
            Transition::Changed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{reduce, Action, Transition};
    use crate::model::note::NoteId;
    use crate::model::store::Store;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn at(offset_ms: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 8, 0, 0).unwrap() + Duration::milliseconds(offset_ms)
    }

    fn create(store: &mut Store, id: &str, offset_ms: i64) -> Transition {
        reduce(
            store,
            Action::CreateNote {
                id: NoteId::from(id),
                at: at(offset_ms),
            },
        )
    }

    #[test]
    fn create_prepends_and_activates() {
        let mut store = Store::new();
        create(&mut store, "a", 0);
        create(&mut store, "b", 10);

        let ids: Vec<&str> = store.notes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(store.active_note_id, Some(NoteId::from("b")));
    }

    #[test]
    fn create_with_existing_id_is_rejected() {
        let mut store = Store::new();
        create(&mut store, "a", 0);
        let before = store.clone();

        assert_eq!(create(&mut store, "a", 5), Transition::Unchanged);
        assert_eq!(store, before);
    }

    #[test]
    fn select_unknown_or_already_active_is_unchanged() {
        let mut store = Store::new();
        create(&mut store, "a", 0);

        let unknown = reduce(
            &mut store,
            Action::SelectNote {
                id: NoteId::from("zzz"),
            },
        );
        let same = reduce(
            &mut store,
            Action::SelectNote {
                id: NoteId::from("a"),
            },
        );
        assert_eq!(unknown, Transition::Unchanged);
        assert_eq!(same, Transition::Unchanged);
    }

    #[test]
    fn update_without_active_note_is_identity() {
        let mut store = Store::new();
        create(&mut store, "a", 0);
        reduce(
            &mut store,
            Action::DeleteNote {
                id: NoteId::from("a"),
            },
        );
        create(&mut store, "b", 1);
        reduce(
            &mut store,
            Action::DeleteNote {
                id: NoteId::from("b"),
            },
        );
        let before = store.clone();

        let transition = reduce(
            &mut store,
            Action::UpdateActiveContent {
                content: "lost".to_string(),
                at: at(50),
            },
        );
        assert_eq!(transition, Transition::Unchanged);
        assert_eq!(store, before);
    }

    #[test]
    fn delete_non_active_keeps_selection() {
        let mut store = Store::new();
        create(&mut store, "a", 0);
        create(&mut store, "b", 1);

        let transition = reduce(
            &mut store,
            Action::DeleteNote {
                id: NoteId::from("a"),
            },
        );
        assert!(transition.is_changed());
        assert_eq!(store.len(), 1);
        assert_eq!(store.active_note_id, Some(NoteId::from("b")));
    }
}
