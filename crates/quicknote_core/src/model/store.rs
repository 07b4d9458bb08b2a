//! Store value: the ordered note list plus the active selection.
//!
//! # Responsibility
//! - Hold the authoritative in-memory state that gets snapshotted.
//! - Detect and repair invariant violations in externally sourced state.
//!
//! # Invariants
//! - `notes` is newest-first by construction.
//! - `active_note_id`, when present, names exactly one note in `notes`.

use crate::model::note::{Note, NoteId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::{Display, Formatter};

/// Complete note collection and editor selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    /// Notes ordered newest-first.
    pub notes: Vec<Note>,
    /// Note currently open for editing.
    #[serde(default)]
    pub active_note_id: Option<NoteId>,
}

/// One broken invariant found in a store value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreViolation {
    /// Two or more notes share the same id.
    DuplicateId(NoteId),
    /// `active_note_id` names no note in the list.
    DanglingActiveId(NoteId),
    /// `updated_at` precedes `created_at`.
    UpdatedBeforeCreated(NoteId),
}

impl Display for StoreViolation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateId(id) => write!(f, "duplicate note id: {id}"),
            Self::DanglingActiveId(id) => write!(f, "active note id has no note: {id}"),
            Self::UpdatedBeforeCreated(id) => {
                write!(f, "note updated before it was created: {id}")
            }
        }
    }
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Note> {
        self.notes.iter().find(|note| note.id == *id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    pub(crate) fn position(&self, id: &str) -> Option<usize> {
        self.notes.iter().position(|note| note.id == *id)
    }

    pub fn active_note(&self) -> Option<&Note> {
        let id = self.active_note_id.as_ref()?;
        self.get(id.as_str())
    }

    pub(crate) fn active_note_mut(&mut self) -> Option<&mut Note> {
        let id = self.active_note_id.as_ref()?;
        self.notes.iter_mut().find(|note| note.id == *id)
    }

    /// Lists every broken invariant without changing the store.
    pub fn check_invariants(&self) -> Vec<StoreViolation> {
        let mut violations = Vec::new();
        let mut seen = HashSet::new();
        for note in &self.notes {
            if !seen.insert(note.id.as_str()) {
                violations.push(StoreViolation::DuplicateId(note.id.clone()));
            }
            if !note.has_valid_timestamps() {
                violations.push(StoreViolation::UpdatedBeforeCreated(note.id.clone()));
            }
        }
        if let Some(active) = &self.active_note_id {
            if !seen.contains(active.as_str()) {
                violations.push(StoreViolation::DanglingActiveId(active.clone()));
            }
        }
        violations
    }

    /// Restores all invariants in place and returns what was fixed.
    ///
    /// Rules:
    /// - Duplicate ids keep the first (newest) occurrence.
    /// - `updated_at` earlier than `created_at` is raised to `created_at`.
    /// - A dangling `active_note_id` is cleared.
    pub fn repair(&mut self) -> Vec<StoreViolation> {
        let mut repaired = Vec::new();
        let mut seen = HashSet::new();
        self.notes.retain(|note| {
            let first = seen.insert(note.id.clone());
            if !first {
                repaired.push(StoreViolation::DuplicateId(note.id.clone()));
            }
            first
        });

        for note in &mut self.notes {
            if !note.has_valid_timestamps() {
                repaired.push(StoreViolation::UpdatedBeforeCreated(note.id.clone()));
                note.updated_at = note.created_at;
            }
        }

        let dangling = self
            .active_note_id
            .as_ref()
            .filter(|id| !seen.contains(*id))
            .cloned();
        if let Some(id) = dangling {
            repaired.push(StoreViolation::DanglingActiveId(id));
            self.active_note_id = None;
        }

        repaired
    }
}
