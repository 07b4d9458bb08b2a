//! Note id generation.
//!
//! # Responsibility
//! - Produce fresh, never-reused note identifiers.
//! - Allow deterministic ids in tests via `SequentialIdGenerator`.

use crate::model::note::NoteId;
use uuid::Uuid;

/// Source of unique note identifiers.
pub trait IdGenerator {
    fn next_id(&mut self) -> NoteId;
}

/// Random v4 UUID ids (hyphenated lowercase).
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn next_id(&mut self) -> NoteId {
        NoteId::new(Uuid::new_v4().to_string())
    }
}

/// Predictable ids of the form `<prefix>-<n>`, starting at 1.
#[derive(Debug, Clone)]
pub struct SequentialIdGenerator {
    prefix: String,
    next: u64,
}

impl SequentialIdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }
}

impl Default for SequentialIdGenerator {
    fn default() -> Self {
        Self::new("note")
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&mut self) -> NoteId {
        let id = NoteId::new(format!("{}-{}", self.prefix, self.next));
        self.next += 1;
        id
    }
}
