//! Domain model for notes and the in-memory store.
//!
//! # Responsibility
//! - Define the `Note` record and the `Store` value shared by every layer.
//! - Keep the persisted wire shape (`camelCase`, ISO-8601 timestamps) next to
//!   the types so encode/decode cannot drift from the model.
//!
//! # Invariants
//! - `updated_at >= created_at` for every note.
//! - An active note id, when present, names exactly one note in the store.

pub mod note;
pub mod store;
