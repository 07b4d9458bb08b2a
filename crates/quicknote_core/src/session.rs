//! Presentation-facing session over the note store.
//!
//! # Responsibility
//! - Accept user intents as `Event`s in the order they were issued.
//! - Keep the editor buffer bound to whichever note is active.
//! - Expose one read-only view for rendering.
//!
//! # Invariants
//! - Buffered editor input is committed to the note it was typed into before
//!   any create/select/delete intent is applied.
//! - Edits with no active note are ignored, not buffered.
//! - Dropping the session commits buffered input before the manager's final
//!   flush.

use crate::clock::{Clock, SystemClock};
use crate::editor::EditorBuffer;
use crate::id::{IdGenerator, UuidIdGenerator};
use crate::manager::{NoteStoreManager, PersistenceStatus};
use crate::model::note::NoteId;
use crate::model::store::Store;
use crate::storage::{KeyValueStorage, StorageError};
use log::debug;

/// User intent forwarded by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    CreateNote,
    SelectNote(String),
    EditContent(String),
    DeleteNote(String),
}

impl Event {
    fn name(&self) -> &'static str {
        match self {
            Self::CreateNote => "create_note",
            Self::SelectNote(_) => "select_note",
            Self::EditContent(_) => "edit_content",
            Self::DeleteNote(_) => "delete_note",
        }
    }
}

/// How the session handled one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    /// The store changed.
    Applied,
    /// Input was buffered in the editor and will reach the store later.
    Buffered,
    /// Nothing changed (unknown id, cool-down, no active note).
    Ignored,
}

/// Render-ready snapshot of session state.
#[derive(Debug, Clone, Copy)]
pub struct SessionView<'a> {
    pub store: &'a Store,
    pub is_creating: bool,
    /// Text the editor shows, which may be ahead of the store.
    pub editor_text: &'a str,
    pub persistence: &'a PersistenceStatus,
}

/// Note store manager plus the editor buffer of the active note.
pub struct NoteSession<S, C = SystemClock, G = UuidIdGenerator>
where
    S: KeyValueStorage,
    C: Clock,
    G: IdGenerator,
{
    manager: NoteStoreManager<S, C, G>,
    editor: EditorBuffer,
    bound_note: Option<NoteId>,
    closed: bool,
}

impl<S, C, G> NoteSession<S, C, G>
where
    S: KeyValueStorage,
    C: Clock,
    G: IdGenerator,
{
    /// Wraps a hydrated manager and loads the active note into the editor.
    pub fn new(manager: NoteStoreManager<S, C, G>) -> Self {
        let editor = EditorBuffer::new(manager.config().editor_debounce());
        let mut session = Self {
            manager,
            editor,
            bound_note: None,
            closed: false,
        };
        session.rebind_editor();
        session
    }

    pub fn manager(&self) -> &NoteStoreManager<S, C, G> {
        &self.manager
    }

    pub fn view(&self) -> SessionView<'_> {
        SessionView {
            store: self.manager.store(),
            is_creating: self.manager.is_creating(),
            editor_text: self.editor.text(),
            persistence: self.manager.persistence_status(),
        }
    }

    /// Applies one user intent.
    pub fn handle(&mut self, event: Event) -> EventOutcome {
        let name = event.name();
        let applied = match event {
            Event::EditContent(text) => return self.buffer_edit(text),
            Event::CreateNote => {
                self.commit_editor();
                self.manager.create_note().is_some()
            }
            Event::SelectNote(id) => {
                self.commit_editor();
                self.manager.select_note(&id)
            }
            Event::DeleteNote(id) => {
                self.commit_editor();
                self.manager.delete_note(&id)
            }
        };
        self.rebind_editor();

        debug!("event=session_event module=session kind={name} applied={applied}");
        if applied {
            EventOutcome::Applied
        } else {
            EventOutcome::Ignored
        }
    }

    /// Fires due editor commits, then due manager timers.
    ///
    /// Returns whether a persistence write was attempted.
    pub fn poll(&mut self) -> bool {
        let now = self.manager.now();
        if let Some(text) = self.editor.poll(now) {
            self.manager.update_active_note_content(text);
        }
        self.manager.poll()
    }

    /// Commits buffered input and writes the store immediately.
    pub fn flush(&mut self) -> Result<bool, StorageError> {
        self.commit_editor();
        self.manager.flush()
    }

    /// Commits buffered input and performs the final flush.
    pub fn close(mut self) -> Result<(), StorageError> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Result<(), StorageError> {
        self.closed = true;
        self.commit_editor();
        self.manager.flush().map(|_| ())
    }

    fn buffer_edit(&mut self, text: String) -> EventOutcome {
        if self.bound_note.is_none() {
            return EventOutcome::Ignored;
        }
        let now = self.manager.now();
        self.editor.input(text, now);
        EventOutcome::Buffered
    }

    fn commit_editor(&mut self) {
        if let Some(text) = self.editor.flush() {
            self.manager.update_active_note_content(text);
        }
    }

    fn rebind_editor(&mut self) {
        let active = self.manager.active_note_id().cloned();
        if active == self.bound_note {
            return;
        }
        let text = self
            .manager
            .active_note()
            .map(|note| note.content.clone())
            .unwrap_or_default();
        self.editor.reset(text);
        self.bound_note = active;
    }
}

impl<S, C, G> Drop for NoteSession<S, C, G>
where
    S: KeyValueStorage,
    C: Clock,
    G: IdGenerator,
{
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        // The manager's own drop writes whatever this leaves dirty.
        self.commit_editor();
    }
}
