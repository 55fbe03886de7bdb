//! Caller-side note editing use-cases.
//!
//! # Responsibility
//! - Normalize form input (trim) before it reaches the facade.
//! - Drop inputs the store must never see: blank notes, unsaved update ids.
//!
//! # Invariants
//! - A note whose title and description are both blank is never inserted.
//! - `update` with `id <= 0` never reaches the store.
//! - Storage faults are returned unchanged.

use crate::live::NoteSubscription;
use crate::model::note::{Note, NoteId};
use crate::service::note_service::NoteService;
use crate::store::{NoteStore, StoreResult};
use log::debug;

/// Use-case layer consumed by list/edit screens.
pub struct NoteEditor<S: NoteStore> {
    service: NoteService<S>,
}

impl<S: NoteStore> NoteEditor<S> {
    pub fn new(service: NoteService<S>) -> Self {
        Self { service }
    }

    /// Shortcut for `NoteEditor::new(NoteService::new(store))`.
    pub fn with_store(store: S) -> Self {
        Self::new(NoteService::new(store))
    }

    pub fn service(&self) -> &NoteService<S> {
        &self.service
    }

    /// Creates a note from raw form input.
    ///
    /// Returns `Ok(None)` when both fields are blank; nothing is stored then.
    pub async fn insert(
        &self,
        title: impl AsRef<str>,
        description: impl AsRef<str>,
    ) -> StoreResult<Option<NoteId>> {
        let note = Note::new(title, description);
        if note.is_blank() {
            debug!("event=note_insert module=editor status=skipped reason=blank");
            return Ok(None);
        }
        self.service.insert(note).await.map(Some)
    }

    /// Replaces title/description of a saved note from raw form input.
    ///
    /// Returns `Ok(false)` for unsaved ids and for ids with no stored row.
    pub async fn update(
        &self,
        id: NoteId,
        title: impl AsRef<str>,
        description: impl AsRef<str>,
    ) -> StoreResult<bool> {
        let note = Note::with_id(id, title, description);
        if !note.is_persisted() {
            debug!("event=note_update module=editor status=skipped reason=unsaved_id id={id}");
            return Ok(false);
        }
        self.service.update(note).await
    }

    pub async fn delete(&self, note: Note) -> StoreResult<bool> {
        self.service.delete(note).await
    }

    /// Loads a note to pre-populate an edit form.
    pub async fn get_by_id(&self, id: NoteId) -> StoreResult<Option<Note>> {
        self.service.get_by_id(id).await
    }

    /// Live collection for the list view.
    pub fn notes(&self) -> NoteSubscription {
        self.service.get_all_notes()
    }
}

#[cfg(test)]
mod tests {
    use super::NoteEditor;
    use crate::store::MemoryNoteStore;

    #[tokio::test]
    async fn blank_input_is_skipped() {
        let store = MemoryNoteStore::new();
        let editor = NoteEditor::with_store(store.clone());
        let mut notes = editor.notes();
        notes.recv().await.unwrap();

        assert_eq!(editor.insert(" ", "").await.unwrap(), None);
        assert_eq!(editor.insert("\n\t", "   ").await.unwrap(), None);
        assert!(notes.try_recv().is_none());
        assert!(store.live().latest().is_empty());
    }

    #[tokio::test]
    async fn title_only_or_description_only_is_accepted() {
        let editor = NoteEditor::with_store(MemoryNoteStore::new());
        assert!(editor.insert("title", " ").await.unwrap().is_some());
        assert!(editor.insert("", "body").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn unsaved_id_update_is_skipped() {
        let editor = NoteEditor::with_store(MemoryNoteStore::new());
        editor.insert("a", "b").await.unwrap();

        assert!(!editor.update(0, "x", "y").await.unwrap());
        assert!(!editor.update(-3, "x", "y").await.unwrap());
    }

    #[tokio::test]
    async fn update_trims_input() {
        let editor = NoteEditor::with_store(MemoryNoteStore::new());
        let id = editor.insert("a", "b").await.unwrap().unwrap();

        assert!(editor.update(id, "  new ", " body  ").await.unwrap());
        let loaded = editor.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(loaded.title, "new");
        assert_eq!(loaded.description, "body");
    }
}
