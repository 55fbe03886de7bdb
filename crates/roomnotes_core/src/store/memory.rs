//! In-memory `NoteStore` for tests and ephemeral sessions.

use super::{NoteStore, StoreError, StoreResult};
use crate::live::{LiveNotes, NoteSubscription};
use crate::model::note::{Note, NoteId};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Default)]
struct MemoryState {
    notes: BTreeMap<NoteId, Note>,
    // Mirrors AUTOINCREMENT: ids of deleted rows are never handed out again.
    last_id: NoteId,
}

impl MemoryState {
    fn snapshot(&self) -> Vec<Note> {
        self.notes.values().rev().cloned().collect()
    }

    fn store(&mut self, note: Note) -> NoteId {
        let id = note.id;
        self.last_id = self.last_id.max(id);
        self.notes.insert(id, note);
        id
    }
}

/// Note store backed by a `BTreeMap`; nothing survives the process.
#[derive(Clone)]
pub struct MemoryNoteStore {
    state: Arc<Mutex<MemoryState>>,
    live: LiveNotes,
}

impl MemoryNoteStore {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MemoryState::default())),
            live: LiveNotes::new(Vec::new()),
        }
    }

    /// Live hub shared by all subscriptions of this store.
    pub fn live(&self) -> &LiveNotes {
        &self.live
    }
}

impl Default for MemoryNoteStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NoteStore for MemoryNoteStore {
    async fn insert(&self, note: Note) -> StoreResult<NoteId> {
        let mut state = self.state.lock();
        let id = state
            .last_id
            .checked_add(1)
            .ok_or(StoreError::IdsExhausted)?;
        let id = state.store(Note::with_id(id, &note.title, &note.description));
        self.live.publish(state.snapshot());
        Ok(id)
    }

    async fn upsert(&self, note: Note) -> StoreResult<NoteId> {
        if !note.is_persisted() {
            return self.insert(note).await;
        }

        let mut state = self.state.lock();
        let id = state.store(note.trimmed());
        self.live.publish(state.snapshot());
        Ok(id)
    }

    async fn update(&self, note: Note) -> StoreResult<bool> {
        let mut state = self.state.lock();
        if !state.notes.contains_key(&note.id) {
            return Ok(false);
        }
        state.store(note.trimmed());
        self.live.publish(state.snapshot());
        Ok(true)
    }

    async fn delete(&self, note: Note) -> StoreResult<bool> {
        let mut state = self.state.lock();
        if state.notes.remove(&note.id).is_none() {
            return Ok(false);
        }
        self.live.publish(state.snapshot());
        Ok(true)
    }

    async fn get_by_id(&self, id: NoteId) -> StoreResult<Option<Note>> {
        Ok(self.state.lock().notes.get(&id).cloned())
    }

    fn get_all_notes(&self) -> NoteSubscription {
        self.live.subscribe()
    }
}
