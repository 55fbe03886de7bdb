//! Note repository facade.
//!
//! # Responsibility
//! - Expose `NoteStore` operations to UI/FFI callers with unchanged shapes.
//!
//! # Invariants
//! - No retry, caching, transformation or error translation.
//! - Holds no state besides the injected store.

use crate::live::NoteSubscription;
use crate::model::note::{Note, NoteId};
use crate::store::{NoteStore, StoreResult};

/// Pass-through facade over any `NoteStore` implementation.
pub struct NoteService<S: NoteStore> {
    store: S,
}

impl<S: NoteStore> NoteService<S> {
    /// Creates a service using the provided store implementation.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn insert(&self, note: Note) -> StoreResult<NoteId> {
        self.store.insert(note).await
    }

    pub async fn upsert(&self, note: Note) -> StoreResult<NoteId> {
        self.store.upsert(note).await
    }

    pub async fn update(&self, note: Note) -> StoreResult<bool> {
        self.store.update(note).await
    }

    pub async fn delete(&self, note: Note) -> StoreResult<bool> {
        self.store.delete(note).await
    }

    pub async fn get_by_id(&self, id: NoteId) -> StoreResult<Option<Note>> {
        self.store.get_by_id(id).await
    }

    /// Live collection, newest id first.
    pub fn get_all_notes(&self) -> NoteSubscription {
        self.store.get_all_notes()
    }
}

#[cfg(test)]
mod tests {
    use super::NoteService;
    use crate::live::NoteSubscription;
    use crate::model::note::{Note, NoteId};
    use crate::store::{MemoryNoteStore, NoteStore, StoreError, StoreResult};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// Records calls and fails every mutation; reads come from a real store.
    #[derive(Default)]
    struct FailingStore {
        calls: Mutex<Vec<&'static str>>,
        inner: MemoryNoteStore,
    }

    impl FailingStore {
        fn fail(&self, op: &'static str) -> StoreError {
            self.calls.lock().push(op);
            StoreError::Worker(format!("{op} rejected"))
        }
    }

    #[async_trait]
    impl NoteStore for FailingStore {
        async fn insert(&self, _note: Note) -> StoreResult<NoteId> {
            Err(self.fail("insert"))
        }

        async fn upsert(&self, _note: Note) -> StoreResult<NoteId> {
            Err(self.fail("upsert"))
        }

        async fn update(&self, _note: Note) -> StoreResult<bool> {
            Err(self.fail("update"))
        }

        async fn delete(&self, _note: Note) -> StoreResult<bool> {
            Err(self.fail("delete"))
        }

        async fn get_by_id(&self, id: NoteId) -> StoreResult<Option<Note>> {
            self.calls.lock().push("get_by_id");
            self.inner.get_by_id(id).await
        }

        fn get_all_notes(&self) -> NoteSubscription {
            self.calls.lock().push("get_all_notes");
            self.inner.get_all_notes()
        }
    }

    #[tokio::test]
    async fn errors_pass_through_unchanged() {
        let store = Arc::new(FailingStore::default());
        let service = NoteService::new(Arc::clone(&store));

        let err = service.insert(Note::new("a", "b")).await.unwrap_err();
        assert!(matches!(err, StoreError::Worker(message) if message == "insert rejected"));
        let err = service.update(Note::with_id(1, "a", "b")).await.unwrap_err();
        assert!(matches!(err, StoreError::Worker(message) if message == "update rejected"));
        assert!(service.get_by_id(1).await.unwrap().is_none());

        let _sub = service.get_all_notes();
        assert_eq!(
            *store.calls.lock(),
            vec!["insert", "update", "get_by_id", "get_all_notes"]
        );
    }

    #[tokio::test]
    async fn delegates_to_swapped_store() {
        let service = NoteService::new(MemoryNoteStore::new());
        let id = service.insert(Note::new("Milk", "2 liters")).await.unwrap();

        let loaded = service.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(loaded, Note::with_id(id, "Milk", "2 liters"));
    }
}
