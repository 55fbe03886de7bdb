//! Async note store: durable CRUD plus the live note collection.
//!
//! # Responsibility
//! - Define the `NoteStore` seam consumed by the facade.
//! - Provide SQLite-backed and in-memory implementations.
//!
//! # Invariants
//! - Every effective mutation publishes exactly one new full collection.
//! - Referential misses return `false` and publish nothing.
//! - A failed mutation publishes nothing.
//! - Dropping a pending operation future does not cancel the write.

use crate::db::DbError;
use crate::live::NoteSubscription;
use crate::model::note::{Note, NoteId};
use crate::repo::note_repo::RepoError;
use async_trait::async_trait;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

mod memory;
mod sqlite;

pub use memory::MemoryNoteStore;
pub use sqlite::SqliteNoteStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage fault surfaced by a `NoteStore` operation.
#[derive(Debug)]
pub enum StoreError {
    /// Persistence-layer failure.
    Repo(RepoError),
    /// The blocking worker running the operation panicked or was aborted.
    Worker(String),
    /// No id is left above the highest one ever assigned.
    IdsExhausted,
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::Worker(message) => write!(f, "store worker failed: {message}"),
            Self::IdsExhausted => write!(f, "note id space exhausted"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Worker(_) | Self::IdsExhausted => None,
        }
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Repo(RepoError::Db(value))
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Repo(value.into())
    }
}

/// Exclusive owner of the durable note collection.
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Persists a new note and returns its assigned id. `note.id` is ignored.
    async fn insert(&self, note: Note) -> StoreResult<NoteId>;

    /// Inserts, replacing any existing row with the same positive id.
    async fn upsert(&self, note: Note) -> StoreResult<NoteId>;

    /// Replaces title/description of `note.id`. `Ok(false)` when absent.
    async fn update(&self, note: Note) -> StoreResult<bool>;

    /// Removes the record with `note.id`. `Ok(false)` when already absent.
    async fn delete(&self, note: Note) -> StoreResult<bool>;

    /// One-shot point lookup.
    async fn get_by_id(&self, id: NoteId) -> StoreResult<Option<Note>>;

    /// Subscribes to the full collection, newest id first.
    fn get_all_notes(&self) -> NoteSubscription;
}

#[async_trait]
impl<S: NoteStore + ?Sized> NoteStore for Arc<S> {
    async fn insert(&self, note: Note) -> StoreResult<NoteId> {
        (**self).insert(note).await
    }

    async fn upsert(&self, note: Note) -> StoreResult<NoteId> {
        (**self).upsert(note).await
    }

    async fn update(&self, note: Note) -> StoreResult<bool> {
        (**self).update(note).await
    }

    async fn delete(&self, note: Note) -> StoreResult<bool> {
        (**self).delete(note).await
    }

    async fn get_by_id(&self, id: NoteId) -> StoreResult<Option<Note>> {
        (**self).get_by_id(id).await
    }

    fn get_all_notes(&self) -> NoteSubscription {
        (**self).get_all_notes()
    }
}
