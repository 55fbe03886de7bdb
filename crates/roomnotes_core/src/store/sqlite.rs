//! SQLite-backed `NoteStore`.
//!
//! # Invariants
//! - One connection, guarded by a mutex; mutations are serialized.
//! - Write, snapshot reload and publish happen under the same lock, so
//!   emissions follow mutation order.
//! - Each mutation and its snapshot reload share one transaction.

use super::{NoteStore, StoreError, StoreResult};
use crate::db::{open_db, open_db_in_memory};
use crate::live::{LiveNotes, NoteSubscription};
use crate::model::note::{Note, NoteId};
use crate::repo::note_repo::{NoteRepository, RepoResult, SqliteNoteRepository};
use async_trait::async_trait;
use log::{debug, error};
use parking_lot::Mutex;
use rusqlite::{Connection, TransactionBehavior};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// Note store over a single SQLite connection.
///
/// Cloning is cheap; clones share the connection and the live hub.
#[derive(Clone)]
pub struct SqliteNoteStore {
    conn: Arc<Mutex<Connection>>,
    live: LiveNotes,
}

impl SqliteNoteStore {
    /// Opens (and migrates) a database file.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::from_connection(open_db(path)?)
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::from_connection(open_db_in_memory()?)
    }

    /// Takes exclusive ownership of a migrated connection.
    ///
    /// # Errors
    /// - Schema errors when the connection does not carry the `notes` table.
    pub fn from_connection(conn: Connection) -> StoreResult<Self> {
        let initial = SqliteNoteRepository::try_new(&conn)?.list_notes()?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            live: LiveNotes::new(initial),
        })
    }

    /// Live hub shared by all subscriptions of this store.
    pub fn live(&self) -> &LiveNotes {
        &self.live
    }

    async fn read<T, F>(&self, op: &'static str, f: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&SqliteNoteRepository<'_>) -> RepoResult<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        run_blocking(op, move || {
            let conn = conn.lock();
            Ok(f(&SqliteNoteRepository::new(&conn))?)
        })
        .await
    }

    /// Runs one mutation; `f` returns the caller value and whether a row changed.
    async fn write<T, F>(&self, op: &'static str, f: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&SqliteNoteRepository<'_>) -> RepoResult<(T, bool)> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        let live = self.live.clone();
        run_blocking(op, move || {
            let mut conn = conn.lock();
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let repo = SqliteNoteRepository::new(&tx);
            let (value, changed) = f(&repo)?;
            let snapshot = if changed {
                Some(repo.list_notes()?)
            } else {
                None
            };
            tx.commit()?;

            if let Some(notes) = snapshot {
                live.publish(notes);
            }
            Ok(value)
        })
        .await
    }
}

async fn run_blocking<T, F>(op: &'static str, f: F) -> StoreResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> StoreResult<T> + Send + 'static,
{
    let started_at = Instant::now();
    // spawn_blocking tasks are not cancelled when this future is dropped.
    let result = match tokio::task::spawn_blocking(f).await {
        Ok(result) => result,
        Err(join_err) => Err(StoreError::Worker(join_err.to_string())),
    };

    match &result {
        Ok(_) => debug!(
            "event={op} module=store status=ok duration_ms={}",
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event={op} module=store status=error duration_ms={} error={}",
            started_at.elapsed().as_millis(),
            err
        ),
    }
    result
}

#[async_trait]
impl NoteStore for SqliteNoteStore {
    async fn insert(&self, note: Note) -> StoreResult<NoteId> {
        self.write("note_insert", move |repo| {
            Ok((repo.insert_note(&note)?, true))
        })
        .await
    }

    async fn upsert(&self, note: Note) -> StoreResult<NoteId> {
        self.write("note_upsert", move |repo| {
            Ok((repo.upsert_note(&note)?, true))
        })
        .await
    }

    async fn update(&self, note: Note) -> StoreResult<bool> {
        self.write("note_update", move |repo| {
            let changed = repo.update_note(&note)?;
            Ok((changed, changed))
        })
        .await
    }

    async fn delete(&self, note: Note) -> StoreResult<bool> {
        self.write("note_delete", move |repo| {
            let changed = repo.delete_note(note.id)?;
            Ok((changed, changed))
        })
        .await
    }

    async fn get_by_id(&self, id: NoteId) -> StoreResult<Option<Note>> {
        self.read("note_get", move |repo| repo.get_note(id)).await
    }

    fn get_all_notes(&self) -> NoteSubscription {
        self.live.subscribe()
    }
}
