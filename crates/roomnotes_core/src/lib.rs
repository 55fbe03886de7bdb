//! Core note persistence for RoomNotes.
//! This crate owns the notes table and the live note collection; UI layers
//! only call into it and render what it emits.

pub mod config;
pub mod db;
pub mod live;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;

pub use config::{ConfigError, CoreConfig};
pub use live::{LiveNotes, NoteSubscription, NotesSnapshot};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::note::{Note, NoteId, UNSAVED_NOTE_ID};
pub use repo::note_repo::{NoteRepository, RepoError, RepoResult, SqliteNoteRepository};
pub use service::note_editor::NoteEditor;
pub use service::note_service::NoteService;
pub use store::{MemoryNoteStore, NoteStore, SqliteNoteStore, StoreError, StoreResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
