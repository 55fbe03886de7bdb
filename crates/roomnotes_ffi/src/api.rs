//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the note calls a list/edit screen needs via FRB.
//! - Keep error semantics simple: envelopes with `ok` + `message`.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Blank inserts and unsaved-id updates are skipped, not failed.
//! - One process-wide store serves every call, so list reads observe all
//!   mutations made through this API.

use once_cell::sync::OnceCell;
use roomnotes_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    CoreConfig, Note, NoteEditor, NoteId, SqliteNoteStore,
};
use std::future::Future;
use tokio::runtime::Runtime;

static NOTES_RUNTIME: OnceCell<NotesRuntime> = OnceCell::new();

struct NotesRuntime {
    runtime: Runtime,
    store: SqliteNoteStore,
    editor: NoteEditor<SqliteNoteStore>,
}

impl NotesRuntime {
    fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }
}

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Sync call; may perform small file-system setup work.
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Note item rendered by list and edit views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteItem {
    pub id: i64,
    pub title: String,
    pub description: String,
}

impl From<&Note> for NoteItem {
    fn from(note: &Note) -> Self {
        Self {
            id: note.id,
            title: note.title.clone(),
            description: note.description.clone(),
        }
    }
}

/// Envelope for insert/update/delete calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteActionResponse {
    /// Whether the call completed without a storage fault.
    pub ok: bool,
    /// Whether a row was created, changed or removed.
    pub applied: bool,
    /// Created or targeted note id, when known.
    pub note_id: Option<i64>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl NoteActionResponse {
    fn applied(message: impl Into<String>, note_id: NoteId) -> Self {
        Self {
            ok: true,
            applied: true,
            note_id: Some(note_id),
            message: message.into(),
        }
    }

    fn skipped(message: impl Into<String>, note_id: Option<NoteId>) -> Self {
        Self {
            ok: true,
            applied: false,
            note_id,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            applied: false,
            note_id: None,
            message: message.into(),
        }
    }
}

/// Envelope for the one-shot point lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteGetResponse {
    pub ok: bool,
    pub item: Option<NoteItem>,
    pub message: String,
}

/// Envelope for the full newest-first collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteListResponse {
    pub ok: bool,
    pub items: Vec<NoteItem>,
    pub message: String,
}

/// Creates a note from form input.
///
/// # FFI contract
/// - Async call on the FRB worker pool; returns once the row is durable.
/// - Both fields blank: `ok=true, applied=false`, nothing stored.
/// - Never panics.
pub fn notes_insert(title: String, description: String) -> NoteActionResponse {
    let notes = match notes_runtime() {
        Ok(notes) => notes,
        Err(err) => return NoteActionResponse::failure(err),
    };
    match notes.block_on(notes.editor.insert(title, description)) {
        Ok(Some(id)) => NoteActionResponse::applied("Note created.", id),
        Ok(None) => NoteActionResponse::skipped("Empty note skipped.", None),
        Err(err) => NoteActionResponse::failure(format!("notes_insert failed: {err}")),
    }
}

/// Replaces title/description of a saved note.
///
/// # FFI contract
/// - Async call on the FRB worker pool.
/// - Unsaved (`id <= 0`) or missing ids: `ok=true, applied=false`.
/// - Never panics.
pub fn notes_update(id: i64, title: String, description: String) -> NoteActionResponse {
    let notes = match notes_runtime() {
        Ok(notes) => notes,
        Err(err) => return NoteActionResponse::failure(err),
    };
    match notes.block_on(notes.editor.update(id, title, description)) {
        Ok(true) => NoteActionResponse::applied("Note updated.", id),
        Ok(false) => NoteActionResponse::skipped("No note to update.", Some(id)),
        Err(err) => NoteActionResponse::failure(format!("notes_update failed: {err}")),
    }
}

/// Deletes a note by id.
///
/// # FFI contract
/// - Async call on the FRB worker pool.
/// - Already absent: `ok=true, applied=false`.
/// - Never panics.
pub fn notes_delete(id: i64) -> NoteActionResponse {
    let notes = match notes_runtime() {
        Ok(notes) => notes,
        Err(err) => return NoteActionResponse::failure(err),
    };
    let target = Note::with_id(id, "", "");
    match notes.block_on(notes.editor.delete(target)) {
        Ok(true) => NoteActionResponse::applied("Note deleted.", id),
        Ok(false) => NoteActionResponse::skipped("Note already deleted.", Some(id)),
        Err(err) => NoteActionResponse::failure(format!("notes_delete failed: {err}")),
    }
}

/// Loads one note to pre-populate an edit form.
///
/// # FFI contract
/// - Async call on the FRB worker pool.
/// - Missing id: `ok=true, item=None`.
pub fn notes_get(id: i64) -> NoteGetResponse {
    let notes = match notes_runtime() {
        Ok(notes) => notes,
        Err(err) => {
            return NoteGetResponse {
                ok: false,
                item: None,
                message: err,
            }
        }
    };
    match notes.block_on(notes.editor.get_by_id(id)) {
        Ok(item) => NoteGetResponse {
            ok: true,
            message: if item.is_some() {
                "Note found.".to_string()
            } else {
                "Note not found.".to_string()
            },
            item: item.as_ref().map(NoteItem::from),
        },
        Err(err) => NoteGetResponse {
            ok: false,
            item: None,
            message: format!("notes_get failed: {err}"),
        },
    }
}

/// Returns the current collection, newest first.
///
/// # FFI contract
/// - Sync call; reads the live snapshot, no database round trip.
/// - Pull only: no change notification crosses this boundary, so hosts
///   re-read after their own mutations or on their refresh trigger.
///   Push delivery needs an FRB `StreamSink` entry point from generated glue.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_list() -> NoteListResponse {
    match notes_runtime() {
        Ok(notes) => {
            let items = notes
                .store
                .live()
                .latest()
                .iter()
                .map(NoteItem::from)
                .collect::<Vec<_>>();
            NoteListResponse {
                ok: true,
                message: format!("{} note(s).", items.len()),
                items,
            }
        }
        Err(err) => NoteListResponse {
            ok: false,
            items: Vec::new(),
            message: err,
        },
    }
}

fn notes_runtime() -> Result<&'static NotesRuntime, String> {
    NOTES_RUNTIME.get_or_try_init(|| {
        let config = CoreConfig::from_env().map_err(|err| format!("config invalid: {err}"))?;
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("roomnotes-ffi")
            .build()
            .map_err(|err| format!("runtime start failed: {err}"))?;
        let store = SqliteNoteStore::open(&config.db_path)
            .map_err(|err| format!("notes DB open failed: {err}"))?;
        log::info!("event=ffi_init module=ffi status=ok");
        Ok(NotesRuntime {
            runtime,
            editor: NoteEditor::with_store(store.clone()),
            store,
        })
    })
}
