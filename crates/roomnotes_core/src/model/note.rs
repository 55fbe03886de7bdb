//! Note domain model.
//!
//! # Responsibility
//! - Define the single persisted record shown by list and edit views.
//! - Provide normalization helpers used before any write reaches storage.
//!
//! # Invariants
//! - `id` is assigned by storage and never changes afterwards.
//! - `id <= 0` means "not yet persisted".
//! - Stored `title`/`description` values are trimmed.

use serde::{Deserialize, Serialize};

/// Storage-assigned integer identifier of a note.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type NoteId = i64;

/// Sentinel id carried by notes that have not been inserted yet.
pub const UNSAVED_NOTE_ID: NoteId = 0;

/// Canonical note record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Note {
    /// Storage-assigned id, `0` until first insert.
    #[serde(default)]
    pub id: NoteId,
    pub title: String,
    pub description: String,
}

impl Note {
    /// Creates an unpersisted note from trimmed input.
    pub fn new(title: impl AsRef<str>, description: impl AsRef<str>) -> Self {
        Self::with_id(UNSAVED_NOTE_ID, title, description)
    }

    /// Creates a note for an existing (or caller-chosen) id from trimmed input.
    pub fn with_id(id: NoteId, title: impl AsRef<str>, description: impl AsRef<str>) -> Self {
        Self {
            id,
            title: title.as_ref().trim().to_string(),
            description: description.as_ref().trim().to_string(),
        }
    }

    /// Returns whether storage has assigned an id to this note.
    pub fn is_persisted(&self) -> bool {
        self.id > UNSAVED_NOTE_ID
    }

    /// Returns whether both fields are empty once whitespace is ignored.
    pub fn is_blank(&self) -> bool {
        self.title.trim().is_empty() && self.description.trim().is_empty()
    }

    /// Returns a copy with both text fields trimmed.
    pub fn trimmed(&self) -> Self {
        Self::with_id(self.id, &self.title, &self.description)
    }
}

/// Sorts notes into live-collection order: id descending.
pub(crate) fn sort_newest_first(notes: &mut [Note]) {
    notes.sort_unstable_by(|left, right| right.id.cmp(&left.id));
}
