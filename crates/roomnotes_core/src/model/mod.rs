//! Domain model for persisted notes.
//!
//! # Responsibility
//! - Define the data structures shared by storage, facade and UI callers.
//!
//! # Invariants
//! - Every persisted note is identified by a storage-assigned `NoteId`.
//! - Deletion is a hard delete; there are no tombstones.

pub mod note;
