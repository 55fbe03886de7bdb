//! Core use-case services.
//!
//! # Responsibility
//! - `note_service`: pass-through facade keeping callers storage-agnostic.
//! - `note_editor`: caller-side input normalization and validation.

pub mod note_editor;
pub mod note_service;
