//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define synchronous data access contracts over the `notes` table.
//! - Isolate SQLite query details from the async store and facade.
//!
//! # Invariants
//! - Referential misses (update/delete of an absent id) are reported as
//!   `false`, never as errors.

pub mod note_repo;
