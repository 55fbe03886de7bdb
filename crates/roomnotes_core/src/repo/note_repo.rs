//! Note repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide synchronous CRUD APIs over the `notes` table.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths trim `title`/`description` before SQL mutations.
//! - `insert_note` ignores the incoming id; `upsert_note` honors positive ids
//!   and replaces any row that already holds them.
//! - `list_notes` is always ordered by `id DESC`.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::DbError;
use crate::model::note::{Note, NoteId};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const NOTE_SELECT_SQL: &str = "SELECT
    id,
    title,
    description
FROM notes";

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for note persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Persisted data cannot be converted to a valid `Note`.
    InvalidData(String),
    /// Required table is missing from the connection schema.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted note data: {message}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "note repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "note repository requires column `{column}` in table `{table}`"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidData(_)
            | Self::MissingRequiredTable(_)
            | Self::MissingRequiredColumn { .. } => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for note CRUD operations.
pub trait NoteRepository {
    /// Inserts a new row and returns the storage-assigned id.
    fn insert_note(&self, note: &Note) -> RepoResult<NoteId>;
    /// Inserts or replaces by id. Non-positive ids behave like `insert_note`.
    fn upsert_note(&self, note: &Note) -> RepoResult<NoteId>;
    /// Replaces title/description. Returns `false` when no row matched.
    fn update_note(&self, note: &Note) -> RepoResult<bool>;
    /// Hard-deletes one row. Returns `false` when no row matched.
    fn delete_note(&self, id: NoteId) -> RepoResult<bool>;
    /// Gets one note by id.
    fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>>;
    /// Lists every note, newest id first.
    fn list_notes(&self) -> RepoResult<Vec<Note>>;
}

/// SQLite-backed note repository.
///
/// Borrows a connection, so it can also run inside a `Transaction`.
pub struct SqliteNoteRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNoteRepository<'conn> {
    /// Wraps a connection without schema checks.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Constructs a repository from a migrated/ready connection.
    ///
    /// # Errors
    /// - `MissingRequiredTable`/`MissingRequiredColumn` when the schema does
    ///   not carry the `notes` shape.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_note_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl NoteRepository for SqliteNoteRepository<'_> {
    fn insert_note(&self, note: &Note) -> RepoResult<NoteId> {
        let note = note.trimmed();
        self.conn.execute(
            "INSERT INTO notes (title, description) VALUES (?1, ?2);",
            params![note.title.as_str(), note.description.as_str()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn upsert_note(&self, note: &Note) -> RepoResult<NoteId> {
        if !note.is_persisted() {
            return self.insert_note(note);
        }

        let note = note.trimmed();
        self.conn.execute(
            "INSERT OR REPLACE INTO notes (id, title, description) VALUES (?1, ?2, ?3);",
            params![note.id, note.title.as_str(), note.description.as_str()],
        )?;
        Ok(note.id)
    }

    fn update_note(&self, note: &Note) -> RepoResult<bool> {
        let note = note.trimmed();
        let changed = self.conn.execute(
            "UPDATE notes
             SET
                title = ?2,
                description = ?3
             WHERE id = ?1;",
            params![note.id, note.title.as_str(), note.description.as_str()],
        )?;
        Ok(changed > 0)
    }

    fn delete_note(&self, id: NoteId) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM notes WHERE id = ?1;", [id])?;
        Ok(changed > 0)
    }

    fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{NOTE_SELECT_SQL} WHERE id = ?1 LIMIT 1;"))?;
        let row = stmt.query_row([id], parse_note_row).optional()?;
        row.transpose()
    }

    fn list_notes(&self) -> RepoResult<Vec<Note>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{NOTE_SELECT_SQL} ORDER BY id DESC;"))?;
        let mut rows = stmt.query([])?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(parse_note_row(row)??);
        }
        Ok(notes)
    }
}

// Outer result carries column access errors, inner result carries data
// validation errors; `query_row` only accepts the former from its closure.
fn parse_note_row(row: &Row<'_>) -> rusqlite::Result<RepoResult<Note>> {
    let id: NoteId = row.get("id")?;
    let title: Option<String> = row.get("title")?;
    let description: Option<String> = row.get("description")?;

    if id <= 0 {
        return Ok(Err(RepoError::InvalidData(format!(
            "invalid id value `{id}` in notes.id"
        ))));
    }

    Ok(Ok(Note {
        id,
        title: title.unwrap_or_default(),
        description: description.unwrap_or_default(),
    }))
}

fn ensure_note_connection_ready(conn: &Connection) -> RepoResult<()> {
    if !table_exists(conn, "notes")? {
        return Err(RepoError::MissingRequiredTable("notes"));
    }

    for column in ["id", "title", "description"] {
        if !table_has_column(conn, "notes", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "notes",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
