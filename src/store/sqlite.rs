//! SQLite implementation of `NoteStore`.
//!
//! A single connection guarded by a mutex; every query runs on the blocking
//! pool via `spawn_blocking`. The schema is created idempotently when the
//! database is opened.

use super::models::{Note, NoteFields, User};
use super::{NoteStore, StoreError, StoreResult};
use async_trait::async_trait;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{debug, info};
use uuid::Uuid;

const SCHEMA: &str = include_str!("schema.sql");

/// `NoteStore` backed by a SQLite database file (or in-memory database).
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) a database file and apply the schema.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let started_at = Instant::now();
        let conn = Connection::open(path.as_ref())?;
        let store = Self::bootstrap(conn)?;
        info!(
            path = %path.as_ref().display(),
            duration_ms = started_at.elapsed().as_millis() as u64,
            "Opened SQLite database"
        );
        Ok(store)
    }

    /// Open a private in-memory database.
    pub fn in_memory() -> StoreResult<Self> {
        Self::bootstrap(Connection::open_in_memory()?)
    }

    fn bootstrap(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` with exclusive access to the connection on the blocking pool.
    async fn with_conn<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&Connection) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn.lock().map_err(|_| StoreError::Poisoned)?;
            f(&guard)
        })
        .await?
    }
}

// ============================================================================
// Row mapping
// ============================================================================

fn uuid_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let raw: String = row.get(idx)?;
    raw.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: uuid_column(row, 0)?,
        username: row.get(1)?,
        password_hash: row.get(2)?,
        created_at: row.get(3)?,
    })
}

fn note_from_row(row: &Row<'_>) -> rusqlite::Result<Note> {
    Ok(Note {
        id: uuid_column(row, 0)?,
        title: row.get(1)?,
        text: row.get(2)?,
        slug: row.get(3)?,
        author_id: uuid_column(row, 4)?,
        created_at: row.get(5)?,
    })
}

/// True when `err` is a UNIQUE violation on `table.column`.
fn is_unique_violation(err: &rusqlite::Error, column: &str) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(e, Some(msg)) => {
            e.code == rusqlite::ErrorCode::ConstraintViolation
                && msg.contains("UNIQUE")
                && msg.contains(column)
        }
        _ => false,
    }
}

const USER_COLUMNS: &str = "id, username, password_hash, created_at";
const NOTE_COLUMNS: &str = "id, title, text, slug, author_id, created_at";

#[async_trait]
impl NoteStore for SqliteStore {
    async fn create_user(&self, user: &User) -> StoreResult<()> {
        let user = user.clone();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO users (id, username, password_hash, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    user.id.to_string(),
                    user.username,
                    user.password_hash,
                    user.created_at
                ],
            )
            .map_err(|e| {
                if is_unique_violation(&e, "users.username") {
                    StoreError::DuplicateUsername(user.username.clone())
                } else {
                    StoreError::Sqlite(e)
                }
            })?;
            Ok(())
        })
        .await
    }

    async fn get_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        self.with_conn(move |conn| {
            let user = conn
                .query_row(
                    &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                    params![id.to_string()],
                    user_from_row,
                )
                .optional()?;
            Ok(user)
        })
        .await
    }

    async fn get_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let username = username.to_string();
        self.with_conn(move |conn| {
            let user = conn
                .query_row(
                    &format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1"),
                    params![username],
                    user_from_row,
                )
                .optional()?;
            Ok(user)
        })
        .await
    }

    async fn create_note(&self, note: &Note) -> StoreResult<()> {
        let note = note.clone();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO notes (id, title, text, slug, author_id, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    note.id.to_string(),
                    note.title,
                    note.text,
                    note.slug,
                    note.author_id.to_string(),
                    note.created_at
                ],
            )
            .map_err(|e| {
                if is_unique_violation(&e, "notes.slug") {
                    StoreError::DuplicateSlug(note.slug.clone())
                } else {
                    StoreError::Sqlite(e)
                }
            })?;
            Ok(())
        })
        .await
    }

    async fn get_note_by_slug(&self, slug: &str) -> StoreResult<Option<Note>> {
        let slug = slug.to_string();
        self.with_conn(move |conn| {
            let note = conn
                .query_row(
                    &format!("SELECT {NOTE_COLUMNS} FROM notes WHERE slug = ?1"),
                    params![slug],
                    note_from_row,
                )
                .optional()?;
            Ok(note)
        })
        .await
    }

    async fn list_notes_by_author(&self, author_id: Uuid) -> StoreResult<Vec<Note>> {
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {NOTE_COLUMNS} FROM notes WHERE author_id = ?1 ORDER BY rowid"
            ))?;
            let rows = stmt.query_map(params![author_id.to_string()], note_from_row)?;
            let notes = rows.collect::<Result<Vec<_>, _>>()?;
            debug!(%author_id, count = notes.len(), "Listed notes");
            Ok(notes)
        })
        .await
    }

    async fn slug_exists(&self, slug: &str, exclude: Option<Uuid>) -> StoreResult<bool> {
        let slug = slug.to_string();
        let exclude = exclude.map(|id| id.to_string());
        self.with_conn(move |conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM notes WHERE slug = ?1 AND (?2 IS NULL OR id <> ?2)",
                params![slug, exclude],
                |row| row.get(0),
            )?;
            Ok(count > 0)
        })
        .await
    }

    async fn update_note(&self, id: Uuid, fields: &NoteFields) -> StoreResult<bool> {
        let fields = fields.clone();
        self.with_conn(move |conn| {
            let changed = conn
                .execute(
                    "UPDATE notes SET title = ?1, text = ?2, slug = ?3 WHERE id = ?4",
                    params![fields.title, fields.text, fields.slug, id.to_string()],
                )
                .map_err(|e| {
                    if is_unique_violation(&e, "notes.slug") {
                        StoreError::DuplicateSlug(fields.slug.clone())
                    } else {
                        StoreError::Sqlite(e)
                    }
                })?;
            Ok(changed > 0)
        })
        .await
    }

    async fn delete_note(&self, id: Uuid) -> StoreResult<bool> {
        self.with_conn(move |conn| {
            let changed = conn.execute("DELETE FROM notes WHERE id = ?1", params![id.to_string()])?;
            Ok(changed > 0)
        })
        .await
    }

    async fn count_notes(&self) -> StoreResult<u64> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM notes", [], |row| row.get(0))?;
            Ok(count as u64)
        })
        .await
    }
}

// ============================================================================
// Tests
// ============================================================================
