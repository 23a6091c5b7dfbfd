//! Relational storage for users and notes
//!
//! `NoteStore` is the abstract interface used by the managers and handlers;
//! `SqliteStore` is the only production backend. Tests run against
//! `SqliteStore::in_memory()`.

pub mod models;
pub mod sqlite;

pub use models::{Note, NoteFields, User};
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use uuid::Uuid;

/// Errors raised by the storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Another note already uses this slug.
    #[error("slug already in use: {0}")]
    DuplicateSlug(String),

    /// Another account already uses this username.
    #[error("username already in use: {0}")]
    DuplicateUsername(String),

    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("storage task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("connection lock poisoned")]
    Poisoned,
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Abstract interface for all persistence operations.
#[async_trait]
pub trait NoteStore: Send + Sync {
    // ========================================================================
    // Users
    // ========================================================================

    /// Insert a new user. Fails with `DuplicateUsername` on conflict.
    async fn create_user(&self, user: &User) -> StoreResult<()>;

    async fn get_user(&self, id: Uuid) -> StoreResult<Option<User>>;

    async fn get_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;

    // ========================================================================
    // Notes
    // ========================================================================

    /// Insert a new note. Fails with `DuplicateSlug` on conflict.
    async fn create_note(&self, note: &Note) -> StoreResult<()>;

    async fn get_note_by_slug(&self, slug: &str) -> StoreResult<Option<Note>>;

    /// Notes owned by `author_id`, in creation order.
    async fn list_notes_by_author(&self, author_id: Uuid) -> StoreResult<Vec<Note>>;

    /// Whether any note other than `exclude` uses `slug`.
    async fn slug_exists(&self, slug: &str, exclude: Option<Uuid>) -> StoreResult<bool>;

    /// Overwrite title, text and slug. Returns false when the note is gone.
    async fn update_note(&self, id: Uuid, fields: &NoteFields) -> StoreResult<bool>;

    /// Returns false when the note is gone.
    async fn delete_note(&self, id: Uuid) -> StoreResult<bool>;

    /// Total number of notes across all authors. Reported by `/health`.
    async fn count_notes(&self) -> StoreResult<u64>;
}
