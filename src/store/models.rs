//! Persistent entities: users and the notes they own.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::web::urls::Route;

/// A registered account.
///
/// The notes layer only ever uses `id` as an owner reference; the remaining
/// fields belong to the users subsystem.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    /// Bcrypt hash. `None` for accounts that cannot log in with a password.
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(username: &str, password_hash: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash,
            created_at: Utc::now(),
        }
    }
}

/// A short text note addressed by its slug.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Note {
    pub id: Uuid,
    pub title: String,
    pub text: String,
    /// Globally unique, URL-safe identifier.
    pub slug: String,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Note {
    /// URL of the note's detail page.
    pub fn detail_url(&self) -> String {
        Route::Detail(self.slug.clone()).path()
    }

    pub fn edit_url(&self) -> String {
        Route::Edit(self.slug.clone()).path()
    }

    pub fn delete_url(&self) -> String {
        Route::Delete(self.slug.clone()).path()
    }
}

/// Validated field values used to create or rewrite a note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteFields {
    pub title: String,
    pub text: String,
    pub slug: String,
}
