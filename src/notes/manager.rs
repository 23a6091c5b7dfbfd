//! Note Manager - ownership-aware CRUD for notes
//!
//! Every lookup is scoped to the requesting author: a note that exists but
//! belongs to someone else is reported exactly like a missing one.

use super::forms::{NoteForm, NoteFormErrors};
use crate::store::{Note, NoteFields, NoteStore, StoreError};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Failure modes of note operations.
#[derive(Debug, thiserror::Error)]
pub enum NoteError {
    /// The submitted form did not validate; carries per-field messages.
    #[error("note form is invalid")]
    Invalid(NoteFormErrors),

    /// No note with that slug is visible to the requesting user.
    #[error("note not found")]
    NotFound,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Manager for note operations
pub struct NoteManager {
    store: Arc<dyn NoteStore>,
}

impl NoteManager {
    pub fn new(store: Arc<dyn NoteStore>) -> Self {
        Self { store }
    }

    /// Notes owned by `author_id`, in creation order.
    pub async fn list_for_author(&self, author_id: Uuid) -> Result<Vec<Note>, NoteError> {
        Ok(self.store.list_notes_by_author(author_id).await?)
    }

    /// Fetch a note by slug, visible only to its author.
    pub async fn get_owned(&self, slug: &str, author_id: Uuid) -> Result<Note, NoteError> {
        match self.store.get_note_by_slug(slug).await? {
            Some(note) if note.author_id == author_id => Ok(note),
            Some(_) => {
                debug!(slug, %author_id, "Note requested by non-author");
                Err(NoteError::NotFound)
            }
            None => Err(NoteError::NotFound),
        }
    }

    /// Validate `form` and create a note owned by `author_id`.
    pub async fn create(&self, author_id: Uuid, form: &NoteForm) -> Result<Note, NoteError> {
        let fields = self.validate(form, None).await?;

        let note = Note {
            id: Uuid::new_v4(),
            title: fields.title,
            text: fields.text,
            slug: fields.slug,
            author_id,
            created_at: Utc::now(),
        };

        self.store
            .create_note(&note)
            .await
            .map_err(Self::duplicate_as_invalid)?;

        info!(slug = %note.slug, %author_id, "Created note");
        Ok(note)
    }

    /// Validate `form` and rewrite the author's note addressed by `slug`.
    pub async fn update(
        &self,
        slug: &str,
        author_id: Uuid,
        form: &NoteForm,
    ) -> Result<Note, NoteError> {
        let existing = self.get_owned(slug, author_id).await?;
        let fields = self.validate(form, Some(existing.id)).await?;

        let found = self
            .store
            .update_note(existing.id, &fields)
            .await
            .map_err(Self::duplicate_as_invalid)?;
        if !found {
            return Err(NoteError::NotFound);
        }

        info!(old_slug = slug, new_slug = %fields.slug, %author_id, "Updated note");
        Ok(Note {
            title: fields.title,
            text: fields.text,
            slug: fields.slug,
            ..existing
        })
    }

    /// Delete the author's note addressed by `slug`.
    pub async fn delete(&self, slug: &str, author_id: Uuid) -> Result<(), NoteError> {
        let existing = self.get_owned(slug, author_id).await?;
        if !self.store.delete_note(existing.id).await? {
            return Err(NoteError::NotFound);
        }
        info!(slug, %author_id, "Deleted note");
        Ok(())
    }

    /// Field validation plus the cross-note slug uniqueness check.
    ///
    /// `exclude` is the note being edited, which may keep its own slug.
    async fn validate(
        &self,
        form: &NoteForm,
        exclude: Option<Uuid>,
    ) -> Result<NoteFields, NoteError> {
        let fields = form.clean().map_err(NoteError::Invalid)?;
        if self.store.slug_exists(&fields.slug, exclude).await? {
            return Err(NoteError::Invalid(NoteFormErrors::duplicate_slug(
                &fields.slug,
            )));
        }
        Ok(fields)
    }

    /// A UNIQUE violation that slipped past `validate` (concurrent insert)
    /// is reported like any other duplicate.
    fn duplicate_as_invalid(err: StoreError) -> NoteError {
        match err {
            StoreError::DuplicateSlug(slug) => {
                NoteError::Invalid(NoteFormErrors::duplicate_slug(&slug))
            }
            other => NoteError::Store(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notes::forms::WARNING;
    use crate::store::{SqliteStore, User};

    async fn setup() -> (NoteManager, Arc<SqliteStore>, User, User) {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        let author = User::new("Author", None);
        let reader = User::new("Reader", None);
        store.create_user(&author).await.unwrap();
        store.create_user(&reader).await.unwrap();
        (NoteManager::new(store.clone()), store, author, reader)
    }

    fn form(title: &str, text: &str, slug: &str) -> NoteForm {
        NoteForm {
            title: title.to_string(),
            text: text.to_string(),
            slug: slug.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_derives_slug() {
        let (manager, _, author, _) = setup().await;
        let note = manager
            .create(author.id, &form("Пример заметки", "Text", ""))
            .await
            .unwrap();
        assert_eq!(note.slug, "primer-zametki");
        assert_eq!(note.author_id, author.id);
    }

    #[tokio::test]
    async fn test_duplicate_slug_is_invalid_and_not_stored() {
        let (manager, store, author, _) = setup().await;
        manager
            .create(author.id, &form("Note 1", "First", "note-slug"))
            .await
            .unwrap();

        let err = manager
            .create(author.id, &form("Note 2", "Second", "note-slug"))
            .await
            .unwrap_err();
        match err {
            NoteError::Invalid(errors) => assert!(errors.slug[0].contains(WARNING)),
            other => panic!("expected Invalid, got {other:?}"),
        }
        assert_eq!(store.count_notes().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_derived_slug_collision_is_invalid() {
        let (manager, _, author, reader) = setup().await;
        manager
            .create(author.id, &form("Same title", "a", ""))
            .await
            .unwrap();
        let err = manager
            .create(reader.id, &form("Same title", "b", ""))
            .await
            .unwrap_err();
        assert!(matches!(err, NoteError::Invalid(_)));
    }

    #[tokio::test]
    async fn test_non_author_sees_not_found() {
        let (manager, _, author, reader) = setup().await;
        let note = manager
            .create(author.id, &form("Title", "Text", ""))
            .await
            .unwrap();

        assert!(manager.get_owned(&note.slug, author.id).await.is_ok());
        assert!(matches!(
            manager.get_owned(&note.slug, reader.id).await,
            Err(NoteError::NotFound)
        ));
        assert!(matches!(
            manager
                .update(&note.slug, reader.id, &form("X", "Y", ""))
                .await,
            Err(NoteError::NotFound)
        ));
        assert!(matches!(
            manager.delete(&note.slug, reader.id).await,
            Err(NoteError::NotFound)
        ));

        let unchanged = manager.get_owned(&note.slug, author.id).await.unwrap();
        assert_eq!(unchanged.text, "Text");
    }

    #[tokio::test]
    async fn test_update_keeps_own_slug_and_rederives_blank_slug() {
        let (manager, _, author, _) = setup().await;
        let note = manager
            .create(author.id, &form("Title", "Text", "keep-me"))
            .await
            .unwrap();

        let same = manager
            .update(&note.slug, author.id, &form("Title", "New text", "keep-me"))
            .await
            .unwrap();
        assert_eq!(same.slug, "keep-me");
        assert_eq!(same.text, "New text");

        let renamed = manager
            .update("keep-me", author.id, &form("New Title", "New text", ""))
            .await
            .unwrap();
        assert_eq!(renamed.slug, "new-title");
        assert!(manager.get_owned("keep-me", author.id).await.is_err());
    }

    #[tokio::test]
    async fn test_update_into_foreign_slug_is_invalid() {
        let (manager, _, author, reader) = setup().await;
        manager
            .create(reader.id, &form("Theirs", "t", "taken"))
            .await
            .unwrap();
        let mine = manager
            .create(author.id, &form("Mine", "m", "mine"))
            .await
            .unwrap();

        let err = manager
            .update(&mine.slug, author.id, &form("Mine", "m", "taken"))
            .await
            .unwrap_err();
        assert!(matches!(err, NoteError::Invalid(_)));
    }

    #[tokio::test]
    async fn test_lists_are_per_author() {
        let (manager, _, author, reader) = setup().await;
        manager
            .create(author.id, &form("Note 1", "a", ""))
            .await
            .unwrap();
        manager
            .create(reader.id, &form("Note 2", "b", ""))
            .await
            .unwrap();

        let mine = manager.list_for_author(author.id).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].title, "Note 1");
    }

    #[tokio::test]
    async fn test_author_can_delete() {
        let (manager, store, author, _) = setup().await;
        let note = manager
            .create(author.id, &form("Title", "Text", ""))
            .await
            .unwrap();
        manager.delete(&note.slug, author.id).await.unwrap();
        assert_eq!(store.count_notes().await.unwrap(), 0);
    }
}
