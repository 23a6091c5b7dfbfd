//! Add/edit note form and its field validation.

use super::slug::{is_valid_slug, slugify, MAX_SLUG_LENGTH};
use crate::store::{Note, NoteFields};
use serde::Deserialize;

/// Appended to the offending slug when it is already taken.
pub const WARNING: &str = " - this slug already exists, choose a unique value!";

pub const MAX_TITLE_LENGTH: usize = 100;

const REQUIRED: &str = "This field is required.";
const INVALID_SLUG: &str =
    "Enter a valid slug consisting of letters, numbers, underscores or hyphens.";
const UNDERIVABLE_SLUG: &str =
    "Could not build a slug from this title; please enter one explicitly.";

/// Submitted values of the add/edit form. Missing fields deserialize as empty.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct NoteForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub slug: String,
}

/// Per-field error messages, rendered next to the inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteFormErrors {
    pub title: Vec<String>,
    pub text: Vec<String>,
    pub slug: Vec<String>,
}

impl NoteFormErrors {
    pub fn is_empty(&self) -> bool {
        self.title.is_empty() && self.text.is_empty() && self.slug.is_empty()
    }

    /// Error reported when `slug` belongs to another note.
    pub fn duplicate_slug(slug: &str) -> Self {
        Self {
            slug: vec![format!("{slug}{WARNING}")],
            ..Self::default()
        }
    }
}

impl NoteForm {
    /// Pre-fill the edit form from an existing note.
    pub fn from_note(note: &Note) -> Self {
        Self {
            title: note.title.clone(),
            text: note.text.clone(),
            slug: note.slug.clone(),
        }
    }

    /// Field checks that need no storage access.
    ///
    /// On success the returned fields carry the effective slug: the submitted
    /// one, or one derived from the title when the slug was left blank.
    /// Slug uniqueness is checked separately by `NoteManager`.
    pub fn clean(&self) -> Result<NoteFields, NoteFormErrors> {
        let mut errors = NoteFormErrors::default();

        let title = self.title.trim();
        if title.is_empty() {
            errors.title.push(REQUIRED.to_string());
        } else if title.chars().count() > MAX_TITLE_LENGTH {
            errors.title.push(format!(
                "Ensure this value has at most {} characters (it has {}).",
                MAX_TITLE_LENGTH,
                title.chars().count()
            ));
        }

        let text = self.text.trim();
        if text.is_empty() {
            errors.text.push(REQUIRED.to_string());
        }

        let submitted_slug = self.slug.trim();
        let slug = if submitted_slug.is_empty() {
            let derived = slugify(title);
            if derived.is_empty() && errors.title.is_empty() {
                errors.slug.push(UNDERIVABLE_SLUG.to_string());
            }
            derived
        } else {
            if submitted_slug.chars().count() > MAX_SLUG_LENGTH {
                errors.slug.push(format!(
                    "Ensure this value has at most {} characters (it has {}).",
                    MAX_SLUG_LENGTH,
                    submitted_slug.chars().count()
                ));
            } else if !is_valid_slug(submitted_slug) {
                errors.slug.push(INVALID_SLUG.to_string());
            }
            submitted_slug.to_string()
        };

        if errors.is_empty() {
            Ok(NoteFields {
                title: title.to_string(),
                text: text.to_string(),
                slug,
            })
        } else {
            Err(errors)
        }
    }
}
