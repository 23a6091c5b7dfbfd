//! Notes module
//!
//! Slug derivation, add/edit form validation, and the ownership-aware
//! `NoteManager` used by the HTTP handlers.

pub mod forms;
pub mod manager;
pub mod slug;

pub use forms::{NoteForm, NoteFormErrors, WARNING};
pub use manager::{NoteError, NoteManager};
pub use slug::slugify;
