//! Notes resource handlers: list, add, detail, edit, delete.
//!
//! Every handler takes `AuthUser`; the router additionally guards these
//! routes with `require_login`. Lookups go through `NoteManager`, which
//! answers `NotFound` for notes owned by someone else.

use super::handlers::{found, AppError, NotesState};
use super::pages::{render, Nav, NoteDeletePage, NoteDetailPage, NoteFormPage, NoteListPage};
use super::urls::Route;
use crate::auth::AuthUser;
use crate::notes::{NoteError, NoteForm, NoteFormErrors};
use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Response},
    Form,
};

/// `notes:list`: the requesting user's notes in creation order
pub async fn list(
    State(state): State<NotesState>,
    user: AuthUser,
) -> Result<Html<String>, AppError> {
    let notes = state.notes.list_for_author(user.user_id).await?;
    render(&NoteListPage {
        nav: Nav::from(&user),
        notes,
    })
}

/// `notes:add` GET: empty form
pub async fn add_form(user: AuthUser) -> Result<Html<String>, AppError> {
    render(&NoteFormPage::add(
        Nav::from(&user),
        NoteForm::default(),
        NoteFormErrors::default(),
    ))
}

/// `notes:add` POST: create, or re-render the form with errors
pub async fn add(
    State(state): State<NotesState>,
    user: AuthUser,
    Form(form): Form<NoteForm>,
) -> Result<Response, AppError> {
    match state.notes.create(user.user_id, &form).await {
        Ok(_) => Ok(found(&Route::Success.path())),
        Err(NoteError::Invalid(errors)) => {
            Ok(render(&NoteFormPage::add(Nav::from(&user), form, errors))?.into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// `notes:detail`
pub async fn detail(
    State(state): State<NotesState>,
    user: AuthUser,
    Path(slug): Path<String>,
) -> Result<Html<String>, AppError> {
    let note = state.notes.get_owned(&slug, user.user_id).await?;
    render(&NoteDetailPage {
        nav: Nav::from(&user),
        note,
    })
}

/// `notes:edit` GET: form pre-filled from the stored note
pub async fn edit_form(
    State(state): State<NotesState>,
    user: AuthUser,
    Path(slug): Path<String>,
) -> Result<Html<String>, AppError> {
    let note = state.notes.get_owned(&slug, user.user_id).await?;
    render(&NoteFormPage::edit(
        Nav::from(&user),
        &note.slug,
        NoteForm::from_note(&note),
        NoteFormErrors::default(),
    ))
}

/// `notes:edit` POST: apply the change, or re-render with errors
pub async fn edit(
    State(state): State<NotesState>,
    user: AuthUser,
    Path(slug): Path<String>,
    Form(form): Form<NoteForm>,
) -> Result<Response, AppError> {
    match state.notes.update(&slug, user.user_id, &form).await {
        Ok(_) => Ok(found(&Route::Success.path())),
        Err(NoteError::Invalid(errors)) => Ok(render(&NoteFormPage::edit(
            Nav::from(&user),
            &slug,
            form,
            errors,
        ))?
        .into_response()),
        Err(e) => Err(e.into()),
    }
}

/// `notes:delete` GET: confirmation page
pub async fn delete_form(
    State(state): State<NotesState>,
    user: AuthUser,
    Path(slug): Path<String>,
) -> Result<Html<String>, AppError> {
    let note = state.notes.get_owned(&slug, user.user_id).await?;
    render(&NoteDeletePage {
        nav: Nav::from(&user),
        note,
    })
}

/// `notes:delete` POST / DELETE
pub async fn delete(
    State(state): State<NotesState>,
    user: AuthUser,
    Path(slug): Path<String>,
) -> Result<Response, AppError> {
    state.notes.delete(&slug, user.user_id).await?;
    Ok(found(&Route::Success.path()))
}
