//! Login, logout and signup pages.

use super::handlers::{found, AppError, NotesState};
use super::pages::{render, LoginPage, LogoutPage, Nav, SignupPage};
use super::urls::{is_safe_next, Route};
use crate::auth::session::{build_clear_cookie, login_cookie};
use crate::auth::MaybeUser;
use crate::users::{LoginForm, SignupErrors, SignupForm, UserError};
use axum::{
    extract::{Query, State},
    http::header,
    response::{Html, IntoResponse, Response},
    Form,
};
use serde::Deserialize;
use tracing::info;

const INVALID_LOGIN: &str =
    "Please enter a correct username and password. Note that both fields may be case-sensitive.";

/// Query string of the login page
#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

/// Where to go after a successful login.
fn login_target(next: Option<&str>) -> String {
    next.filter(|n| is_safe_next(n))
        .map(str::to_string)
        .unwrap_or_else(|| Route::List.path())
}

/// `users:login` GET
pub async fn login_form(
    MaybeUser(user): MaybeUser,
    Query(query): Query<NextQuery>,
) -> Result<Html<String>, AppError> {
    render(&LoginPage {
        nav: Nav::from(user.as_ref()),
        username: String::new(),
        next: query.next.unwrap_or_default(),
        error: None,
    })
}

/// `users:login` POST: set the session cookie and redirect
pub async fn login(
    State(state): State<NotesState>,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let username = form.username.trim();
    let Some(user) = state.users.authenticate(username, &form.password).await? else {
        return Ok(render(&LoginPage {
            nav: Nav::anonymous(),
            username: username.to_string(),
            next: form.next.clone().unwrap_or_default(),
            error: Some(INVALID_LOGIN),
        })?
        .into_response());
    };

    let cookie = login_cookie(&user, &state.config.auth)?;
    info!(username = %user.username, user_id = %user.id, "User logged in");

    let mut response = found(&login_target(form.next.as_deref()));
    response.headers_mut().append(header::SET_COOKIE, cookie);
    Ok(response)
}

/// `users:logout` GET / POST: clear the session cookie
pub async fn logout(State(state): State<NotesState>) -> Result<Response, AppError> {
    let auth = &state.config.auth;
    let cookie = build_clear_cookie(&auth.cookie_name, auth.secure_cookies)?;

    let mut response = render(&LogoutPage {
        nav: Nav::anonymous(),
    })?
    .into_response();
    response.headers_mut().append(header::SET_COOKIE, cookie);
    Ok(response)
}

/// `users:signup` GET
pub async fn signup_form(
    State(state): State<NotesState>,
    MaybeUser(user): MaybeUser,
) -> Result<Html<String>, AppError> {
    if !state.config.auth.allow_registration {
        return Err(AppError::NotFound);
    }
    render(&SignupPage {
        nav: Nav::from(user.as_ref()),
        username: String::new(),
        errors: SignupErrors::default(),
    })
}

/// `users:signup` POST: create the account and send the user to login
pub async fn signup(
    State(state): State<NotesState>,
    Form(form): Form<SignupForm>,
) -> Result<Response, AppError> {
    if !state.config.auth.allow_registration {
        return Err(AppError::NotFound);
    }
    match state.users.signup(&form).await {
        Ok(_) => Ok(found(&Route::Login.path())),
        Err(UserError::Invalid(errors)) => Ok(render(&SignupPage {
            nav: Nav::anonymous(),
            username: form.username.trim().to_string(),
            errors,
        })?
        .into_response()),
        Err(e) => Err(e.into()),
    }
}

// ============================================================================
// Tests
// ============================================================================
