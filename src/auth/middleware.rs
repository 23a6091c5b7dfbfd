//! Session middleware for Axum routes.
//!
//! `load_session` runs on every route and turns a valid session cookie into
//! an `AuthUser` in request extensions. `require_login` guards the protected
//! routes and sends anonymous visitors to the login page.

use crate::auth::extractor::AuthUser;
use crate::auth::jwt::decode_jwt;
use crate::auth::session::extract_session_token;
use crate::web::handlers::{AppError, NotesState};
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;
use uuid::Uuid;

/// Middleware that resolves the session cookie to a user.
///
/// # Behavior
/// 1. No cookie → request continues anonymously
/// 2. Token invalid or expired → continues anonymously
/// 3. Token names a user that no longer exists → continues anonymously
/// 4. Otherwise inject `AuthUser` into request extensions
pub async fn load_session(
    State(state): State<NotesState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if let Some(user) = session_user(&state, req.headers()).await? {
        req.extensions_mut().insert(user);
    }
    Ok(next.run(req).await)
}

async fn session_user(
    state: &NotesState,
    headers: &HeaderMap,
) -> Result<Option<AuthUser>, AppError> {
    let auth = &state.config.auth;

    let Some(token) = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|v| extract_session_token(v, &auth.cookie_name))
    else {
        return Ok(None);
    };

    let claims = match decode_jwt(&token, &auth.jwt_secret) {
        Ok(claims) => claims,
        Err(e) => {
            debug!("Ignoring session cookie: {:#}", e);
            return Ok(None);
        }
    };

    let Ok(user_id) = claims.sub.parse::<Uuid>() else {
        debug!("Ignoring session cookie with malformed subject");
        return Ok(None);
    };

    let user = state
        .store
        .get_user(user_id)
        .await?;
    if user.is_none() {
        debug!(%user_id, "Session refers to a deleted user");
    }
    Ok(user.map(AuthUser::from))
}

/// Middleware that redirects anonymous requests to `users:login?next=...`.
pub async fn require_login(req: Request, next: Next) -> Response {
    if req.extensions().get::<AuthUser>().is_some() {
        return next.run(req).await;
    }

    let original = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());
    AppError::LoginRequired(original).into_response()
}

// ============================================================================
// Tests
// ============================================================================
