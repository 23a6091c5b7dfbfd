//! Shared server state, the HTTP error type and the simple page handlers.

use crate::auth::{AuthUser, MaybeUser};
use crate::notes::{NoteError, NoteManager};
use crate::store::{NoteStore, StoreError};
use crate::users::{UserError, UserManager};
use crate::web::pages::{render, ErrorPage, HomePage, Nav, SuccessPage};
use crate::web::urls::login_url_with_next;
use crate::Config;
use askama::Template;
use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::error;

/// Shared server state
pub struct ServerState {
    pub store: Arc<dyn NoteStore>,
    pub notes: NoteManager,
    pub users: UserManager,
    pub config: Config,
}

/// Handle passed to every handler and middleware
pub type NotesState = Arc<ServerState>;

impl ServerState {
    /// Wire the managers to `store` and wrap everything for sharing.
    pub fn new(store: Arc<dyn NoteStore>, config: Config) -> NotesState {
        Arc::new(Self {
            notes: NoteManager::new(store.clone()),
            users: UserManager::new(store.clone(), config.auth.bcrypt_cost),
            store,
            config,
        })
    }
}

/// 302 redirect to `location` (`Redirect::to` would answer 303).
///
/// A location that cannot be a header value is a server error, never a 302
/// without `Location`.
pub fn found(location: &str) -> Response {
    match HeaderValue::from_str(location) {
        Ok(value) => (StatusCode::FOUND, [(header::LOCATION, value)]).into_response(),
        Err(e) => AppError::Internal(anyhow::anyhow!(
            "Invalid redirect location {:?}: {}",
            location,
            e
        ))
        .into_response(),
    }
}

// ============================================================================
// Pages
// ============================================================================

/// `notes:home`: public landing page
pub async fn home(MaybeUser(user): MaybeUser) -> Result<Html<String>, AppError> {
    render(&HomePage {
        nav: Nav::from(user.as_ref()),
    })
}

/// `notes:success`: shown after a note was added, changed or deleted
pub async fn success(user: AuthUser) -> Result<Html<String>, AppError> {
    render(&SuccessPage {
        nav: Nav::from(&user),
    })
}

/// Catch-all for unknown paths
pub async fn not_found() -> AppError {
    AppError::NotFound
}

// ============================================================================
// Health check
// ============================================================================

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<u64>,
}

/// Health check handler: counts the stored notes.
///
/// Returns 200 + `"ok"` with the count, or 503 + `"unhealthy"` when the store
/// cannot answer.
pub async fn health(State(state): State<NotesState>) -> (StatusCode, Json<HealthResponse>) {
    let notes = match state.store.count_notes().await {
        Ok(count) => Some(count),
        Err(e) => {
            error!("Health check failed: {}", e);
            None
        }
    };
    let (status, label) = match notes {
        Some(_) => (StatusCode::OK, "ok"),
        None => (StatusCode::SERVICE_UNAVAILABLE, "unhealthy"),
    };

    (
        status,
        Json(HealthResponse {
            status: label.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            notes,
        }),
    )
}

// ============================================================================
// Error handling
// ============================================================================

/// Application error type
#[derive(Debug)]
pub enum AppError {
    Internal(anyhow::Error),
    /// Missing, or owned by someone else. The two are indistinguishable.
    NotFound,
    BadRequest(String),
    /// Anonymous request to a protected page; carries the path to return to.
    LoginRequired(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::LoginRequired(next) => return found(&login_url_with_next(&next)),
            AppError::Internal(e) => {
                error!("Request failed: {:#}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong.".to_string(),
                )
            }
            AppError::NotFound => (StatusCode::NOT_FOUND, "Page not found.".to_string()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        let page = ErrorPage {
            nav: Nav::anonymous(),
            status: status.as_u16(),
            message,
        };
        match page.render() {
            Ok(html) => (status, Html(html)).into_response(),
            Err(e) => {
                error!("Failed to render error page: {}", e);
                (status, page.message).into_response()
            }
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Internal(err.into())
    }
}

impl From<NoteError> for AppError {
    fn from(err: NoteError) -> Self {
        match err {
            NoteError::NotFound => AppError::NotFound,
            NoteError::Invalid(_) => AppError::BadRequest(err.to_string()),
            NoteError::Store(e) => e.into(),
        }
    }
}

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::Invalid(_) => AppError::BadRequest(err.to_string()),
            UserError::Hash(e) => AppError::Internal(e.into()),
            UserError::Store(e) => e.into(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
