//! HTTP routes

use super::{auth_handlers, handlers, note_handlers, NotesState};
use crate::auth::middleware::{load_session, require_login};
use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::get,
    Router,
};
use tower_http::trace::TraceLayer;

/// Create the application router
pub fn create_router(state: NotesState) -> Router {
    // Pages that need a signed-in user
    let protected = Router::new()
        .route("/notes/", get(note_handlers::list))
        .route(
            "/add/",
            get(note_handlers::add_form).post(note_handlers::add),
        )
        .route("/note/{slug}/", get(note_handlers::detail))
        .route(
            "/edit/{slug}/",
            get(note_handlers::edit_form).post(note_handlers::edit),
        )
        .route(
            "/delete/{slug}/",
            get(note_handlers::delete_form)
                .post(note_handlers::delete)
                .delete(note_handlers::delete),
        )
        .route("/done/", get(handlers::success))
        .route_layer(from_fn(require_login));

    Router::new()
        .route("/", get(handlers::home))
        .route("/health", get(handlers::health))
        // ====================================================================
        // Users
        // ====================================================================
        .route(
            "/auth/login/",
            get(auth_handlers::login_form).post(auth_handlers::login),
        )
        .route(
            "/auth/logout/",
            get(auth_handlers::logout).post(auth_handlers::logout),
        )
        .route(
            "/auth/signup/",
            get(auth_handlers::signup_form).post(auth_handlers::signup),
        )
        .merge(protected)
        .fallback(handlers::not_found)
        .layer(from_fn_with_state(state.clone(), load_session))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
