//! HTTP layer: routes, handlers and page templates.

pub mod auth_handlers;
pub mod handlers;
pub mod note_handlers;
pub mod pages;
pub mod routes;
pub mod urls;

pub use handlers::{AppError, NotesState, ServerState};
pub use routes::create_router;
