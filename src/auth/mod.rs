//! Authentication module: cookie sessions backed by signed JWTs
//!
//! Provides:
//! - Session token encoding/decoding (`jwt` submodule)
//! - `Set-Cookie` helpers (`session` submodule)
//! - Session loading and login-required middleware (`middleware` submodule)
//! - `AuthUser` / `MaybeUser` extractors (`extractor` submodule)

pub mod extractor;
pub mod jwt;
pub mod middleware;
pub mod session;

pub use extractor::{AuthUser, MaybeUser};
