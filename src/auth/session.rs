//! Session cookie helpers.
//!
//! Cookie format: `<name>=<jwt>; HttpOnly; SameSite=Lax; Path=/; Max-Age=<secs>; [Secure]`
//! - `HttpOnly`: not readable from scripts
//! - `SameSite=Lax`: not sent on cross-site POST
//! - `Secure`: only when configured (TLS deployments)

use crate::auth::jwt::encode_jwt;
use crate::store::User;
use crate::AuthConfig;
use anyhow::{Context, Result};
use axum::http::HeaderValue;

/// Issue a session token for `user` and wrap it in a `Set-Cookie` value.
pub fn login_cookie(user: &User, config: &AuthConfig) -> Result<HeaderValue> {
    let token = encode_jwt(user.id, &config.jwt_secret, config.session_expiry_secs)?;
    build_session_cookie(
        &config.cookie_name,
        &token,
        config.session_expiry_secs,
        config.secure_cookies,
    )
}

/// Build the `Set-Cookie` header value carrying a session token.
pub fn build_session_cookie(
    name: &str,
    token: &str,
    max_age_secs: u64,
    is_secure: bool,
) -> Result<HeaderValue> {
    let secure_flag = if is_secure { "; Secure" } else { "" };
    let cookie = format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}{}",
        name, token, max_age_secs, secure_flag
    );
    HeaderValue::from_str(&cookie).context("session cookie is not a valid header value")
}

/// Build a `Set-Cookie` header that clears the session cookie.
pub fn build_clear_cookie(name: &str, is_secure: bool) -> Result<HeaderValue> {
    let secure_flag = if is_secure { "; Secure" } else { "" };
    let cookie = format!(
        "{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0{}",
        name, secure_flag
    );
    HeaderValue::from_str(&cookie).context("session cookie is not a valid header value")
}

/// Extract the session token from a `Cookie` header value.
pub fn extract_session_token(cookie_header: &str, name: &str) -> Option<String> {
    let prefix = format!("{}=", name);
    cookie_header
        .split(';')
        .filter_map(|part| part.trim().strip_prefix(&prefix))
        .map(str::trim)
        .find(|token| !token.is_empty())
        .map(str::to_string)
}

// ============================================================================
// Tests
// ============================================================================
