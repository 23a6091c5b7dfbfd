//! Named routes and reverse routing.
//!
//! Handlers and templates refer to pages by `Route` rather than by literal
//! path, so the URL layout lives in one place.

/// Every addressable page of the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    List,
    Add,
    Detail(String),
    Edit(String),
    Delete(String),
    Success,
    Login,
    Logout,
    Signup,
}

impl Route {
    /// Namespaced route name, e.g. `notes:list`.
    pub fn name(&self) -> &'static str {
        match self {
            Route::Home => "notes:home",
            Route::List => "notes:list",
            Route::Add => "notes:add",
            Route::Detail(_) => "notes:detail",
            Route::Edit(_) => "notes:edit",
            Route::Delete(_) => "notes:delete",
            Route::Success => "notes:success",
            Route::Login => "users:login",
            Route::Logout => "users:logout",
            Route::Signup => "users:signup",
        }
    }

    /// Concrete request path for this route.
    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::List => "/notes/".to_string(),
            Route::Add => "/add/".to_string(),
            Route::Detail(slug) => format!("/note/{}/", slug),
            Route::Edit(slug) => format!("/edit/{}/", slug),
            Route::Delete(slug) => format!("/delete/{}/", slug),
            Route::Success => "/done/".to_string(),
            Route::Login => "/auth/login/".to_string(),
            Route::Logout => "/auth/logout/".to_string(),
            Route::Signup => "/auth/signup/".to_string(),
        }
    }
}

/// Login URL that returns to `next` afterwards.
///
/// `next` is percent-encoded except for `/`, so `/edit/x/` stays readable
/// in the query string.
pub fn login_url_with_next(next: &str) -> String {
    format!(
        "{}?next={}",
        Route::Login.path(),
        urlencoding::encode(next).replace("%2F", "/")
    )
}

/// Whether `next` is safe to redirect to after login: a local absolute path,
/// never a scheme-relative or external URL, and nothing a `Location` header
/// cannot carry.
pub fn is_safe_next(next: &str) -> bool {
    next.starts_with('/')
        && !next.starts_with("//")
        && !next.contains('\\')
        && !next.chars().any(char::is_control)
}

// ============================================================================
// Tests
// ============================================================================
