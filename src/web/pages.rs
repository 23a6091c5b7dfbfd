//! HTML page templates.
//!
//! Each page is an askama template compiled from `templates/`. Every page
//! carries a `Nav` so the shared layout can show who is signed in.

use crate::auth::AuthUser;
use crate::notes::{NoteForm, NoteFormErrors};
use crate::store::Note;
use crate::users::SignupErrors;
use crate::web::handlers::AppError;
use crate::web::urls::Route;
use askama::Template;
use axum::response::Html;

/// Navigation bar state shared by all pages.
#[derive(Debug, Clone, Default)]
pub struct Nav {
    pub username: Option<String>,
}

impl Nav {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn home_url(&self) -> String {
        Route::Home.path()
    }

    pub fn list_url(&self) -> String {
        Route::List.path()
    }

    pub fn add_url(&self) -> String {
        Route::Add.path()
    }

    pub fn login_url(&self) -> String {
        Route::Login.path()
    }

    pub fn logout_url(&self) -> String {
        Route::Logout.path()
    }

    pub fn signup_url(&self) -> String {
        Route::Signup.path()
    }
}

impl From<&AuthUser> for Nav {
    fn from(user: &AuthUser) -> Self {
        Self {
            username: Some(user.username.clone()),
        }
    }
}

impl From<Option<&AuthUser>> for Nav {
    fn from(user: Option<&AuthUser>) -> Self {
        user.map(Nav::from).unwrap_or_default()
    }
}

/// Render a template into an HTML response body.
pub fn render<T: Template>(page: &T) -> Result<Html<String>, AppError> {
    page.render()
        .map(Html)
        .map_err(|e| AppError::Internal(anyhow::Error::from(e).context("failed to render page")))
}

// ============================================================
// NOTES
// ============================================================

#[derive(Template)]
#[template(path = "home.html")]
pub struct HomePage {
    pub nav: Nav,
}

#[derive(Template)]
#[template(path = "notes/list.html")]
pub struct NoteListPage {
    pub nav: Nav,
    pub notes: Vec<Note>,
}

/// Shared by the add and edit pages.
#[derive(Template)]
#[template(path = "notes/form.html")]
pub struct NoteFormPage {
    pub nav: Nav,
    pub heading: &'static str,
    /// Where the form posts to.
    pub action: String,
    pub form: NoteForm,
    pub errors: NoteFormErrors,
}

impl NoteFormPage {
    pub fn add(nav: Nav, form: NoteForm, errors: NoteFormErrors) -> Self {
        Self {
            nav,
            heading: "Add note",
            action: Route::Add.path(),
            form,
            errors,
        }
    }

    /// `slug` is the note's current slug, which stays the post target even
    /// when the submitted form changes it.
    pub fn edit(nav: Nav, slug: &str, form: NoteForm, errors: NoteFormErrors) -> Self {
        Self {
            nav,
            heading: "Edit note",
            action: Route::Edit(slug.to_string()).path(),
            form,
            errors,
        }
    }
}

#[derive(Template)]
#[template(path = "notes/detail.html")]
pub struct NoteDetailPage {
    pub nav: Nav,
    pub note: Note,
}

#[derive(Template)]
#[template(path = "notes/delete.html")]
pub struct NoteDeletePage {
    pub nav: Nav,
    pub note: Note,
}

#[derive(Template)]
#[template(path = "notes/success.html")]
pub struct SuccessPage {
    pub nav: Nav,
}

// ============================================================
// USERS
// ============================================================

#[derive(Template)]
#[template(path = "users/login.html")]
pub struct LoginPage {
    pub nav: Nav,
    pub username: String,
    /// Carried through the form as a hidden field; empty when absent.
    pub next: String,
    pub error: Option<&'static str>,
}

#[derive(Template)]
#[template(path = "users/logout.html")]
pub struct LogoutPage {
    pub nav: Nav,
}

#[derive(Template)]
#[template(path = "users/signup.html")]
pub struct SignupPage {
    pub nav: Nav,
    pub username: String,
    pub errors: SignupErrors,
}

// ============================================================
// ERRORS
// ============================================================

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorPage {
    pub nav: Nav,
    pub status: u16,
    pub message: String,
}

// ============================================================
// TESTS
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn sample_note() -> Note {
        Note {
            id: Uuid::new_v4(),
            title: "<b>Bold title".to_string(),
            text: "Body".to_string(),
            slug: "bold-title".to_string(),
            author_id: Uuid::new_v4(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_list_escapes_titles_and_links_detail() {
        let page = NoteListPage {
            nav: Nav {
                username: Some("Author".to_string()),
            },
            notes: vec![sample_note()],
        };
        let html = page.render().unwrap();
        assert!(html.contains("&lt;b&gt;Bold title"));
        assert!(!html.contains("<b>Bold"));
        assert!(html.contains("/note/bold-title/"));
        assert!(html.contains("Author"));
    }

    #[test]
    fn test_form_page_shows_errors_and_values() {
        let form = NoteForm {
            title: "Title".to_string(),
            text: "Text".to_string(),
            slug: "taken".to_string(),
        };
        let page = NoteFormPage::add(
            Nav::anonymous(),
            form,
            NoteFormErrors::duplicate_slug("taken"),
        );
        let html = page.render().unwrap();
        assert!(html.contains(r#"action="/add/""#));
        assert!(html.contains(r#"name="slug""#));
        assert!(html.contains("taken - this slug already exists"));
    }

    #[test]
    fn test_edit_form_posts_to_current_slug() {
        let page = NoteFormPage::edit(
            Nav::anonymous(),
            "old-slug",
            NoteForm::default(),
            NoteFormErrors::default(),
        );
        assert!(page.render().unwrap().contains(r#"action="/edit/old-slug/""#));
    }

    #[test]
    fn test_login_page_escapes_next() {
        let page = LoginPage {
            nav: Nav::anonymous(),
            username: String::new(),
            next: r#""><script>"#.to_string(),
            error: Some("bad credentials"),
        };
        let html = page.render().unwrap();
        assert!(html.contains(r#"name="next""#));
        assert!(!html.contains("<script>"));
        assert!(html.contains("bad credentials"));
    }
}
