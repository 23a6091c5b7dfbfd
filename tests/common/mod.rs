//! Shared helpers for the in-process HTTP tests.
//!
//! Every `TestApp` owns its own in-memory database, so tests never share
//! state and can run in parallel.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, Response, StatusCode};
use note_keeper::auth::jwt::encode_jwt;
use note_keeper::notes::NoteForm;
use note_keeper::store::{Note, NoteStore, SqliteStore, User};
use note_keeper::web::{create_router, NotesState, ServerState};
use note_keeper::Config;
use std::sync::Arc;
use tower::ServiceExt; // for `oneshot`

pub struct TestApp {
    pub state: NotesState,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    /// Build an app after adjusting the default test configuration.
    pub fn with_config(adjust: impl FnOnce(&mut Config)) -> Self {
        let mut config = Config::default();
        config.auth.bcrypt_cost = 4;
        adjust(&mut config);

        let store = Arc::new(SqliteStore::in_memory().expect("in-memory database"));
        Self {
            state: ServerState::new(store, config),
        }
    }

    /// Account without a password; tests log it in with `cookie_for`.
    pub async fn create_user(&self, username: &str) -> User {
        let user = User::new(username, None);
        self.state.store.create_user(&user).await.unwrap();
        user
    }

    /// `Cookie` header value of a logged-in session for `user`.
    pub fn cookie_for(&self, user: &User) -> String {
        let auth = &self.state.config.auth;
        let token = encode_jwt(user.id, &auth.jwt_secret, 3600).unwrap();
        format!("{}={}", auth.cookie_name, token)
    }

    /// Create a note with a slug derived from its title.
    pub async fn create_note(&self, author: &User, title: &str, text: &str) -> Note {
        let form = NoteForm {
            title: title.to_string(),
            text: text.to_string(),
            slug: String::new(),
        };
        self.state.notes.create(author.id, &form).await.unwrap()
    }

    pub async fn note_count(&self) -> u64 {
        self.state.store.count_notes().await.unwrap()
    }

    pub async fn note_by_slug(&self, slug: &str) -> Option<Note> {
        self.state.store.get_note_by_slug(slug).await.unwrap()
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        self.send(Method::GET, uri, cookie, None).await
    }

    pub async fn post_form(
        &self,
        uri: &str,
        cookie: Option<&str>,
        fields: &[(&str, &str)],
    ) -> Response<Body> {
        self.send(Method::POST, uri, cookie, Some(encode_form(fields)))
            .await
    }

    pub async fn delete(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        self.send(Method::DELETE, uri, cookie, None).await
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        cookie: Option<&str>,
        form: Option<String>,
    ) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let body = match form {
            Some(form) => {
                builder = builder.header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
                Body::from(form)
            }
            None => Body::empty(),
        };

        create_router(self.state.clone())
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap()
    }
}

pub fn encode_form(fields: &[(&str, &str)]) -> String {
    fields
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

pub async fn body_text(resp: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn location(resp: &Response<Body>) -> &str {
    resp.headers()
        .get(header::LOCATION)
        .expect("response has a Location header")
        .to_str()
        .unwrap()
}

/// Assert a 302 to `expected`.
pub fn assert_redirects(resp: &Response<Body>, expected: &str) {
    assert_eq!(resp.status(), StatusCode::FOUND, "expected a redirect");
    assert_eq!(location(resp), expected);
}

/// The `name=value` part of the session `Set-Cookie` header, ready to send back.
pub fn session_cookie(resp: &Response<Body>) -> Option<String> {
    resp.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .find(|pair| pair.contains('=') && !pair.ends_with('='))
        .map(str::to_string)
}
