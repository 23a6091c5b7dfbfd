//! Signup and login forms.

use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;

pub const MAX_USERNAME_LENGTH: usize = 150;
pub const MIN_PASSWORD_LENGTH: usize = 8;

static USERNAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.@+-]+$").expect("static regex"));

/// Values submitted to `users:signup`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password1: String,
    #[serde(default)]
    pub password2: String,
}

/// Values submitted to `users:login`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// Where to go after a successful login.
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignupErrors {
    pub username: Vec<String>,
    pub password1: Vec<String>,
    pub password2: Vec<String>,
}

impl SignupErrors {
    pub fn is_empty(&self) -> bool {
        self.username.is_empty() && self.password1.is_empty() && self.password2.is_empty()
    }

    pub fn username_taken() -> Self {
        Self {
            username: vec!["A user with that username already exists.".to_string()],
            ..Self::default()
        }
    }
}

/// Check a username against the account naming rules.
pub fn validate_username(username: &str) -> Vec<String> {
    let mut errors = Vec::new();
    if username.is_empty() {
        errors.push("This field is required.".to_string());
    } else if username.chars().count() > MAX_USERNAME_LENGTH {
        errors.push(format!(
            "Ensure this value has at most {MAX_USERNAME_LENGTH} characters."
        ));
    } else if !USERNAME_PATTERN.is_match(username) {
        errors.push(
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters."
                .to_string(),
        );
    }
    errors
}

/// Check a password against the strength rules.
pub fn validate_password(password: &str) -> Vec<String> {
    let mut errors = Vec::new();
    if password.is_empty() {
        errors.push("This field is required.".to_string());
        return errors;
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        errors.push(format!(
            "This password is too short. It must contain at least {MIN_PASSWORD_LENGTH} characters."
        ));
    }
    if password.chars().all(|c| c.is_ascii_digit()) {
        errors.push("This password is entirely numeric.".to_string());
    }
    errors
}

impl SignupForm {
    /// Field checks that need no storage access. Returns the trimmed username.
    pub fn clean(&self) -> Result<String, SignupErrors> {
        let username = self.username.trim();
        let mut errors = SignupErrors {
            username: validate_username(username),
            ..SignupErrors::default()
        };

        if self.password2.is_empty() {
            errors.password2.push("This field is required.".to_string());
        } else if self.password1 != self.password2 {
            errors
                .password2
                .push("The two password fields didn't match.".to_string());
        }
        errors.password2.extend(validate_password(&self.password1));

        if errors.is_empty() {
            Ok(username.to_string())
        } else {
            Err(errors)
        }
    }
}
