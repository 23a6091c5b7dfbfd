//! Account creation and password authentication.

use super::forms::{SignupErrors, SignupForm};
use crate::store::{NoteStore, StoreError, User};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("signup form is invalid")]
    Invalid(SignupErrors),

    #[error("failed to hash password: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Manager for user accounts
pub struct UserManager {
    store: Arc<dyn NoteStore>,
    bcrypt_cost: u32,
}

impl UserManager {
    pub fn new(store: Arc<dyn NoteStore>, bcrypt_cost: u32) -> Self {
        Self { store, bcrypt_cost }
    }

    /// Validate a signup form and create the account.
    pub async fn signup(&self, form: &SignupForm) -> Result<User, UserError> {
        let username = form.clean().map_err(UserError::Invalid)?;
        self.create_with_password(&username, &form.password1).await
    }

    /// Create an account with an already validated username.
    pub async fn create_with_password(
        &self,
        username: &str,
        password: &str,
    ) -> Result<User, UserError> {
        if self.store.get_user_by_username(username).await?.is_some() {
            return Err(UserError::Invalid(SignupErrors::username_taken()));
        }

        let hash = bcrypt::hash(password, self.bcrypt_cost)?;
        let user = User::new(username, Some(hash));
        self.store.create_user(&user).await.map_err(|e| match e {
            StoreError::DuplicateUsername(_) => UserError::Invalid(SignupErrors::username_taken()),
            other => UserError::Store(other),
        })?;

        info!(username, user_id = %user.id, "Created user");
        Ok(user)
    }

    /// Check credentials. Returns `None` for unknown users and wrong passwords
    /// alike so callers cannot tell the two apart.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, UserError> {
        let Some(user) = self.store.get_user_by_username(username).await? else {
            warn!(username, "Login for unknown user");
            return Ok(None);
        };

        let Some(hash) = user.password_hash.as_deref() else {
            warn!(username, "Login for account without password");
            return Ok(None);
        };

        if bcrypt::verify(password, hash).unwrap_or(false) {
            Ok(Some(user))
        } else {
            warn!(username, "Login with wrong password");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteStore;

    fn manager() -> UserManager {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        UserManager::new(store, 4)
    }

    fn signup(username: &str, password: &str) -> SignupForm {
        SignupForm {
            username: username.to_string(),
            password1: password.to_string(),
            password2: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_signup_then_authenticate() {
        let users = manager();
        let created = users.signup(&signup("reader", "correct-horse")).await.unwrap();
        assert!(created.password_hash.as_deref().unwrap().starts_with("$2"));

        let ok = users.authenticate("reader", "correct-horse").await.unwrap();
        assert_eq!(ok.map(|u| u.id), Some(created.id));

        assert!(users.authenticate("reader", "wrong").await.unwrap().is_none());
        assert!(users.authenticate("nobody", "x").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_is_form_error() {
        let users = manager();
        users.signup(&signup("reader", "correct-horse")).await.unwrap();

        let err = users
            .signup(&signup("reader", "another-pass"))
            .await
            .unwrap_err();
        match err {
            UserError::Invalid(errors) => assert_eq!(errors, SignupErrors::username_taken()),
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_form_creates_nothing() {
        let users = manager();
        let err = users.signup(&signup("bad name", "short")).await.unwrap_err();
        assert!(matches!(err, UserError::Invalid(_)));
        assert!(users
            .authenticate("bad name", "short")
            .await
            .unwrap()
            .is_none());
    }
}
