//! Authentication service - registration, login and session lookup.
//!
//! Sessions are plain cookies carrying the user id, so this service only
//! resolves credentials to a `User`; issuing the cookie is the handler's job.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::user::LOGIN_EMAIL_REGEX;
use crate::domain::{normalize_email, LoginUser, NewUser, Password, RegisterUser, User};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Authentication service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a new vendor account
    async fn register(&self, input: RegisterUser) -> AppResult<User>;

    /// Check credentials and refresh the login timestamp
    async fn login(&self, input: LoginUser) -> AppResult<User>;

    /// Resolve the session user
    async fn current_user(&self, id: Uuid) -> AppResult<User>;
}

/// Concrete implementation of AuthService using Unit of Work.
pub struct Authenticator<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> Authenticator<U> {
    /// Create new auth service instance with Unit of Work
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> AuthService for Authenticator<U> {
    async fn register(&self, input: RegisterUser) -> AppResult<User> {
        // Field presence and shape are checked by the ValidatedJson extractor
        let email = normalize_email(&input.email);
        if self.uow.users().find_by_email(&email).await?.is_some() {
            tracing::warn!(%email, "Registration rejected: email already registered");
            return Err(AppError::conflict("Email already registered"));
        }

        let password_hash = Password::new(&input.password)?.as_str().to_string();
        let user = self
            .uow
            .users()
            .create(NewUser {
                name: input.username.trim().to_string(),
                email,
                password_hash,
            })
            .await?;

        tracing::info!(user_id = %user.id, "Vendor registered");
        Ok(user)
    }

    async fn login(&self, input: LoginUser) -> AppResult<User> {
        let email = normalize_email(&input.email);
        if !LOGIN_EMAIL_REGEX.is_match(&email) {
            return Err(AppError::validation("Invalid email format"));
        }

        let user_result = self.uow.users().find_by_email(&email).await?;

        // Verify against a dummy hash when the user is unknown so both
        // failure paths cost the same.
        let dummy_hash =
            "$argon2id$v=19$m=19456,t=2,p=1$dummysalt123456$dummyhash1234567890123456789012";

        let Some(user) = user_result else {
            Password::from_hash(dummy_hash.to_string()).verify(&input.password);
            return Err(AppError::InvalidCredentials);
        };

        if !Password::from_hash(user.password_hash.clone()).verify(&input.password) {
            tracing::warn!(user_id = %user.id, "Login rejected: wrong password");
            return Err(AppError::InvalidCredentials);
        }

        self.uow.users().touch_last_login(user.id).await
    }

    async fn current_user(&self, id: Uuid) -> AppResult<User> {
        self.uow
            .users()
            .find_by_id(id)
            .await?
            .ok_or_not_found("User not found")
    }
}
