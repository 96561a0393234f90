//! User service - profile maintenance for the session user.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{normalize_email, UpdateProfile, User};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserService: Send + Sync {
    /// Update name, email and stall address of an existing user
    async fn update_profile(&self, id: Uuid, input: UpdateProfile) -> AppResult<User>;
}

/// Concrete implementation of UserService using Unit of Work.
pub struct UserManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> UserManager<U> {
    /// Create new user service instance with Unit of Work
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> UserService for UserManager<U> {
    async fn update_profile(&self, id: Uuid, input: UpdateProfile) -> AppResult<User> {
        let user = self
            .uow
            .users()
            .find_by_id(id)
            .await?
            .ok_or_not_found("User not found")?;

        let email = normalize_email(&input.email);
        if email != user.email {
            let taken = self
                .uow
                .users()
                .find_by_email(&email)
                .await?
                .is_some_and(|other| other.id != id);
            if taken {
                return Err(AppError::conflict(
                    "Email is already in use by another account",
                ));
            }
        }

        let stall_address = input
            .stall_address
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_string();

        self.uow
            .users()
            .update_profile(id, input.username.trim().to_string(), email, stall_address)
            .await
    }
}
