//! User repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
    SqlErr,
};
use uuid::Uuid;

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use crate::domain::{NewUser, User};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find several users at once (missing ids are skipped)
    async fn find_by_ids(&self, ids: Vec<Uuid>) -> AppResult<Vec<User>>;

    /// Find user by normalized email address
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Create a new user; `last_login` starts at creation time
    async fn create(&self, user: NewUser) -> AppResult<User>;

    /// Replace name, email and stall address
    async fn update_profile(
        &self,
        id: Uuid,
        name: String,
        email: String,
        stall_address: String,
    ) -> AppResult<User>;

    /// Record a successful login
    async fn touch_last_login(&self, id: Uuid) -> AppResult<User>;
}

/// Concrete implementation of UserRepository
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_model(&self, id: Uuid) -> AppResult<user::Model> {
        UserEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let result = UserEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(User::from))
    }

    async fn find_by_ids(&self, ids: Vec<Uuid>) -> AppResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = UserEntity::find()
            .filter(user::Column::Id.is_in(ids))
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(User::from).collect())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(User::from))
    }

    async fn create(&self, user: NewUser) -> AppResult<User> {
        let now = Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(user.name),
            email: Set(user.email),
            password_hash: Set(user.password_hash),
            phone: Set(None),
            stall_address: Set(None),
            profile_picture: Set(None),
            last_login: Set(Some(now)),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(|e| email_conflict(e, "Email already registered"))?;
        Ok(User::from(model))
    }

    async fn update_profile(
        &self,
        id: Uuid,
        name: String,
        email: String,
        stall_address: String,
    ) -> AppResult<User> {
        let mut active: ActiveModel = self.find_model(id).await?.into();
        active.name = Set(name);
        active.email = Set(email);
        active.stall_address = Set(Some(stall_address));
        active.updated_at = Set(Utc::now());

        let model = active
            .update(&self.db)
            .await
            .map_err(|e| email_conflict(e, "Email is already in use by another account"))?;
        Ok(User::from(model))
    }

    async fn touch_last_login(&self, id: Uuid) -> AppResult<User> {
        let mut active: ActiveModel = self.find_model(id).await?.into();
        active.last_login = Set(Some(Utc::now()));

        let model = active.update(&self.db).await.map_err(AppError::from)?;
        Ok(User::from(model))
    }
}

/// The unique email index catches a racing request the existence check missed.
fn email_conflict(err: DbErr, message: &str) -> AppError {
    match err.sql_err() {
        Some(sql_err) if is_unique_violation(&sql_err) => {
            tracing::warn!(error = %sql_err, "Email taken by a concurrent request");
            AppError::conflict(message)
        }
        _ => AppError::from(err),
    }
}

fn is_unique_violation(err: &SqlErr) -> bool {
    matches!(err, SqlErr::UniqueConstraintViolation(_))
}
