//! Review repository.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use super::entities::review::{self, ActiveModel, Entity as ReviewEntity};
use crate::domain::{NewReview, Review};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Review repository trait for dependency injection.
///
/// Queries only ever see active reviews.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Reviews of a listing, newest first
    async fn list_for_listing(&self, raw_material_id: Uuid) -> AppResult<Vec<Review>>;

    /// Reviews received by a seller, newest first
    async fn list_for_seller(&self, seller_id: Uuid) -> AppResult<Vec<Review>>;

    /// The author's existing review of a listing, if any
    async fn find_by_author(&self, user_id: Uuid, raw_material_id: Uuid)
        -> AppResult<Option<Review>>;

    async fn create(&self, review: NewReview) -> AppResult<Review>;

    /// Ratings of a listing's reviews
    async fn ratings_for_listing(&self, raw_material_id: Uuid) -> AppResult<Vec<i32>>;
}

/// Concrete implementation of ReviewRepository
pub struct ReviewStore {
    db: DatabaseConnection,
}

impl ReviewStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ReviewRepository for ReviewStore {
    async fn list_for_listing(&self, raw_material_id: Uuid) -> AppResult<Vec<Review>> {
        let models = ReviewEntity::find()
            .filter(review::Column::RawMaterialId.eq(raw_material_id))
            .filter(review::Column::IsActive.eq(true))
            .order_by_desc(review::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(Review::from).collect())
    }

    async fn list_for_seller(&self, seller_id: Uuid) -> AppResult<Vec<Review>> {
        let models = ReviewEntity::find()
            .filter(review::Column::SellerId.eq(seller_id))
            .filter(review::Column::IsActive.eq(true))
            .order_by_desc(review::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(Review::from).collect())
    }

    async fn find_by_author(
        &self,
        user_id: Uuid,
        raw_material_id: Uuid,
    ) -> AppResult<Option<Review>> {
        let result = ReviewEntity::find()
            .filter(review::Column::UserId.eq(user_id))
            .filter(review::Column::RawMaterialId.eq(raw_material_id))
            .filter(review::Column::IsActive.eq(true))
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Review::from))
    }

    async fn create(&self, review: NewReview) -> AppResult<Review> {
        let now = Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            rating: Set(review.rating),
            title: Set(review.title),
            comment: Set(review.comment),
            raw_material_id: Set(review.raw_material_id),
            raw_material_name: Set(review.raw_material_name),
            seller_id: Set(review.seller_id),
            seller_name: Set(review.seller_name),
            user_id: Set(review.user_id),
            user_name: Set(review.user_name),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(&self.db).await.map_err(AppError::from)?;
        Ok(Review::from(model))
    }

    async fn ratings_for_listing(&self, raw_material_id: Uuid) -> AppResult<Vec<i32>> {
        let ratings = ReviewEntity::find()
            .select_only()
            .column(review::Column::Rating)
            .filter(review::Column::RawMaterialId.eq(raw_material_id))
            .filter(review::Column::IsActive.eq(true))
            .into_tuple::<i32>()
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(ratings)
    }
}
