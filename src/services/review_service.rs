//! Review service - listing reviews and the seller's review summary.

use std::collections::HashMap;

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::review::{average_rating, display_name};
use crate::domain::{NewReview, Review, ReviewDraft, ReviewStats, ReviewView, SellerReviews, User};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Review service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ReviewService: Send + Sync {
    /// Active reviews of a listing with author details, newest first
    async fn list_for_listing(&self, raw_material_id: Uuid) -> AppResult<Vec<ReviewView>>;

    /// Post a review and refresh the listing's rating aggregate
    async fn create(
        &self,
        user_id: Uuid,
        raw_material_id: Uuid,
        draft: ReviewDraft,
    ) -> AppResult<Review>;

    /// Reviews received across the seller's listings, with stats
    async fn seller_reviews(&self, seller_id: Uuid) -> AppResult<SellerReviews>;
}

/// Concrete implementation of ReviewService using Unit of Work.
pub struct ReviewManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> ReviewManager<U> {
    /// Create new review service instance with Unit of Work
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> ReviewService for ReviewManager<U> {
    async fn list_for_listing(&self, raw_material_id: Uuid) -> AppResult<Vec<ReviewView>> {
        let reviews = self.uow.reviews().list_for_listing(raw_material_id).await?;
        if reviews.is_empty() {
            return Ok(Vec::new());
        }

        let mut author_ids: Vec<Uuid> = reviews.iter().map(|r| r.user_id).collect();
        author_ids.sort_unstable();
        author_ids.dedup();
        let authors: HashMap<Uuid, User> = self
            .uow
            .users()
            .find_by_ids(author_ids)
            .await?
            .into_iter()
            .map(|user| (user.id, user))
            .collect();

        Ok(reviews
            .into_iter()
            .map(|review| {
                let author = authors.get(&review.user_id);
                ReviewView::new(review, author)
            })
            .collect())
    }

    async fn create(
        &self,
        user_id: Uuid,
        raw_material_id: Uuid,
        draft: ReviewDraft,
    ) -> AppResult<Review> {
        let (rating, comment) = draft.validated()?;

        let listing = self
            .uow
            .listings()
            .find_by_id(raw_material_id)
            .await?
            .ok_or_not_found("Raw material not found")?;
        let author = self
            .uow
            .users()
            .find_by_id(user_id)
            .await?
            .ok_or_not_found("User not found")?;

        // Pre-check only; two concurrent posts can both get through.
        if self
            .uow
            .reviews()
            .find_by_author(user_id, raw_material_id)
            .await?
            .is_some()
        {
            return Err(AppError::conflict("You have already reviewed this product"));
        }

        let seller = self.uow.users().find_by_id(listing.created_by).await?;
        let review = self
            .uow
            .reviews()
            .create(NewReview {
                rating,
                title: draft.title.as_deref().unwrap_or_default().trim().to_string(),
                comment: comment.to_string(),
                raw_material_id,
                raw_material_name: listing.name.clone(),
                seller_id: listing.created_by,
                seller_name: display_name(seller.as_ref()),
                user_id,
                user_name: display_name(Some(&author)),
            })
            .await?;

        let ratings = self.uow.reviews().ratings_for_listing(raw_material_id).await?;
        self.uow
            .listings()
            .update_rating(raw_material_id, average_rating(&ratings), ratings.len() as i32)
            .await?;

        tracing::info!(review_id = %review.id, %raw_material_id, rating, "Review posted");
        Ok(review)
    }

    async fn seller_reviews(&self, seller_id: Uuid) -> AppResult<SellerReviews> {
        let reviews = self.uow.reviews().list_for_seller(seller_id).await?;
        Ok(SellerReviews {
            stats: ReviewStats::compute(&reviews),
            reviews,
        })
    }
}
