//! Listing reviews and rating aggregation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::user::User;
use crate::config::{ANONYMOUS_USER_NAME, MAX_RATING, MIN_RATING, MIN_REVIEW_COMMENT_LENGTH};
use crate::errors::{AppError, AppResult};

/// Review domain entity. Author and seller names are denormalised at write time.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: Uuid,
    pub rating: i32,
    pub title: String,
    pub comment: String,
    pub raw_material_id: Uuid,
    pub raw_material_name: String,
    pub seller_id: Uuid,
    pub seller_name: String,
    pub user_id: Uuid,
    pub user_name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Review as shown on a listing page
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewView {
    #[serde(flatten)]
    pub review: Review,
    pub user_profile_picture: Option<String>,
}

impl ReviewView {
    /// Attach author details; a blank stored name falls back to the author's current name.
    pub fn new(mut review: Review, author: Option<&User>) -> Self {
        if review.user_name.trim().is_empty() {
            review.user_name = display_name(author);
        }
        Self {
            review,
            user_profile_picture: author.and_then(|user| user.profile_picture.clone()),
        }
    }
}

/// Name to show for a user, or the anonymous placeholder
pub fn display_name(user: Option<&User>) -> String {
    user.map(|user| user.name.trim())
        .filter(|name| !name.is_empty())
        .unwrap_or(ANONYMOUS_USER_NAME)
        .to_string()
}

/// Review submission
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ReviewDraft {
    #[schema(example = 5)]
    pub rating: Option<i32>,
    pub title: Option<String>,
    #[schema(example = "Fresh stock and quick delivery")]
    pub comment: Option<String>,
}

impl ReviewDraft {
    /// Check the submission, returning the accepted rating and comment.
    pub fn validated(&self) -> AppResult<(i32, &str)> {
        let rating = self.rating.filter(|r| *r != 0);
        let comment = self.comment.as_deref().filter(|c| !c.is_empty());
        let (Some(rating), Some(comment)) = (rating, comment) else {
            return Err(AppError::validation("Rating and comment are required"));
        };

        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            return Err(AppError::validation("Rating must be between 1 and 5"));
        }
        if comment.chars().count() < MIN_REVIEW_COMMENT_LENGTH {
            return Err(AppError::validation(
                "Comment must be at least 10 characters long",
            ));
        }
        Ok((rating, comment))
    }
}

/// Fields for inserting a review
#[derive(Debug, Clone, PartialEq)]
pub struct NewReview {
    pub rating: i32,
    pub title: String,
    pub comment: String,
    pub raw_material_id: Uuid,
    pub raw_material_name: String,
    pub seller_id: Uuid,
    pub seller_name: String,
    pub user_id: Uuid,
    pub user_name: String,
}

/// Mean rating rounded to one decimal; 0 when there are no ratings.
pub fn average_rating(ratings: &[i32]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }
    let sum: i64 = ratings.iter().map(|r| i64::from(*r)).sum();
    let mean = sum as f64 / ratings.len() as f64;
    (mean * 10.0).round() / 10.0
}

/// Count of reviews per star value
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct RatingBreakdown {
    #[serde(rename = "5")]
    pub five: u64,
    #[serde(rename = "4")]
    pub four: u64,
    #[serde(rename = "3")]
    pub three: u64,
    #[serde(rename = "2")]
    pub two: u64,
    #[serde(rename = "1")]
    pub one: u64,
}

/// Summary over a seller's reviews
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewStats {
    pub total_reviews: u64,
    pub average_rating: f64,
    pub rating_breakdown: RatingBreakdown,
}

impl ReviewStats {
    pub fn compute(reviews: &[Review]) -> Self {
        let ratings: Vec<i32> = reviews.iter().map(|review| review.rating).collect();
        let mut breakdown = RatingBreakdown::default();
        for rating in &ratings {
            match rating {
                5 => breakdown.five += 1,
                4 => breakdown.four += 1,
                3 => breakdown.three += 1,
                2 => breakdown.two += 1,
                1 => breakdown.one += 1,
                _ => {}
            }
        }

        Self {
            total_reviews: reviews.len() as u64,
            average_rating: average_rating(&ratings),
            rating_breakdown: breakdown,
        }
    }
}

/// Seller's received reviews with their summary
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SellerReviews {
    pub reviews: Vec<Review>,
    pub stats: ReviewStats,
}
