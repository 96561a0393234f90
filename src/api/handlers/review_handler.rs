//! Review handlers.

use axum::{
    extract::{rejection::JsonRejection, State},
    middleware,
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::api::extractors::ApiPath;
use crate::api::middleware::{session_middleware, CurrentUser};
use crate::api::AppState;
use crate::domain::{Review, ReviewDraft, ReviewView, SellerReviews};
use crate::errors::{AppError, AppResult};
use crate::types::{ApiResponse, Created};

/// Review routes, nested under `/api/reviews`; posting needs a session
pub fn review_routes() -> Router<AppState> {
    Router::new().route(
        "/:raw_material_id",
        get(list_reviews).merge(
            post(create_review).route_layer(middleware::from_fn(session_middleware)),
        ),
    )
}

/// Active reviews of a listing
#[utoipa::path(
    get,
    path = "/api/reviews/{raw_material_id}",
    tag = "Reviews",
    params(("raw_material_id" = Uuid, Path, description = "Listing id")),
    responses((status = 200, description = "Reviews, newest first", body = [ReviewView]))
)]
pub async fn list_reviews(
    State(state): State<AppState>,
    ApiPath(raw_material_id): ApiPath<Uuid>,
) -> AppResult<ApiResponse<Vec<ReviewView>>> {
    let reviews = state.review_service.list_for_listing(raw_material_id).await?;
    Ok(ApiResponse::success(reviews))
}

/// Review a listing
#[utoipa::path(
    post,
    path = "/api/reviews/{raw_material_id}",
    tag = "Reviews",
    params(("raw_material_id" = Uuid, Path, description = "Listing id")),
    request_body = ReviewDraft,
    responses(
        (status = 201, description = "Review added", body = Review),
        (status = 400, description = "Invalid rating or comment"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Raw material not found"),
        (status = 409, description = "Already reviewed")
    ),
    security(("session_cookie" = []))
)]
pub async fn create_review(
    State(state): State<AppState>,
    Extension(session): Extension<CurrentUser>,
    ApiPath(raw_material_id): ApiPath<Uuid>,
    payload: Result<Json<ReviewDraft>, JsonRejection>,
) -> AppResult<Created<Review>> {
    let Json(draft) = payload.map_err(|e| AppError::validation(e.body_text()))?;
    let review = state
        .review_service
        .create(session.id, raw_material_id, draft)
        .await?;

    Ok(Created::new(review, "Review added successfully"))
}

/// Reviews received on the session user's listings
#[utoipa::path(
    get,
    path = "/api/user/seller-reviews",
    tag = "Seller",
    responses(
        (status = 200, description = "Reviews with rating summary", body = SellerReviews),
        (status = 401, description = "Not authenticated")
    ),
    security(("session_cookie" = []))
)]
pub async fn seller_reviews(
    State(state): State<AppState>,
    Extension(session): Extension<CurrentUser>,
) -> AppResult<ApiResponse<SellerReviews>> {
    let reviews = state.review_service.seller_reviews(session.id).await?;
    Ok(ApiResponse::success(reviews))
}
