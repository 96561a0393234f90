//! Session user's account area: profile plus the seller views.

use axum::{
    extract::State,
    routing::{get, put},
    Extension, Router,
};

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{UpdateProfile, UserProfile};
use crate::errors::AppResult;
use crate::types::ApiResponse;

use super::{listing_handler, order_handler, review_handler};

/// Create the `/api/user` routes; the caller adds the session layer
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/update-profile", put(update_profile))
        .route(
            "/rawmaterials",
            get(listing_handler::list_own)
                .post(listing_handler::create_listing)
                .put(listing_handler::update_listing)
                .delete(listing_handler::delete_listing),
        )
        .route(
            "/seller-orders",
            get(order_handler::seller_orders).put(order_handler::update_seller_order),
        )
        .route("/dashboard-stats", get(order_handler::dashboard_stats))
        .route("/seller-reviews", get(review_handler::seller_reviews))
}

/// Update the session user's profile
#[utoipa::path(
    put,
    path = "/api/user/update-profile",
    tag = "Profile",
    request_body = UpdateProfile,
    responses(
        (status = 200, description = "Profile updated", body = UserProfile),
        (status = 400, description = "Validation error"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Email is already in use by another account")
    ),
    security(("session_cookie" = []))
)]
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(session): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<UpdateProfile>,
) -> AppResult<ApiResponse<UserProfile>> {
    let user = state
        .user_service
        .update_profile(session.id, payload)
        .await?;

    Ok(ApiResponse::with_message(
        UserProfile::from(user),
        "Profile updated successfully",
    ))
}
