//! Shopping-list recommendation handler.

use axum::{extract::State, routing::post, Router};

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::domain::{RecommendationRequest, Recommendations};
use crate::errors::AppResult;
use crate::types::ApiResponse;

/// Recommendation routes, nested under `/api/recommendations`
pub fn recommendation_routes() -> Router<AppState> {
    Router::new().route("/", post(recommend))
}

/// Match a free-text shopping request against active listings
#[utoipa::path(
    post,
    path = "/api/recommendations",
    tag = "Recommendations",
    request_body = RecommendationRequest,
    responses(
        (status = 200, description = "Best match and one alternative per term", body = Recommendations),
        (status = 400, description = "Empty query")
    )
)]
pub async fn recommend(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RecommendationRequest>,
) -> AppResult<ApiResponse<Recommendations>> {
    let recommendations = state
        .recommendation_service
        .recommend(payload.query)
        .await?;

    Ok(ApiResponse::success(recommendations))
}
