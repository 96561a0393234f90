//! Listing handlers: the public catalogue and the owner's raw materials.

use axum::{
    extract::State,
    routing::get,
    Extension, Router,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::api::extractors::{ApiPath, ApiQuery, ListingForm};
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{Listing, ListingFilter, ListingWithSeller};
use crate::errors::{AppError, AppResult};
use crate::types::{ApiResponse, Created, Paginated, PaginationParams};

/// `?id=` selector used by the owner's update and delete
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MaterialIdParam {
    /// Listing id
    pub id: Option<String>,
}

impl MaterialIdParam {
    /// Parsed id; absent → 400, unparsable → the caller's not-found message
    fn resolve(&self, not_found: &str) -> AppResult<Uuid> {
        let raw = self
            .id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| AppError::bad_request("Material ID is required"))?;
        Uuid::parse_str(raw).map_err(|_| AppError::not_found(not_found))
    }
}

/// Public catalogue routes; the owner handlers are mounted by `user_routes`
pub fn listing_routes() -> Router<AppState> {
    Router::new()
        .route("/available", get(browse))
        .route("/:id", get(get_listing))
}

/// Browse active listings
#[utoipa::path(
    get,
    path = "/api/rawmaterials/available",
    tag = "Raw materials",
    params(ListingFilter, PaginationParams),
    responses((status = 200, description = "Page of active listings with sellers", body = [ListingWithSeller]))
)]
pub async fn browse(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<ListingFilter>,
    ApiQuery(page): ApiQuery<PaginationParams>,
) -> AppResult<ApiResponse<Paginated<ListingWithSeller>>> {
    let listings = state.listing_service.browse(filter, page).await?;
    Ok(ApiResponse::success(listings))
}

/// Get one active listing
#[utoipa::path(
    get,
    path = "/api/rawmaterials/{id}",
    tag = "Raw materials",
    params(("id" = Uuid, Path, description = "Listing id")),
    responses(
        (status = 200, description = "Listing", body = ListingWithSeller),
        (status = 404, description = "Raw material not found")
    )
)]
pub async fn get_listing(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<ApiResponse<ListingWithSeller>> {
    let listing = state.listing_service.get_public(id).await?;
    Ok(ApiResponse::success(listing))
}

/// List the session user's raw materials
#[utoipa::path(
    get,
    path = "/api/user/rawmaterials",
    tag = "Raw materials",
    responses(
        (status = 200, description = "Owned listings, newest first", body = [Listing]),
        (status = 401, description = "Not authenticated")
    ),
    security(("session_cookie" = []))
)]
pub async fn list_own(
    State(state): State<AppState>,
    Extension(session): Extension<CurrentUser>,
) -> AppResult<ApiResponse<Vec<Listing>>> {
    let listings = state.listing_service.list_own(session.id).await?;
    Ok(ApiResponse::success(listings))
}

/// Add a raw material (JSON or multipart form)
#[utoipa::path(
    post,
    path = "/api/user/rawmaterials",
    tag = "Raw materials",
    request_body(content = crate::domain::ListingInput, description = "JSON body, or multipart form with image0..imageN file parts"),
    responses(
        (status = 201, description = "Raw material added", body = Listing),
        (status = 400, description = "Missing or invalid fields"),
        (status = 401, description = "Not authenticated")
    ),
    security(("session_cookie" = []))
)]
pub async fn create_listing(
    State(state): State<AppState>,
    Extension(session): Extension<CurrentUser>,
    form: ListingForm,
) -> AppResult<Created<Listing>> {
    let has_images = form
        .input
        .images
        .as_ref()
        .is_some_and(|images| !images.is_empty());
    if form.multipart && !has_images {
        return Err(AppError::bad_request("At least one image is required"));
    }

    let listing = state.listing_service.create(session.id, form.input).await?;
    Ok(Created::new(listing, "Raw material added successfully"))
}

/// Update an owned raw material
#[utoipa::path(
    put,
    path = "/api/user/rawmaterials",
    tag = "Raw materials",
    params(MaterialIdParam),
    request_body(content = crate::domain::ListingInput, description = "Partial update; JSON or multipart form"),
    responses(
        (status = 200, description = "Raw material updated", body = Listing),
        (status = 400, description = "Material ID is required"),
        (status = 404, description = "Not found or not owned")
    ),
    security(("session_cookie" = []))
)]
pub async fn update_listing(
    State(state): State<AppState>,
    Extension(session): Extension<CurrentUser>,
    ApiQuery(param): ApiQuery<MaterialIdParam>,
    form: ListingForm,
) -> AppResult<ApiResponse<Listing>> {
    let id = param.resolve("Raw material not found or you do not have permission to edit it")?;
    let listing = state
        .listing_service
        .update(session.id, id, form.input)
        .await?;

    Ok(ApiResponse::with_message(listing, "Material updated successfully"))
}

/// Delete an owned raw material
#[utoipa::path(
    delete,
    path = "/api/user/rawmaterials",
    tag = "Raw materials",
    params(MaterialIdParam),
    responses(
        (status = 200, description = "Raw material deleted"),
        (status = 400, description = "Material ID is required"),
        (status = 404, description = "Not found or not owned")
    ),
    security(("session_cookie" = []))
)]
pub async fn delete_listing(
    State(state): State<AppState>,
    Extension(session): Extension<CurrentUser>,
    ApiQuery(param): ApiQuery<MaterialIdParam>,
) -> AppResult<ApiResponse<()>> {
    let id =
        param.resolve("Raw material not found or you do not have permission to delete it")?;
    state.listing_service.delete(session.id, id).await?;

    Ok(ApiResponse::message("Raw material deleted successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_material_id_param() {
        let missing = MaterialIdParam { id: None };
        assert!(matches!(
            missing.resolve("nope"),
            Err(AppError::BadRequest(_))
        ));

        let garbage = MaterialIdParam {
            id: Some("not-a-uuid".to_string()),
        };
        assert!(matches!(garbage.resolve("nope"), Err(AppError::NotFound(_))));

        let id = Uuid::new_v4();
        let valid = MaterialIdParam {
            id: Some(id.to_string()),
        };
        assert_eq!(valid.resolve("nope").unwrap(), id);
    }
}
