//! Cart handlers.

use axum::{extract::State, routing::get, Extension, Router};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::CartView;
use crate::errors::{AppError, AppResult};
use crate::types::ApiResponse;

// =============================================================================
// Request DTOs
// =============================================================================

/// Add-to-cart request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddToCart {
    #[validate(
        required(message = "Raw Material ID is required"),
        length(min = 1, message = "Raw Material ID is required")
    )]
    #[schema(example = "5f0e8f0e-7c1a-4b8e-9a51-2f1d0c3b7a66")]
    pub raw_material_id: Option<String>,
    #[validate(
        required(message = "Valid quantity is required"),
        range(min = 1, message = "Valid quantity is required")
    )]
    #[schema(example = 2)]
    pub quantity: Option<i32>,
}

/// Set the quantity of a cart line
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartItem {
    #[validate(required(message = "Valid raw material ID and quantity are required"))]
    pub raw_material_id: Option<Uuid>,
    #[validate(
        required(message = "Valid raw material ID and quantity are required"),
        range(min = 1, message = "Valid raw material ID and quantity are required")
    )]
    pub quantity: Option<i32>,
}

/// Remove a cart line
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RemoveFromCart {
    #[validate(required(message = "Raw Material ID is required"))]
    pub raw_material_id: Option<Uuid>,
}

impl AddToCart {
    /// An id that is not a UUID cannot name a listing.
    fn line(self) -> AppResult<(Uuid, i32)> {
        let (raw_id, quantity) = self
            .raw_material_id
            .zip(self.quantity)
            .ok_or_else(|| AppError::validation("Valid raw material ID and quantity are required"))?;
        let id = Uuid::parse_str(raw_id.trim())
            .map_err(|_| AppError::not_found("Raw material not found or no longer available"))?;
        Ok((id, quantity))
    }
}

/// Both fields are guaranteed by `validate()`; this keeps the handlers free of unwraps.
fn line_of(raw_material_id: Option<Uuid>, quantity: Option<i32>) -> AppResult<(Uuid, i32)> {
    raw_material_id
        .zip(quantity)
        .ok_or_else(|| AppError::validation("Valid raw material ID and quantity are required"))
}

// =============================================================================
// Routes
// =============================================================================

/// Cart routes, nested under `/api/cart` behind the session middleware
pub fn cart_routes() -> Router<AppState> {
    Router::new().route(
        "/",
        get(get_cart)
            .post(add_to_cart)
            .put(update_cart_item)
            .delete(remove_from_cart),
    )
}

/// Get the session user's cart
#[utoipa::path(
    get,
    path = "/api/cart",
    tag = "Cart",
    responses(
        (status = 200, description = "Cart with stock flags", body = CartView),
        (status = 401, description = "Not authenticated")
    ),
    security(("session_cookie" = []))
)]
pub async fn get_cart(
    State(state): State<AppState>,
    Extension(session): Extension<CurrentUser>,
) -> AppResult<ApiResponse<CartView>> {
    let cart = state.cart_service.get_cart(session.id).await?;
    Ok(ApiResponse::success(cart))
}

/// Add a raw material to the cart
#[utoipa::path(
    post,
    path = "/api/cart",
    tag = "Cart",
    request_body = AddToCart,
    responses(
        (status = 200, description = "Item added", body = CartView),
        (status = 400, description = "Invalid quantity or insufficient stock"),
        (status = 404, description = "Raw material not found or no longer available")
    ),
    security(("session_cookie" = []))
)]
pub async fn add_to_cart(
    State(state): State<AppState>,
    Extension(session): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<AddToCart>,
) -> AppResult<ApiResponse<CartView>> {
    let (raw_material_id, quantity) = payload.line()?;
    let cart = state
        .cart_service
        .add_item(session.id, raw_material_id, quantity)
        .await?;

    Ok(ApiResponse::with_message(cart, "Item added to cart successfully"))
}

/// Change the quantity of a cart line
#[utoipa::path(
    put,
    path = "/api/cart",
    tag = "Cart",
    request_body = UpdateCartItem,
    responses(
        (status = 200, description = "Cart updated", body = CartView),
        (status = 400, description = "Invalid quantity or insufficient stock"),
        (status = 404, description = "Cart or item not found")
    ),
    security(("session_cookie" = []))
)]
pub async fn update_cart_item(
    State(state): State<AppState>,
    Extension(session): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<UpdateCartItem>,
) -> AppResult<ApiResponse<CartView>> {
    let (raw_material_id, quantity) = line_of(payload.raw_material_id, payload.quantity)?;
    let cart = state
        .cart_service
        .update_item(session.id, raw_material_id, quantity)
        .await?;

    Ok(ApiResponse::with_message(cart, "Cart updated successfully"))
}

/// Remove a raw material from the cart
#[utoipa::path(
    delete,
    path = "/api/cart",
    tag = "Cart",
    request_body = RemoveFromCart,
    responses(
        (status = 200, description = "Item removed", body = CartView),
        (status = 404, description = "Cart not found")
    ),
    security(("session_cookie" = []))
)]
pub async fn remove_from_cart(
    State(state): State<AppState>,
    Extension(session): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<RemoveFromCart>,
) -> AppResult<ApiResponse<CartView>> {
    let raw_material_id = payload
        .raw_material_id
        .ok_or_else(|| AppError::validation("Raw Material ID is required"))?;
    let cart = state
        .cart_service
        .remove_item(session.id, raw_material_id)
        .await?;

    Ok(ApiResponse::with_message(cart, "Item removed from cart"))
}
