//! Order handlers: buyer checkout and history, seller order management.

use axum::{
    extract::State,
    routing::{get, put},
    Extension, Router,
};
use uuid::Uuid;

use crate::api::extractors::{ApiPath, ValidatedJson};
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{
    DashboardStats, Order, PaymentOutcome, PaymentStatus, SellerOrders, UpdateOrderStatus,
};
use crate::errors::{AppError, AppResult};
use crate::types::{ApiResponse, Created};

/// Buyer routes, nested under `/api/orders` behind the session middleware
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders).post(checkout))
        .route("/:id/payment", put(record_payment))
}

// =============================================================================
// Buyer
// =============================================================================

/// Check out the session user's cart
#[utoipa::path(
    post,
    path = "/api/orders",
    tag = "Orders",
    responses(
        (status = 201, description = "Order placed, cart emptied", body = Order),
        (status = 400, description = "Cart is empty or a line is out of stock"),
        (status = 401, description = "Not authenticated")
    ),
    security(("session_cookie" = []))
)]
pub async fn checkout(
    State(state): State<AppState>,
    Extension(session): Extension<CurrentUser>,
) -> AppResult<Created<Order>> {
    let order = state.order_service.checkout(session.id).await?;
    Ok(Created::new(order, "Order placed successfully"))
}

/// List the session user's orders
#[utoipa::path(
    get,
    path = "/api/orders",
    tag = "Orders",
    responses(
        (status = 200, description = "Orders, newest first", body = [Order]),
        (status = 401, description = "Not authenticated")
    ),
    security(("session_cookie" = []))
)]
pub async fn list_orders(
    State(state): State<AppState>,
    Extension(session): Extension<CurrentUser>,
) -> AppResult<ApiResponse<Vec<Order>>> {
    let orders = state.order_service.list_mine(session.id).await?;
    Ok(ApiResponse::success(orders))
}

/// Record the gateway's payment outcome for one of the buyer's orders
#[utoipa::path(
    put,
    path = "/api/orders/{id}/payment",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "Order id")),
    request_body = PaymentOutcome,
    responses(
        (status = 200, description = "Payment recorded", body = Order),
        (status = 400, description = "Payment status must be completed or failed"),
        (status = 404, description = "Order not found")
    ),
    security(("session_cookie" = []))
)]
pub async fn record_payment(
    State(state): State<AppState>,
    Extension(session): Extension<CurrentUser>,
    ApiPath(order_id): ApiPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<PaymentOutcome>,
) -> AppResult<ApiResponse<Order>> {
    if payload.status == PaymentStatus::Pending {
        return Err(AppError::validation(
            "Payment status must be completed or failed",
        ));
    }

    let order = state
        .order_service
        .record_payment(session.id, order_id, payload.status)
        .await?;

    Ok(ApiResponse::with_message(order, "Payment status recorded"))
}

// =============================================================================
// Seller (mounted under /api/user)
// =============================================================================

/// Orders containing the session user's listings
#[utoipa::path(
    get,
    path = "/api/user/seller-orders",
    tag = "Seller",
    responses(
        (status = 200, description = "Orders touching the seller's listings", body = SellerOrders),
        (status = 401, description = "Not authenticated")
    ),
    security(("session_cookie" = []))
)]
pub async fn seller_orders(
    State(state): State<AppState>,
    Extension(session): Extension<CurrentUser>,
) -> AppResult<ApiResponse<SellerOrders>> {
    let orders = state.order_service.seller_orders(session.id).await?;
    Ok(ApiResponse::success(orders))
}

/// Change the status of an order containing the seller's listings
#[utoipa::path(
    put,
    path = "/api/user/seller-orders",
    tag = "Seller",
    request_body = UpdateOrderStatus,
    responses(
        (status = 200, description = "Order status updated", body = Order),
        (status = 400, description = "Missing fields or invalid status"),
        (status = 403, description = "Order has none of the seller's listings"),
        (status = 404, description = "Order not found")
    ),
    security(("session_cookie" = []))
)]
pub async fn update_seller_order(
    State(state): State<AppState>,
    Extension(session): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<UpdateOrderStatus>,
) -> AppResult<ApiResponse<Order>> {
    let (order_id, status) = payload
        .order_id
        .zip(payload.status)
        .ok_or_else(|| AppError::validation("Order ID and status are required"))?;

    let order = state
        .order_service
        .update_seller_status(session.id, order_id, status)
        .await?;

    Ok(ApiResponse::with_message(
        order,
        "Order status updated successfully",
    ))
}

/// Seller dashboard figures
#[utoipa::path(
    get,
    path = "/api/user/dashboard-stats",
    tag = "Seller",
    responses(
        (status = 200, description = "Dashboard statistics", body = DashboardStats),
        (status = 401, description = "Not authenticated")
    ),
    security(("session_cookie" = []))
)]
pub async fn dashboard_stats(
    State(state): State<AppState>,
    Extension(session): Extension<CurrentUser>,
) -> AppResult<ApiResponse<DashboardStats>> {
    let stats = state.order_service.dashboard_stats(session.id).await?;
    Ok(ApiResponse::success(stats))
}
