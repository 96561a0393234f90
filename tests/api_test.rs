//! Integration tests for API endpoints.
//!
//! These tests drive the full router with in-memory service doubles, so no
//! database connection is needed.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use ecofinds::api::create_router;
use ecofinds::api::state::HttpSettings;
use ecofinds::domain::recommendation::recommend;
use ecofinds::domain::{
    CartView, DashboardStats, Listing, ListingFilter, ListingInput, ListingWithSeller, LoginUser,
    Order, OrderStatus, PaymentStatus, Recommendations, RegisterUser, Review, ReviewDraft,
    ReviewStats, ReviewView, SellerLine, SellerOrders, SellerReviews, UpdateProfile, User,
};
use ecofinds::errors::{AppError, AppResult};
use ecofinds::infra::Database;
use ecofinds::services::{
    AuthService, CartService, ListingService, OrderService, RecommendationService,
    ReviewService, UserService,
};
use ecofinds::types::{Paginated, PaginationParams};
use ecofinds::AppState;

// =============================================================================
// In-memory marketplace double
// =============================================================================

const PASSWORD: &str = "secret1";

/// One vendor account plus the order lines behind their dashboard.
struct FakeMarket {
    user: User,
    seller_lines: Vec<SellerLine>,
}

impl FakeMarket {
    fn new() -> Self {
        let now = Utc::now();
        let (rice, jute) = (Uuid::new_v4(), Uuid::new_v4());
        let (delivered, paid_pending, failed) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

        let line = |order_id, raw_material_id, quantity, price, status, payment_status| SellerLine {
            order_id,
            raw_material_id,
            quantity,
            price,
            status,
            payment_status,
        };

        Self {
            user: User {
                id: Uuid::new_v4(),
                name: "Green Stall".to_string(),
                email: "stall@example.com".to_string(),
                password_hash: "not-a-real-hash".to_string(),
                phone: None,
                stall_address: Some("Market Road 4".to_string()),
                profile_picture: None,
                last_login: Some(now),
                created_at: now,
                updated_at: now,
            },
            seller_lines: vec![
                // Delivered and paid: 2 × 40 + 3 × 15
                line(delivered, rice, 2, 40.0, OrderStatus::Delivered, PaymentStatus::Completed),
                line(delivered, jute, 3, 15.0, OrderStatus::Delivered, PaymentStatus::Completed),
                // Still processing: excluded from revenue
                line(paid_pending, rice, 5, 40.0, OrderStatus::Processing, PaymentStatus::Pending),
                // Payment failed: excluded from revenue
                line(failed, jute, 1, 15.0, OrderStatus::PaymentFailed, PaymentStatus::Failed),
            ],
        }
    }

    fn user_for(&self, id: Uuid) -> AppResult<User> {
        if id == self.user.id {
            Ok(self.user.clone())
        } else {
            Err(AppError::not_found("User not found"))
        }
    }
}

#[async_trait]
impl AuthService for FakeMarket {
    async fn register(&self, input: RegisterUser) -> AppResult<User> {
        if input.email.trim().eq_ignore_ascii_case(&self.user.email) {
            return Err(AppError::conflict("Email already registered"));
        }
        let mut user = self.user.clone();
        user.id = Uuid::new_v4();
        user.name = input.username;
        user.email = input.email;
        Ok(user)
    }

    async fn login(&self, input: LoginUser) -> AppResult<User> {
        if input.email == self.user.email && input.password == PASSWORD {
            Ok(self.user.clone())
        } else {
            Err(AppError::InvalidCredentials)
        }
    }

    async fn current_user(&self, id: Uuid) -> AppResult<User> {
        self.user_for(id)
    }
}

#[async_trait]
impl UserService for FakeMarket {
    async fn update_profile(&self, id: Uuid, input: UpdateProfile) -> AppResult<User> {
        let mut user = self.user_for(id)?;
        user.name = input.username.trim().to_string();
        user.email = input.email.trim().to_lowercase();
        user.stall_address = input.stall_address.map(|s| s.trim().to_string());
        Ok(user)
    }
}

#[async_trait]
impl ListingService for FakeMarket {
    async fn browse(
        &self,
        _filter: ListingFilter,
        page: PaginationParams,
    ) -> AppResult<Paginated<ListingWithSeller>> {
        Ok(page.paginate(Vec::new()))
    }

    async fn get_public(&self, _id: Uuid) -> AppResult<ListingWithSeller> {
        Err(AppError::not_found("Raw material not found"))
    }

    async fn list_own(&self, _owner: Uuid) -> AppResult<Vec<Listing>> {
        Ok(Vec::new())
    }

    async fn create(&self, _owner: Uuid, _input: ListingInput) -> AppResult<Listing> {
        Err(AppError::bad_request("Missing required fields: name"))
    }

    async fn update(&self, _owner: Uuid, _id: Uuid, _input: ListingInput) -> AppResult<Listing> {
        Err(AppError::not_found(
            "Raw material not found or you do not have permission to edit it",
        ))
    }

    async fn delete(&self, _owner: Uuid, _id: Uuid) -> AppResult<()> {
        Ok(())
    }
}

#[async_trait]
impl CartService for FakeMarket {
    async fn get_cart(&self, _user_id: Uuid) -> AppResult<CartView> {
        Ok(CartView::empty())
    }

    async fn add_item(&self, _user_id: Uuid, _id: Uuid, _quantity: i32) -> AppResult<CartView> {
        Ok(CartView::empty())
    }

    async fn update_item(&self, _user_id: Uuid, _id: Uuid, _quantity: i32) -> AppResult<CartView> {
        Err(AppError::not_found("Cart not found"))
    }

    async fn remove_item(&self, _user_id: Uuid, _id: Uuid) -> AppResult<CartView> {
        Err(AppError::not_found("Cart not found"))
    }
}

#[async_trait]
impl OrderService for FakeMarket {
    async fn checkout(&self, _user_id: Uuid) -> AppResult<Order> {
        Err(AppError::bad_request("Cart is empty"))
    }

    async fn list_mine(&self, _user_id: Uuid) -> AppResult<Vec<Order>> {
        Ok(Vec::new())
    }

    async fn record_payment(
        &self,
        _user_id: Uuid,
        _order_id: Uuid,
        _outcome: PaymentStatus,
    ) -> AppResult<Order> {
        Err(AppError::not_found("Order not found"))
    }

    async fn seller_orders(&self, _seller_id: Uuid) -> AppResult<SellerOrders> {
        Ok(SellerOrders {
            orders: Vec::new(),
            total_materials: 0,
            message: Some("No materials found".to_string()),
        })
    }

    async fn update_seller_status(
        &self,
        _seller_id: Uuid,
        _order_id: Uuid,
        _status: String,
    ) -> AppResult<Order> {
        Err(AppError::not_found("Order not found"))
    }

    async fn dashboard_stats(&self, seller_id: Uuid) -> AppResult<DashboardStats> {
        self.user_for(seller_id)?;
        Ok(DashboardStats::compute(2, 1, &self.seller_lines))
    }
}

#[async_trait]
impl ReviewService for FakeMarket {
    async fn list_for_listing(&self, _raw_material_id: Uuid) -> AppResult<Vec<ReviewView>> {
        Ok(Vec::new())
    }

    async fn create(
        &self,
        _user_id: Uuid,
        _raw_material_id: Uuid,
        _draft: ReviewDraft,
    ) -> AppResult<Review> {
        Err(AppError::not_found("Raw material not found"))
    }

    async fn seller_reviews(&self, _seller_id: Uuid) -> AppResult<SellerReviews> {
        Ok(SellerReviews {
            reviews: Vec::new(),
            stats: ReviewStats::compute(&[]),
        })
    }
}

#[async_trait]
impl RecommendationService for FakeMarket {
    async fn recommend(&self, query: String) -> AppResult<Recommendations> {
        Ok(recommend(&query, &[]))
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn app() -> (Router, User) {
    let market = Arc::new(FakeMarket::new());
    let user = market.user.clone();

    let state = AppState {
        auth_service: market.clone(),
        user_service: market.clone(),
        listing_service: market.clone(),
        cart_service: market.clone(),
        order_service: market.clone(),
        review_service: market.clone(),
        recommendation_service: market,
        database: Arc::new(Database::from_connection(DatabaseConnection::Disconnected)),
        settings: HttpSettings {
            cookie_secure: false,
            max_upload_bytes: 1024 * 1024,
        },
    };

    (create_router(state), user)
}

fn request(method: &str, uri: &str, body: Option<Value>, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn set_cookie(response: &axum::response::Response) -> String {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn test_root_endpoint() {
    let (app, _) = app();

    let response = app.oneshot(request("GET", "/", None, None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"Welcome to the EcoFinds API");
}

#[tokio::test]
async fn test_health_reports_unreachable_database() {
    let (app, _) = app();

    let response = app
        .oneshot(request("GET", "/health", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = read_json(response).await;
    assert_eq!(body["database"], "unhealthy");
}

#[tokio::test]
async fn test_login_then_fetch_current_user() {
    let (app, user) = app();

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/auth/login",
            Some(json!({ "email": user.email, "password": PASSWORD })),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = set_cookie(&response);
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Strict"));
    let session = cookie.split(';').next().unwrap().to_string();
    assert_eq!(session, format!("userId={}", user.id));

    let body = read_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Login successful");

    let response = app
        .oneshot(request("GET", "/api/auth/user", None, Some(&session)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["data"]["id"], user.id.to_string());
    assert_eq!(body["data"]["stallAddress"], "Market Road 4");
}

#[tokio::test]
async fn test_login_with_wrong_password() {
    let (app, user) = app();

    let response = app
        .oneshot(request(
            "POST",
            "/api/auth/login",
            Some(json!({ "email": user.email, "password": "wrong-one" })),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(set_cookie(&response).is_empty());
    let body = read_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Invalid email or password");
    assert_eq!(body["code"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_register_validation_and_conflict() {
    let (app, user) = app();

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/auth/register",
            Some(json!({
                "username": "Second Stall",
                "email": "second@example.com",
                "password": "secret1",
                "confirmPassword": "secret2"
            })),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(body["error"], "Passwords do not match");

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/auth/register",
            Some(json!({
                "username": "Copy Stall",
                "email": user.email,
                "password": "secret1",
                "confirmPassword": "secret1"
            })),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .oneshot(request(
            "POST",
            "/api/auth/register",
            Some(json!({
                "username": "Second Stall",
                "email": "second@example.com",
                "password": "secret1",
                "confirmPassword": "secret1"
            })),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    assert!(set_cookie(&response).starts_with("userId="));
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let (app, user) = app();

    let response = app
        .oneshot(request(
            "POST",
            "/api/auth/logout",
            None,
            Some(&format!("userId={}", user.id)),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = set_cookie(&response);
    assert!(cookie.starts_with("userId=;"));
    assert!(cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn test_garbage_session_cookie_is_rejected() {
    let (app, _) = app();

    let response = app
        .oneshot(request("GET", "/api/cart", None, Some("userId=not-a-uuid")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = read_json(response).await;
    assert_eq!(body["code"], "UNAUTHORIZED");
    assert_eq!(body["error"], "Not authenticated");
}

#[tokio::test]
async fn test_dashboard_revenue_counts_delivered_paid_lines() {
    let (app, user) = app();

    let response = app
        .oneshot(request(
            "GET",
            "/api/user/dashboard-stats",
            None,
            Some(&format!("userId={}", user.id)),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    let stats = &body["data"];
    assert_eq!(stats["totalMaterials"], 2);
    assert_eq!(stats["activeMaterials"], 1);
    assert_eq!(stats["totalOrders"], 3);
    assert_eq!(stats["pendingOrders"], 1);
    assert_eq!(stats["deliveredOrders"], 1);
    assert_eq!(stats["totalRevenue"], 125.0);
}

#[tokio::test]
async fn test_catalogue_is_public_and_paginated() {
    let (app, _) = app();

    let response = app
        .oneshot(request(
            "GET",
            "/api/rawmaterials/available?page=2&perPage=5&sort=price-low",
            None,
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["meta"]["page"], 2);
    assert_eq!(body["data"]["meta"]["perPage"], 5);
    assert_eq!(body["data"]["data"], json!([]));
}

#[tokio::test]
async fn test_seller_orders_without_materials() {
    let (app, user) = app();

    let response = app
        .oneshot(request(
            "GET",
            "/api/user/seller-orders",
            None,
            Some(&format!("userId={}", user.id)),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["data"]["orders"], json!([]));
    assert_eq!(body["data"]["message"], "No materials found");
}

#[tokio::test]
async fn test_pending_payment_outcome_is_rejected() {
    let (app, user) = app();

    let response = app
        .oneshot(request(
            "PUT",
            &format!("/api/orders/{}/payment", Uuid::new_v4()),
            Some(json!({ "status": "pending" })),
            Some(&format!("userId={}", user.id)),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_empty_recommendation_query() {
    let (app, _) = app();

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/recommendations",
            Some(json!({ "query": "" })),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(request(
            "POST",
            "/api/recommendations",
            Some(json!({ "query": "rice, onions", "location": "Pune" })),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["data"]["totalFound"], 0);
}
