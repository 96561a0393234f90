//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{
    auth_handler, cart_handler, listing_handler, order_handler, recommendation_handler,
    review_handler, user_handler,
};
use crate::config::SESSION_COOKIE_NAME;
use crate::domain::{
    CartLineView, CartView, DashboardStats, Listing, ListingImage, ListingInput, ListingSummary,
    ListingWithSeller, LoginUser, Order, OrderItem, OrderStatus, PaymentOutcome, PaymentStatus,
    RankedListing, RatingBreakdown, Recommendation, RecommendationRequest, Recommendations,
    RegisterUser, Review, ReviewDraft, ReviewStats, ReviewView, SellerOrders, SellerReviews,
    SellerSummary, SortOrder, UpdateOrderStatus, UpdateProfile, UserProfile,
};
use crate::types::PaginationMeta;

/// OpenAPI documentation for the EcoFinds API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "EcoFinds API",
        version = "0.1.0",
        description = "Marketplace API for second-hand goods and raw materials",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        // Authentication
        auth_handler::register,
        auth_handler::login,
        auth_handler::logout,
        auth_handler::current_user,
        // Profile
        user_handler::update_profile,
        // Raw materials
        listing_handler::browse,
        listing_handler::get_listing,
        listing_handler::list_own,
        listing_handler::create_listing,
        listing_handler::update_listing,
        listing_handler::delete_listing,
        // Cart
        cart_handler::get_cart,
        cart_handler::add_to_cart,
        cart_handler::update_cart_item,
        cart_handler::remove_from_cart,
        // Orders
        order_handler::checkout,
        order_handler::list_orders,
        order_handler::record_payment,
        // Seller
        order_handler::seller_orders,
        order_handler::update_seller_order,
        order_handler::dashboard_stats,
        review_handler::seller_reviews,
        // Reviews
        review_handler::list_reviews,
        review_handler::create_review,
        // Recommendations
        recommendation_handler::recommend,
    ),
    components(
        schemas(
            // Users
            RegisterUser,
            LoginUser,
            UpdateProfile,
            UserProfile,
            SellerSummary,
            // Listings
            Listing,
            ListingImage,
            ListingInput,
            ListingSummary,
            ListingWithSeller,
            SortOrder,
            PaginationMeta,
            // Cart
            CartView,
            CartLineView,
            cart_handler::AddToCart,
            cart_handler::UpdateCartItem,
            cart_handler::RemoveFromCart,
            // Orders
            Order,
            OrderItem,
            OrderStatus,
            PaymentStatus,
            PaymentOutcome,
            SellerOrders,
            UpdateOrderStatus,
            DashboardStats,
            // Reviews
            Review,
            ReviewView,
            ReviewDraft,
            ReviewStats,
            RatingBreakdown,
            SellerReviews,
            // Recommendations
            RecommendationRequest,
            Recommendations,
            Recommendation,
            RankedListing,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Vendor registration, login and session"),
        (name = "Profile", description = "Session user's profile"),
        (name = "Raw materials", description = "Public catalogue and owner listing management"),
        (name = "Cart", description = "Session user's cart"),
        (name = "Orders", description = "Checkout and buyer order history"),
        (name = "Seller", description = "Orders, dashboard and reviews for a seller's listings"),
        (name = "Reviews", description = "Listing reviews"),
        (name = "Recommendations", description = "Shopping-list matching")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for the session cookie
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    SESSION_COOKIE_NAME,
                    "Session cookie set by /api/auth/register and /api/auth/login",
                ))),
            );
        }
    }
}
