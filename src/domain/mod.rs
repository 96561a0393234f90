//! Domain layer - Core business entities and logic
//!
//! Entities, value objects and the pure rules of the marketplace
//! (cart arithmetic, checkout, dashboard aggregation, review stats,
//! recommendation ranking). Nothing here touches the database.

pub mod cart;
pub mod dashboard;
pub mod listing;
pub mod order;
pub mod password;
pub mod recommendation;
pub mod review;
pub mod user;

pub use cart::{Cart, CartItem, CartLineView, CartView};
pub use dashboard::DashboardStats;
pub use listing::{
    Listing, ListingDraft, ListingFilter, ListingImage, ListingInput, ListingSummary,
    ListingWithSeller, SortOrder,
};
pub use order::{
    NewOrder, Order, OrderItem, OrderStatus, PaymentOutcome, PaymentStatus, SellerLine,
    SellerOrders, UpdateOrderStatus,
};
pub use password::Password;
pub use recommendation::{RankedListing, Recommendation, RecommendationRequest, Recommendations};
pub use review::{
    NewReview, RatingBreakdown, Review, ReviewDraft, ReviewStats, ReviewView, SellerReviews,
};
pub use user::{
    normalize_email, LoginUser, NewUser, RegisterUser, SellerSummary, UpdateProfile, User,
    UserProfile,
};
