//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure to fulfill
//! application use cases. They depend on abstractions (traits) for
//! dependency inversion.
//!
//! All services reach the database through the Unit of Work.

mod auth_service;
mod cart_service;
pub mod container;
mod listing_service;
mod order_service;
mod recommendation_service;
mod review_service;
mod user_service;

#[cfg(test)]
pub(crate) mod test_support;

// Service Container
pub use container::{ServiceContainer, Services};

// Service traits and implementations
pub use auth_service::{AuthService, Authenticator};
pub use cart_service::{CartManager, CartService};
pub use listing_service::{ListingManager, ListingService};
pub use order_service::{OrderManager, OrderService};
pub use recommendation_service::{RecommendationService, Recommender};
pub use review_service::{ReviewManager, ReviewService};
pub use user_service::{UserManager, UserService};

#[cfg(any(test, feature = "test-utils"))]
pub use auth_service::MockAuthService;
#[cfg(any(test, feature = "test-utils"))]
pub use cart_service::MockCartService;
#[cfg(any(test, feature = "test-utils"))]
pub use container::MockServiceContainer;
#[cfg(any(test, feature = "test-utils"))]
pub use listing_service::MockListingService;
#[cfg(any(test, feature = "test-utils"))]
pub use order_service::MockOrderService;
#[cfg(any(test, feature = "test-utils"))]
pub use recommendation_service::MockRecommendationService;
#[cfg(any(test, feature = "test-utils"))]
pub use review_service::MockReviewService;
#[cfg(any(test, feature = "test-utils"))]
pub use user_service::MockUserService;
