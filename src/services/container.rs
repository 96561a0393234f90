//! Service Container - Centralized service access.
//!
//! Builds every service over one shared unit of work and hands them out
//! as trait objects.

use std::sync::Arc;

use super::{
    AuthService, CartService, ListingService, OrderService, RecommendationService,
    ReviewService, UserService,
};
use crate::infra::Persistence;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Service container trait for dependency injection.
///
/// Provides centralized access to all application services.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait ServiceContainer: Send + Sync {
    /// Get authentication service
    fn auth(&self) -> Arc<dyn AuthService>;

    /// Get user service
    fn users(&self) -> Arc<dyn UserService>;

    fn listings(&self) -> Arc<dyn ListingService>;

    fn carts(&self) -> Arc<dyn CartService>;

    fn orders(&self) -> Arc<dyn OrderService>;

    fn reviews(&self) -> Arc<dyn ReviewService>;

    fn recommendations(&self) -> Arc<dyn RecommendationService>;
}

/// Concrete implementation of ServiceContainer
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    user_service: Arc<dyn UserService>,
    listing_service: Arc<dyn ListingService>,
    cart_service: Arc<dyn CartService>,
    order_service: Arc<dyn OrderService>,
    review_service: Arc<dyn ReviewService>,
    recommendation_service: Arc<dyn RecommendationService>,
}

impl Services {
    /// Create a new service container from already built services
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        user_service: Arc<dyn UserService>,
        listing_service: Arc<dyn ListingService>,
        cart_service: Arc<dyn CartService>,
        order_service: Arc<dyn OrderService>,
        review_service: Arc<dyn ReviewService>,
        recommendation_service: Arc<dyn RecommendationService>,
    ) -> Self {
        Self {
            auth_service,
            user_service,
            listing_service,
            cart_service,
            order_service,
            review_service,
            recommendation_service,
        }
    }

    /// Create service container from a database connection
    pub fn from_connection(db: sea_orm::DatabaseConnection) -> Self {
        use super::{
            Authenticator, CartManager, ListingManager, OrderManager, Recommender,
            ReviewManager, UserManager,
        };

        let uow = Arc::new(Persistence::new(db));

        Self {
            auth_service: Arc::new(Authenticator::new(uow.clone())),
            user_service: Arc::new(UserManager::new(uow.clone())),
            listing_service: Arc::new(ListingManager::new(uow.clone())),
            cart_service: Arc::new(CartManager::new(uow.clone())),
            order_service: Arc::new(OrderManager::new(uow.clone())),
            review_service: Arc::new(ReviewManager::new(uow.clone())),
            recommendation_service: Arc::new(Recommender::new(uow)),
        }
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn users(&self) -> Arc<dyn UserService> {
        self.user_service.clone()
    }

    fn listings(&self) -> Arc<dyn ListingService> {
        self.listing_service.clone()
    }

    fn carts(&self) -> Arc<dyn CartService> {
        self.cart_service.clone()
    }

    fn orders(&self) -> Arc<dyn OrderService> {
        self.order_service.clone()
    }

    fn reviews(&self) -> Arc<dyn ReviewService> {
        self.review_service.clone()
    }

    fn recommendations(&self) -> Arc<dyn RecommendationService> {
        self.recommendation_service.clone()
    }
}
