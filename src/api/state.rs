//! Application state - Dependency injection container.
//!
//! Provides centralized access to all application services and infrastructure.

use std::sync::Arc;

use crate::config::Config;
use crate::infra::Database;
use crate::services::{
    AuthService, CartService, ListingService, OrderService, RecommendationService,
    ReviewService, ServiceContainer, Services, UserService,
};

/// Cookie and upload settings the handlers need at request time
#[derive(Clone, Debug)]
pub struct HttpSettings {
    /// Mark the session cookie `Secure`
    pub cookie_secure: bool,
    /// Request body limit, in bytes
    pub max_upload_bytes: usize,
}

impl From<&Config> for HttpSettings {
    fn from(config: &Config) -> Self {
        Self {
            cookie_secure: config.cookie_secure,
            max_upload_bytes: config.max_upload_bytes,
        }
    }
}

/// Application state containing all services (DI container).
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthService>,
    pub user_service: Arc<dyn UserService>,
    pub listing_service: Arc<dyn ListingService>,
    pub cart_service: Arc<dyn CartService>,
    pub order_service: Arc<dyn OrderService>,
    pub review_service: Arc<dyn ReviewService>,
    pub recommendation_service: Arc<dyn RecommendationService>,
    /// Database connection (health checks)
    pub database: Arc<Database>,
    pub settings: HttpSettings,
}

impl AppState {
    /// Create application state from a connected database and config.
    pub fn from_config(database: Arc<Database>, config: &Config) -> Self {
        let container = Services::from_connection(database.get_connection());
        Self::from_container(&container, database, HttpSettings::from(config))
    }

    /// Create application state from any service container.
    pub fn from_container(
        container: &dyn ServiceContainer,
        database: Arc<Database>,
        settings: HttpSettings,
    ) -> Self {
        Self {
            auth_service: container.auth(),
            user_service: container.users(),
            listing_service: container.listings(),
            cart_service: container.carts(),
            order_service: container.orders(),
            review_service: container.reviews(),
            recommendation_service: container.recommendations(),
            database,
            settings,
        }
    }
}
