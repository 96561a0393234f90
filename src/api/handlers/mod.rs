//! HTTP request handlers.

pub mod auth_handler;
pub mod cart_handler;
pub mod listing_handler;
pub mod order_handler;
pub mod recommendation_handler;
pub mod review_handler;
pub mod user_handler;

pub use auth_handler::auth_routes;
pub use cart_handler::cart_routes;
pub use listing_handler::listing_routes;
pub use order_handler::order_routes;
pub use recommendation_handler::recommendation_routes;
pub use review_handler::review_routes;
pub use user_handler::user_routes;
