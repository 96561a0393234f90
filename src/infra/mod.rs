//! Infrastructure layer - External systems integration
//!
//! This module handles all external system concerns:
//! - Database connection and migrations
//! - Repositories over SeaORM entities
//! - Unit of Work for repository access and transactions

pub mod db;
pub mod repositories;
pub mod unit_of_work;

pub use db::{Database, Migrator};
pub use repositories::{
    CartRepository, CartStore, ListingRepository, ListingStore, OrderRepository, OrderStore,
    ReviewRepository, ReviewStore, UserRepository, UserStore,
};
pub use unit_of_work::{Persistence, UnitOfWork};

#[cfg(any(test, feature = "test-utils"))]
pub use repositories::{
    MockCartRepository, MockListingRepository, MockOrderRepository, MockReviewRepository,
    MockUserRepository,
};
