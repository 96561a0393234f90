//! Test doubles shared by the service unit tests.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::{Listing, Password, User};
use crate::infra::{
    CartRepository, ListingRepository, MockCartRepository, MockListingRepository,
    MockOrderRepository, MockReviewRepository, MockUserRepository, OrderRepository,
    ReviewRepository, UnitOfWork, UserRepository,
};

/// Repository mocks to be configured before building the unit of work.
///
/// Any repository left unconfigured panics if a service touches it.
#[derive(Default)]
pub(crate) struct Repos {
    pub users: MockUserRepository,
    pub listings: MockListingRepository,
    pub carts: MockCartRepository,
    pub orders: MockOrderRepository,
    pub reviews: MockReviewRepository,
}

impl Repos {
    pub fn into_uow(self) -> Arc<TestUnitOfWork> {
        Arc::new(TestUnitOfWork {
            users: Arc::new(self.users),
            listings: Arc::new(self.listings),
            carts: Arc::new(self.carts),
            orders: Arc::new(self.orders),
            reviews: Arc::new(self.reviews),
        })
    }
}

/// Unit of work backed by repository mocks
pub(crate) struct TestUnitOfWork {
    users: Arc<MockUserRepository>,
    listings: Arc<MockListingRepository>,
    carts: Arc<MockCartRepository>,
    orders: Arc<MockOrderRepository>,
    reviews: Arc<MockReviewRepository>,
}

impl UnitOfWork for TestUnitOfWork {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.users.clone()
    }

    fn listings(&self) -> Arc<dyn ListingRepository> {
        self.listings.clone()
    }

    fn carts(&self) -> Arc<dyn CartRepository> {
        self.carts.clone()
    }

    fn orders(&self) -> Arc<dyn OrderRepository> {
        self.orders.clone()
    }

    fn reviews(&self) -> Arc<dyn ReviewRepository> {
        self.reviews.clone()
    }
}

pub(crate) fn user(id: Uuid, email: &str, password: &str) -> User {
    let now = Utc::now();
    User {
        id,
        name: "Green Stall".to_string(),
        email: email.to_string(),
        password_hash: Password::new(password)
            .map(|p| p.as_str().to_string())
            .unwrap_or_default(),
        phone: None,
        stall_address: None,
        profile_picture: None,
        last_login: None,
        created_at: now,
        updated_at: now,
    }
}

pub(crate) fn listing(owner: Uuid, name: &str, price: f64, stock: i32) -> Listing {
    let now = Utc::now();
    Listing {
        id: Uuid::new_v4(),
        name: name.to_string(),
        description: format!("Fresh {name}"),
        price,
        original_price: None,
        discount: 0,
        quantity: stock,
        category: "grains".to_string(),
        subcategory: None,
        features: Vec::new(),
        tags: Vec::new(),
        images: Vec::new(),
        main_image: None,
        ratings: 0.0,
        num_reviews: 0,
        created_by: owner,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}
