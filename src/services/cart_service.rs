//! Cart service - read-modify-write of the session user's cart.
//!
//! Stock is checked against the listing as read at request time. Nothing is
//! reserved, so two concurrent adds can both pass the check.

use std::collections::HashMap;

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{Cart, CartView, Listing};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Cart service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CartService: Send + Sync {
    /// Current cart; lines for vanished listings are dropped and persisted
    async fn get_cart(&self, user_id: Uuid) -> AppResult<CartView>;

    /// Add units of a listing, creating the cart on first use
    async fn add_item(&self, user_id: Uuid, raw_material_id: Uuid, quantity: i32)
        -> AppResult<CartView>;

    /// Overwrite the quantity of a line already in the cart
    async fn update_item(
        &self,
        user_id: Uuid,
        raw_material_id: Uuid,
        quantity: i32,
    ) -> AppResult<CartView>;

    async fn remove_item(&self, user_id: Uuid, raw_material_id: Uuid) -> AppResult<CartView>;
}

/// Concrete implementation of CartService using Unit of Work.
pub struct CartManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> CartManager<U> {
    /// Create new cart service instance with Unit of Work
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    async fn listings_for(&self, cart: &Cart) -> AppResult<HashMap<Uuid, Listing>> {
        if cart.is_empty() {
            return Ok(HashMap::new());
        }
        let listings = self.uow.listings().find_by_ids(cart.listing_ids()).await?;
        Ok(listings.into_iter().map(|l| (l.id, l)).collect())
    }

    async fn existing_cart(&self, user_id: Uuid) -> AppResult<Cart> {
        self.uow
            .carts()
            .find_by_user(user_id)
            .await?
            .ok_or_not_found("Cart not found")
    }

    async fn active_listing(&self, id: Uuid) -> AppResult<Option<Listing>> {
        Ok(self
            .uow
            .listings()
            .find_by_id(id)
            .await?
            .filter(|listing| listing.is_active))
    }

    async fn save_and_view(&self, cart: Cart) -> AppResult<CartView> {
        let cart = self.uow.carts().save(cart).await?;
        let listings = self.listings_for(&cart).await?;
        Ok(CartView::build(&cart, &listings))
    }
}

#[async_trait]
impl<U: UnitOfWork> CartService for CartManager<U> {
    async fn get_cart(&self, user_id: Uuid) -> AppResult<CartView> {
        let Some(mut cart) = self.uow.carts().find_by_user(user_id).await? else {
            return Ok(CartView::empty());
        };

        let listings = self.listings_for(&cart).await?;
        if cart.prune(&listings) {
            tracing::debug!(cart_id = %cart.id, "Dropped unavailable cart lines");
            cart = self.uow.carts().save(cart).await?;
        }

        Ok(CartView::build(&cart, &listings))
    }

    async fn add_item(
        &self,
        user_id: Uuid,
        raw_material_id: Uuid,
        quantity: i32,
    ) -> AppResult<CartView> {
        let listing = self
            .active_listing(raw_material_id)
            .await?
            .ok_or_not_found("Raw material not found or no longer available")?;

        let mut cart = self
            .uow
            .carts()
            .find_by_user(user_id)
            .await?
            .unwrap_or_else(|| Cart::new(user_id));

        if let Err(err) = cart.add(&listing, quantity) {
            tracing::warn!(
                %user_id,
                %raw_material_id,
                requested = quantity,
                in_stock = listing.quantity,
                "Add to cart rejected"
            );
            return Err(err);
        }

        self.save_and_view(cart).await
    }

    async fn update_item(
        &self,
        user_id: Uuid,
        raw_material_id: Uuid,
        quantity: i32,
    ) -> AppResult<CartView> {
        let mut cart = self.existing_cart(user_id).await?;
        if cart.line(raw_material_id).is_none() {
            return Err(AppError::not_found("Item not found in cart"));
        }

        let available = self
            .active_listing(raw_material_id)
            .await?
            .is_some_and(|listing| quantity <= listing.quantity);
        if !available {
            tracing::warn!(%user_id, %raw_material_id, requested = quantity, "Cart update rejected");
            return Err(AppError::bad_request("Insufficient quantity available"));
        }

        cart.set_quantity(raw_material_id, quantity)?;
        self.save_and_view(cart).await
    }

    async fn remove_item(&self, user_id: Uuid, raw_material_id: Uuid) -> AppResult<CartView> {
        let mut cart = self.existing_cart(user_id).await?;
        cart.remove(raw_material_id);
        self.save_and_view(cart).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CartItem;
    use crate::services::test_support::{listing, Repos};
    use chrono::Utc;

    fn cart_with(user_id: Uuid, lines: &[(Uuid, i32)]) -> Cart {
        let mut cart = Cart::new(user_id);
        cart.items = lines
            .iter()
            .map(|(id, quantity)| CartItem {
                raw_material_id: *id,
                quantity: *quantity,
                added_at: Utc::now(),
            })
            .collect();
        cart
    }

    #[tokio::test]
    async fn test_get_cart_without_cart_is_empty() {
        let mut repos = Repos::default();
        repos.carts.expect_find_by_user().returning(|_| Ok(None));

        let service = CartManager::new(repos.into_uow());
        let view = service.get_cart(Uuid::new_v4()).await.unwrap();

        assert!(view.items.is_empty());
        assert_eq!(view.total_price, 0.0);
    }

    #[tokio::test]
    async fn test_get_cart_prunes_and_persists_missing_lines() {
        let user_id = Uuid::new_v4();
        let rice = listing(Uuid::new_v4(), "Rice", 50.0, 10);
        let gone = Uuid::new_v4();
        let cart = cart_with(user_id, &[(rice.id, 2), (gone, 1)]);

        let mut repos = Repos::default();
        repos
            .carts
            .expect_find_by_user()
            .returning(move |_| Ok(Some(cart.clone())));
        let found = rice.clone();
        repos
            .listings
            .expect_find_by_ids()
            .returning(move |_| Ok(vec![found.clone()]));
        repos
            .carts
            .expect_save()
            .withf(|saved| saved.items.len() == 1)
            .times(1)
            .returning(Ok);

        let service = CartManager::new(repos.into_uow());
        let view = service.get_cart(user_id).await.unwrap();

        assert_eq!(view.total_items, 1);
        assert_eq!(view.total_price, 100.0);
    }

    #[tokio::test]
    async fn test_get_cart_flags_stock_issue_without_saving() {
        let user_id = Uuid::new_v4();
        let rice = listing(Uuid::new_v4(), "Rice", 50.0, 1);
        let cart = cart_with(user_id, &[(rice.id, 3)]);

        let mut repos = Repos::default();
        repos
            .carts
            .expect_find_by_user()
            .returning(move |_| Ok(Some(cart.clone())));
        repos
            .listings
            .expect_find_by_ids()
            .returning(move |_| Ok(vec![rice.clone()]));
        repos.carts.expect_save().never();

        let service = CartManager::new(repos.into_uow());
        let view = service.get_cart(user_id).await.unwrap();

        assert!(view.items[0].has_stock_issue);
        assert_eq!(view.items[0].available_quantity, 1);
    }

    #[tokio::test]
    async fn test_add_item_above_stock_is_rejected() {
        let rice = listing(Uuid::new_v4(), "Rice", 50.0, 2);
        let rice_id = rice.id;

        let mut repos = Repos::default();
        repos
            .listings
            .expect_find_by_id()
            .returning(move |_| Ok(Some(rice.clone())));
        repos.carts.expect_find_by_user().returning(|_| Ok(None));
        repos.carts.expect_save().never();

        let service = CartManager::new(repos.into_uow());
        let err = service
            .add_item(Uuid::new_v4(), rice_id, 3)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Insufficient quantity available");
    }

    #[tokio::test]
    async fn test_add_item_combined_quantity_above_stock_is_rejected() {
        let user_id = Uuid::new_v4();
        let rice = listing(Uuid::new_v4(), "Rice", 50.0, 5);
        let cart = cart_with(user_id, &[(rice.id, 4)]);
        let rice_id = rice.id;

        let mut repos = Repos::default();
        repos
            .listings
            .expect_find_by_id()
            .returning(move |_| Ok(Some(rice.clone())));
        repos
            .carts
            .expect_find_by_user()
            .returning(move |_| Ok(Some(cart.clone())));
        repos.carts.expect_save().never();

        let service = CartManager::new(repos.into_uow());
        let err = service.add_item(user_id, rice_id, 2).await.unwrap_err();

        assert_eq!(
            err.to_string(),
            "Cannot add more items than available in stock"
        );
    }

    #[tokio::test]
    async fn test_add_item_creates_cart_on_first_use() {
        let user_id = Uuid::new_v4();
        let rice = listing(Uuid::new_v4(), "Rice", 50.0, 5);
        let rice_id = rice.id;

        let mut repos = Repos::default();
        let lookup = rice.clone();
        repos
            .listings
            .expect_find_by_id()
            .returning(move |_| Ok(Some(lookup.clone())));
        repos.carts.expect_find_by_user().returning(|_| Ok(None));
        repos
            .carts
            .expect_save()
            .withf(move |saved| saved.user_id == user_id && saved.items.len() == 1)
            .returning(Ok);
        repos
            .listings
            .expect_find_by_ids()
            .returning(move |_| Ok(vec![rice.clone()]));

        let service = CartManager::new(repos.into_uow());
        let view = service.add_item(user_id, rice_id, 2).await.unwrap();

        assert_eq!(view.items[0].quantity, 2);
        assert_eq!(view.total_price, 100.0);
    }

    #[tokio::test]
    async fn test_add_item_inactive_listing_is_not_found() {
        let mut inactive = listing(Uuid::new_v4(), "Rice", 50.0, 5);
        inactive.is_active = false;

        let mut repos = Repos::default();
        repos
            .listings
            .expect_find_by_id()
            .returning(move |_| Ok(Some(inactive.clone())));

        let service = CartManager::new(repos.into_uow());
        let result = service.add_item(Uuid::new_v4(), Uuid::new_v4(), 1).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_item_missing_cart() {
        let mut repos = Repos::default();
        repos.carts.expect_find_by_user().returning(|_| Ok(None));

        let service = CartManager::new(repos.into_uow());
        let err = service
            .update_item(Uuid::new_v4(), Uuid::new_v4(), 1)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Cart not found");
    }

    #[tokio::test]
    async fn test_update_item_absent_line() {
        let user_id = Uuid::new_v4();
        let cart = cart_with(user_id, &[(Uuid::new_v4(), 1)]);

        let mut repos = Repos::default();
        repos
            .carts
            .expect_find_by_user()
            .returning(move |_| Ok(Some(cart.clone())));

        let service = CartManager::new(repos.into_uow());
        let err = service
            .update_item(user_id, Uuid::new_v4(), 1)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Item not found in cart");
    }

    #[tokio::test]
    async fn test_update_item_above_stock_is_rejected() {
        let user_id = Uuid::new_v4();
        let rice = listing(Uuid::new_v4(), "Rice", 50.0, 3);
        let rice_id = rice.id;
        let cart = cart_with(user_id, &[(rice_id, 1)]);

        let mut repos = Repos::default();
        repos
            .carts
            .expect_find_by_user()
            .returning(move |_| Ok(Some(cart.clone())));
        repos
            .listings
            .expect_find_by_id()
            .returning(move |_| Ok(Some(rice.clone())));
        repos.carts.expect_save().never();

        let service = CartManager::new(repos.into_uow());
        let result = service.update_item(user_id, rice_id, 4).await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_remove_item_absent_line_is_noop() {
        let user_id = Uuid::new_v4();
        let rice = listing(Uuid::new_v4(), "Rice", 50.0, 3);
        let cart = cart_with(user_id, &[(rice.id, 1)]);

        let mut repos = Repos::default();
        repos
            .carts
            .expect_find_by_user()
            .returning(move |_| Ok(Some(cart.clone())));
        repos.carts.expect_save().returning(Ok);
        repos
            .listings
            .expect_find_by_ids()
            .returning(move |_| Ok(vec![rice.clone()]));

        let service = CartManager::new(repos.into_uow());
        let view = service.remove_item(user_id, Uuid::new_v4()).await.unwrap();

        assert_eq!(view.total_items, 1);
    }
}
