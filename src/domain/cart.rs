//! Shopping cart aggregate.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::listing::{Listing, ListingSummary};
use crate::errors::{AppError, AppResult};

/// One pending purchase line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub raw_material_id: Uuid,
    pub quantity: i32,
    pub added_at: DateTime<Utc>,
}

/// Per-user cart. The whole item list is persisted on every change.
#[derive(Debug, Clone, PartialEq)]
pub struct Cart {
    pub id: Uuid,
    pub user_id: Uuid,
    pub items: Vec<CartItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    /// Empty cart for a user who has never added anything
    pub fn new(user_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            items: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn line(&self, raw_material_id: Uuid) -> Option<&CartItem> {
        self.items
            .iter()
            .find(|item| item.raw_material_id == raw_material_id)
    }

    /// Add units of a listing, merging with an existing line.
    ///
    /// Stock is checked against the listing as read now; nothing is reserved.
    pub fn add(&mut self, listing: &Listing, quantity: i32) -> AppResult<()> {
        if listing.quantity < quantity {
            return Err(AppError::bad_request("Insufficient quantity available"));
        }

        match self
            .items
            .iter_mut()
            .find(|item| item.raw_material_id == listing.id)
        {
            Some(item) => {
                let combined = item.quantity + quantity;
                if combined > listing.quantity {
                    return Err(AppError::bad_request(
                        "Cannot add more items than available in stock",
                    ));
                }
                item.quantity = combined;
            }
            None => self.items.push(CartItem {
                raw_material_id: listing.id,
                quantity,
                added_at: Utc::now(),
            }),
        }

        self.updated_at = Utc::now();
        Ok(())
    }

    /// Overwrite the quantity of an existing line.
    pub fn set_quantity(&mut self, raw_material_id: Uuid, quantity: i32) -> AppResult<()> {
        let item = self
            .items
            .iter_mut()
            .find(|item| item.raw_material_id == raw_material_id)
            .ok_or_else(|| AppError::not_found("Item not found in cart"))?;

        item.quantity = quantity;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Drop a line; absent lines are ignored.
    pub fn remove(&mut self, raw_material_id: Uuid) {
        self.items
            .retain(|item| item.raw_material_id != raw_material_id);
        self.updated_at = Utc::now();
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.updated_at = Utc::now();
    }

    /// Drop lines whose listing is gone or inactive. Returns whether anything was dropped.
    pub fn prune(&mut self, listings: &HashMap<Uuid, Listing>) -> bool {
        let before = self.items.len();
        self.items.retain(|item| {
            listings
                .get(&item.raw_material_id)
                .is_some_and(|listing| listing.is_active)
        });
        let pruned = self.items.len() != before;
        if pruned {
            self.updated_at = Utc::now();
        }
        pruned
    }

    pub fn listing_ids(&self) -> Vec<Uuid> {
        self.items.iter().map(|item| item.raw_material_id).collect()
    }
}

/// Cart line as returned to the client
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartLineView {
    pub raw_material: ListingSummary,
    pub quantity: i32,
    pub added_at: DateTime<Utc>,
    pub available_quantity: i32,
    pub has_stock_issue: bool,
}

/// Cart with listing details and totals
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub items: Vec<CartLineView>,
    /// Number of lines
    pub total_items: usize,
    pub total_price: f64,
}

impl CartView {
    pub fn empty() -> Self {
        Self {
            id: None,
            items: Vec::new(),
            total_items: 0,
            total_price: 0.0,
        }
    }

    /// Join cart lines with their listings, skipping missing or inactive ones.
    pub fn build(cart: &Cart, listings: &HashMap<Uuid, Listing>) -> Self {
        let items: Vec<CartLineView> = cart
            .items
            .iter()
            .filter_map(|item| {
                let listing = listings
                    .get(&item.raw_material_id)
                    .filter(|listing| listing.is_active)?;
                Some(CartLineView {
                    raw_material: listing.summary(),
                    quantity: item.quantity,
                    added_at: item.added_at,
                    available_quantity: listing.quantity,
                    has_stock_issue: item.quantity > listing.quantity,
                })
            })
            .collect();

        let total_price = items
            .iter()
            .map(|line| line.raw_material.price * f64::from(line.quantity))
            .sum();

        Self {
            id: Some(cart.id),
            total_items: items.len(),
            total_price,
            items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(price: f64, stock: i32) -> Listing {
        let now = Utc::now();
        Listing {
            id: Uuid::new_v4(),
            name: "Jute".to_string(),
            description: "Raw jute fibre".to_string(),
            price,
            original_price: None,
            discount: 0,
            quantity: stock,
            category: "Fibres".to_string(),
            subcategory: None,
            features: vec![],
            tags: vec![],
            images: vec![],
            main_image: None,
            ratings: 0.0,
            num_reviews: 0,
            created_by: Uuid::new_v4(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_add_new_line() {
        let jute = listing(10.0, 5);
        let mut cart = Cart::new(Uuid::new_v4());

        cart.add(&jute, 2).unwrap();

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.line(jute.id).unwrap().quantity, 2);
    }

    #[test]
    fn test_add_merges_existing_line() {
        let jute = listing(10.0, 5);
        let mut cart = Cart::new(Uuid::new_v4());

        cart.add(&jute, 2).unwrap();
        cart.add(&jute, 3).unwrap();

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.line(jute.id).unwrap().quantity, 5);
    }

    #[test]
    fn test_add_above_stock_rejected() {
        let jute = listing(10.0, 5);
        let mut cart = Cart::new(Uuid::new_v4());

        let err = cart.add(&jute, 6).unwrap_err();
        assert_eq!(err.to_string(), "Insufficient quantity available");
        assert!(cart.is_empty());
    }

    #[test]
    fn test_combined_quantity_above_stock_rejected() {
        let jute = listing(10.0, 5);
        let mut cart = Cart::new(Uuid::new_v4());
        cart.add(&jute, 4).unwrap();

        let err = cart.add(&jute, 2).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Cannot add more items than available in stock"
        );
        assert_eq!(cart.line(jute.id).unwrap().quantity, 4);
    }

    #[test]
    fn test_set_quantity_missing_line() {
        let mut cart = Cart::new(Uuid::new_v4());
        let err = cart.set_quantity(Uuid::new_v4(), 1).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_remove_is_idempotent() {
        let jute = listing(10.0, 5);
        let mut cart = Cart::new(Uuid::new_v4());
        cart.add(&jute, 1).unwrap();

        cart.remove(jute.id);
        cart.remove(jute.id);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_view_totals_and_stock_issue() {
        let jute = listing(10.0, 5);
        let cotton = listing(2.5, 100);
        let mut cart = Cart::new(Uuid::new_v4());
        cart.add(&jute, 4).unwrap();
        cart.add(&cotton, 10).unwrap();

        let mut shrunk = jute.clone();
        shrunk.quantity = 3;
        let listings = HashMap::from([(jute.id, shrunk), (cotton.id, cotton.clone())]);

        let view = CartView::build(&cart, &listings);
        assert_eq!(view.total_items, 2);
        assert_eq!(view.total_price, 65.0);
        assert!(view.items[0].has_stock_issue);
        assert_eq!(view.items[0].available_quantity, 3);
        assert!(!view.items[1].has_stock_issue);
    }

    #[test]
    fn test_prune_drops_missing_and_inactive() {
        let jute = listing(10.0, 5);
        let mut retired = listing(1.0, 5);
        let gone = listing(1.0, 5);
        let mut cart = Cart::new(Uuid::new_v4());
        cart.add(&jute, 1).unwrap();
        cart.add(&retired, 1).unwrap();
        cart.add(&gone, 1).unwrap();
        retired.is_active = false;

        let listings = HashMap::from([(jute.id, jute.clone()), (retired.id, retired)]);

        assert!(cart.prune(&listings));
        assert_eq!(cart.listing_ids(), vec![jute.id]);
        assert!(!cart.prune(&listings));
    }
}
