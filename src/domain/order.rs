//! Orders: checkout snapshot, status values and seller-side views.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::cart::Cart;
use super::listing::Listing;
use crate::config::{
    ORDER_STATUS_DELIVERED, ORDER_STATUS_PAYMENT_FAILED, ORDER_STATUS_PROCESSING,
    PAYMENT_STATUS_COMPLETED, PAYMENT_STATUS_FAILED, PAYMENT_STATUS_PENDING,
};
use crate::errors::{AppError, AppResult};

/// Fulfilment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum OrderStatus {
    #[serde(rename = "processing")]
    Processing,
    #[serde(rename = "delivered")]
    Delivered,
    #[serde(rename = "payment failed")]
    PaymentFailed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Processing => ORDER_STATUS_PROCESSING,
            OrderStatus::Delivered => ORDER_STATUS_DELIVERED,
            OrderStatus::PaymentFailed => ORDER_STATUS_PAYMENT_FAILED,
        }
    }

    /// Parse a stored or submitted status; unknown values yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            ORDER_STATUS_PROCESSING => Some(OrderStatus::Processing),
            ORDER_STATUS_DELIVERED => Some(OrderStatus::Delivered),
            ORDER_STATUS_PAYMENT_FAILED => Some(OrderStatus::PaymentFailed),
            _ => None,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => PAYMENT_STATUS_PENDING,
            PaymentStatus::Completed => PAYMENT_STATUS_COMPLETED,
            PaymentStatus::Failed => PAYMENT_STATUS_FAILED,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            PAYMENT_STATUS_PENDING => Some(PaymentStatus::Pending),
            PAYMENT_STATUS_COMPLETED => Some(PaymentStatus::Completed),
            PAYMENT_STATUS_FAILED => Some(PaymentStatus::Failed),
            _ => None,
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable order line; `price` is the unit price at purchase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub raw_material_id: Uuid,
    pub quantity: i32,
    pub price: f64,
}

impl OrderItem {
    pub fn line_total(&self) -> f64 {
        f64::from(self.quantity) * self.price
    }
}

/// Order domain entity
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub items: Vec<OrderItem>,
    pub total_amount: f64,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn references_any(&self, listing_ids: &[Uuid]) -> bool {
        self.items
            .iter()
            .any(|item| listing_ids.contains(&item.raw_material_id))
    }
}

/// Order about to be placed from a cart
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub user_id: Uuid,
    pub items: Vec<OrderItem>,
    pub total_amount: f64,
}

impl NewOrder {
    /// Snapshot a cart into order lines at current listing prices.
    ///
    /// Every line must still be purchasable in the requested quantity.
    pub fn checkout(cart: &Cart, listings: &HashMap<Uuid, Listing>) -> AppResult<Self> {
        if cart.is_empty() {
            return Err(AppError::bad_request("Cart is empty"));
        }

        let mut items = Vec::with_capacity(cart.items.len());
        for line in &cart.items {
            let listing = listings
                .get(&line.raw_material_id)
                .filter(|listing| listing.is_active)
                .ok_or_else(|| {
                    AppError::bad_request("A raw material in your cart is no longer available")
                })?;
            if line.quantity > listing.quantity {
                return Err(AppError::bad_request(format!(
                    "Insufficient quantity available for {}",
                    listing.name
                )));
            }
            items.push(OrderItem {
                raw_material_id: listing.id,
                quantity: line.quantity,
                price: listing.price,
            });
        }

        let total_amount = items.iter().map(OrderItem::line_total).sum();
        Ok(Self {
            user_id: cart.user_id,
            items,
            total_amount,
        })
    }
}

/// A single order line joined with its order's statuses
#[derive(Debug, Clone, PartialEq)]
pub struct SellerLine {
    pub order_id: Uuid,
    pub raw_material_id: Uuid,
    pub quantity: i32,
    pub price: f64,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
}

impl SellerLine {
    pub fn line_total(&self) -> f64 {
        f64::from(self.quantity) * self.price
    }
}

/// Orders touching a seller's listings
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SellerOrders {
    pub orders: Vec<Order>,
    pub total_materials: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Seller request to move an order to a new status
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderStatus {
    #[validate(required(message = "Order ID and status are required"))]
    pub order_id: Option<Uuid>,
    #[validate(required(message = "Order ID and status are required"))]
    #[schema(example = "delivered")]
    pub status: Option<String>,
}

/// Payment outcome reported for a buyer's order
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct PaymentOutcome {
    #[schema(example = "completed")]
    pub status: PaymentStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(name: &str, price: f64, stock: i32) -> Listing {
        let now = Utc::now();
        Listing {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: String::new(),
            price,
            original_price: None,
            discount: 0,
            quantity: stock,
            category: "Grains".to_string(),
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
    fn test_status_wire_values() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::PaymentFailed).unwrap(),
            "\"payment failed\""
        );
        assert_eq!(OrderStatus::parse("delivered"), Some(OrderStatus::Delivered));
        assert_eq!(OrderStatus::parse("shipped"), None);
        assert_eq!(PaymentStatus::parse("completed"), Some(PaymentStatus::Completed));
        assert_eq!(PaymentStatus::Failed.to_string(), "failed");
    }

    #[test]
    fn test_checkout_snapshots_prices() {
        let rice = listing("Rice", 50.0, 10);
        let dal = listing("Dal", 80.0, 10);
        let mut cart = Cart::new(Uuid::new_v4());
        cart.add(&rice, 2).unwrap();
        cart.add(&dal, 1).unwrap();
        let listings = HashMap::from([(rice.id, rice.clone()), (dal.id, dal.clone())]);

        let order = NewOrder::checkout(&cart, &listings).unwrap();

        assert_eq!(order.user_id, cart.user_id);
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.items[0].price, 50.0);
        assert_eq!(order.total_amount, 180.0);
    }

    #[test]
    fn test_checkout_empty_cart() {
        let cart = Cart::new(Uuid::new_v4());
        let err = NewOrder::checkout(&cart, &HashMap::new()).unwrap_err();
        assert_eq!(err.to_string(), "Cart is empty");
    }

    #[test]
    fn test_checkout_stock_shortfall() {
        let rice = listing("Rice", 50.0, 10);
        let mut cart = Cart::new(Uuid::new_v4());
        cart.add(&rice, 5).unwrap();
        let mut depleted = rice.clone();
        depleted.quantity = 2;
        let listings = HashMap::from([(rice.id, depleted)]);

        let err = NewOrder::checkout(&cart, &listings).unwrap_err();
        assert_eq!(err.to_string(), "Insufficient quantity available for Rice");
    }

    #[test]
    fn test_update_status_requires_both_fields() {
        let request: UpdateOrderStatus =
            serde_json::from_str(r#"{"status":"delivered"}"#).unwrap();
        assert!(request.validate().is_err());
    }
}
