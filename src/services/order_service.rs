//! Order service - checkout, buyer history, seller fulfilment and dashboard.

use std::collections::HashMap;

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::VALID_ORDER_STATUSES;
use crate::domain::{
    DashboardStats, Listing, NewOrder, Order, OrderStatus, PaymentStatus, SellerOrders,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Order service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait OrderService: Send + Sync {
    /// Turn the buyer's cart into an order and empty the cart
    async fn checkout(&self, user_id: Uuid) -> AppResult<Order>;

    /// The buyer's orders, newest first
    async fn list_mine(&self, user_id: Uuid) -> AppResult<Vec<Order>>;

    /// Record the payment outcome of one of the buyer's orders
    async fn record_payment(
        &self,
        user_id: Uuid,
        order_id: Uuid,
        outcome: PaymentStatus,
    ) -> AppResult<Order>;

    /// Orders containing any of the seller's listings
    async fn seller_orders(&self, seller_id: Uuid) -> AppResult<SellerOrders>;

    /// Move an order containing one of the seller's listings to a new status
    async fn update_seller_status(
        &self,
        seller_id: Uuid,
        order_id: Uuid,
        status: String,
    ) -> AppResult<Order>;

    async fn dashboard_stats(&self, seller_id: Uuid) -> AppResult<DashboardStats>;
}

/// Concrete implementation of OrderService using Unit of Work.
pub struct OrderManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> OrderManager<U> {
    /// Create new order service instance with Unit of Work
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> OrderService for OrderManager<U> {
    async fn checkout(&self, user_id: Uuid) -> AppResult<Order> {
        let cart = self
            .uow
            .carts()
            .find_by_user(user_id)
            .await?
            .filter(|cart| !cart.is_empty())
            .ok_or_else(|| AppError::bad_request("Cart is empty"))?;

        let listings: HashMap<Uuid, Listing> = self
            .uow
            .listings()
            .find_by_ids(cart.listing_ids())
            .await?
            .into_iter()
            .map(|listing| (listing.id, listing))
            .collect();

        let new_order = NewOrder::checkout(&cart, &listings)?;
        let order = self.uow.orders().place(new_order).await?;

        tracing::info!(
            order_id = %order.id,
            %user_id,
            total = order.total_amount,
            "Order placed"
        );
        Ok(order)
    }

    async fn list_mine(&self, user_id: Uuid) -> AppResult<Vec<Order>> {
        self.uow.orders().list_by_user(user_id).await
    }

    async fn record_payment(
        &self,
        user_id: Uuid,
        order_id: Uuid,
        outcome: PaymentStatus,
    ) -> AppResult<Order> {
        self.uow
            .orders()
            .find_by_id(order_id)
            .await?
            .filter(|order| order.user_id == user_id)
            .ok_or_not_found("Order not found")?;

        let status = match outcome {
            PaymentStatus::Failed => Some(OrderStatus::PaymentFailed),
            PaymentStatus::Completed | PaymentStatus::Pending => None,
        };

        tracing::info!(%order_id, payment_status = %outcome, "Payment outcome recorded");
        self.uow
            .orders()
            .update_payment(order_id, outcome, status)
            .await
    }

    async fn seller_orders(&self, seller_id: Uuid) -> AppResult<SellerOrders> {
        let listing_ids = self.uow.listings().ids_by_owner(seller_id).await?;
        if listing_ids.is_empty() {
            return Ok(SellerOrders {
                orders: Vec::new(),
                total_materials: 0,
                message: Some("No materials found".to_string()),
            });
        }

        let total_materials = listing_ids.len() as u64;
        let orders = self.uow.orders().list_containing(listing_ids).await?;

        Ok(SellerOrders {
            orders,
            total_materials,
            message: None,
        })
    }

    async fn update_seller_status(
        &self,
        seller_id: Uuid,
        order_id: Uuid,
        status: String,
    ) -> AppResult<Order> {
        let status = OrderStatus::parse(&status).ok_or_else(|| {
            AppError::validation(format!(
                "Invalid status. Must be one of: {}",
                VALID_ORDER_STATUSES.join(", ")
            ))
        })?;

        let order = self
            .uow
            .orders()
            .find_by_id(order_id)
            .await?
            .ok_or_not_found("Order not found")?;

        let listing_ids = self.uow.listings().ids_by_owner(seller_id).await?;
        if !order.references_any(&listing_ids) {
            tracing::warn!(%order_id, %seller_id, "Order status change denied");
            return Err(AppError::forbidden(
                "You do not have permission to modify this order",
            ));
        }

        self.uow.orders().update_status(order_id, status).await
    }

    async fn dashboard_stats(&self, seller_id: Uuid) -> AppResult<DashboardStats> {
        let listings = self.uow.listings();
        let listing_ids = listings.ids_by_owner(seller_id).await?;

        let (total_materials, active_materials) = tokio::try_join!(
            listings.count_by_owner(seller_id, false),
            listings.count_by_owner(seller_id, true),
        )?;
        let lines = self.uow.orders().seller_lines(listing_ids).await?;

        Ok(DashboardStats::compute(
            total_materials,
            active_materials,
            &lines,
        ))
    }
}
