//! Order repository.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use super::cart_repository::clear_user_cart;
use super::entities::{order, order_item};
use crate::domain::{NewOrder, Order, OrderItem, OrderStatus, PaymentStatus, SellerLine};
use crate::errors::{AppError, AppResult};
use crate::infra::unit_of_work::in_transaction;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Order repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Insert the order and empty the buyer's cart in one transaction
    async fn place(&self, order: NewOrder) -> AppResult<Order>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Order>>;

    /// A buyer's orders, newest first
    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<Order>>;

    /// Orders with at least one line referencing the given listings, newest first
    async fn list_containing(&self, listing_ids: Vec<Uuid>) -> AppResult<Vec<Order>>;

    async fn update_status(&self, id: Uuid, status: OrderStatus) -> AppResult<Order>;

    /// Record a payment outcome, optionally moving the order status as well
    async fn update_payment(
        &self,
        id: Uuid,
        payment_status: PaymentStatus,
        status: Option<OrderStatus>,
    ) -> AppResult<Order>;

    /// Order lines referencing the given listings, with their order's statuses
    async fn seller_lines(&self, listing_ids: Vec<Uuid>) -> AppResult<Vec<SellerLine>>;
}

/// Concrete implementation of OrderRepository
pub struct OrderStore {
    db: DatabaseConnection,
}

impl OrderStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_header(&self, id: Uuid) -> AppResult<order::Model> {
        order::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::not_found("Order not found"))
    }
}

fn parse_status(value: &str) -> AppResult<OrderStatus> {
    OrderStatus::parse(value)
        .ok_or_else(|| AppError::internal(format!("Unknown order status '{value}'")))
}

fn parse_payment_status(value: &str) -> AppResult<PaymentStatus> {
    PaymentStatus::parse(value)
        .ok_or_else(|| AppError::internal(format!("Unknown payment status '{value}'")))
}

/// Attach line items to order headers, keeping the headers' order.
async fn with_items<C: ConnectionTrait>(
    conn: &C,
    headers: Vec<order::Model>,
) -> AppResult<Vec<Order>> {
    if headers.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<Uuid> = headers.iter().map(|header| header.id).collect();
    let lines = order_item::Entity::find()
        .filter(order_item::Column::OrderId.is_in(ids))
        .order_by_asc(order_item::Column::Position)
        .all(conn)
        .await?;

    let mut grouped: HashMap<Uuid, Vec<OrderItem>> = HashMap::new();
    for line in lines {
        grouped
            .entry(line.order_id)
            .or_default()
            .push(OrderItem::from(line));
    }

    headers
        .into_iter()
        .map(|header| {
            Ok(Order {
                items: grouped.remove(&header.id).unwrap_or_default(),
                status: parse_status(&header.status)?,
                payment_status: parse_payment_status(&header.payment_status)?,
                id: header.id,
                user_id: header.user_id,
                total_amount: header.total_amount,
                created_at: header.created_at,
                updated_at: header.updated_at,
            })
        })
        .collect()
}

#[async_trait]
impl OrderRepository for OrderStore {
    async fn place(&self, new_order: NewOrder) -> AppResult<Order> {
        in_transaction(&self.db, move |txn| {
            Box::pin(async move {
                let now = Utc::now();
                let header = order::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    user_id: Set(new_order.user_id),
                    total_amount: Set(new_order.total_amount),
                    status: Set(OrderStatus::Processing.as_str().to_string()),
                    payment_status: Set(PaymentStatus::Pending.as_str().to_string()),
                    created_at: Set(now),
                    updated_at: Set(now),
                }
                .insert(txn)
                .await?;

                let rows = new_order
                    .items
                    .iter()
                    .enumerate()
                    .map(|(position, item)| order_item::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        order_id: Set(header.id),
                        raw_material_id: Set(item.raw_material_id),
                        quantity: Set(item.quantity),
                        price: Set(item.price),
                        position: Set(position as i32),
                    });
                order_item::Entity::insert_many(rows).exec(txn).await?;

                clear_user_cart(txn, new_order.user_id).await?;

                Ok(Order {
                    id: header.id,
                    user_id: header.user_id,
                    items: new_order.items,
                    total_amount: header.total_amount,
                    status: OrderStatus::Processing,
                    payment_status: PaymentStatus::Pending,
                    created_at: header.created_at,
                    updated_at: header.updated_at,
                })
            })
        })
        .await
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Order>> {
        let Some(header) = order::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        Ok(with_items(&self.db, vec![header]).await?.pop())
    }

    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<Order>> {
        let headers = order::Entity::find()
            .filter(order::Column::UserId.eq(user_id))
            .order_by_desc(order::Column::CreatedAt)
            .all(&self.db)
            .await?;

        with_items(&self.db, headers).await
    }

    async fn list_containing(&self, listing_ids: Vec<Uuid>) -> AppResult<Vec<Order>> {
        if listing_ids.is_empty() {
            return Ok(Vec::new());
        }

        let order_ids: Vec<Uuid> = order_item::Entity::find()
            .select_only()
            .column(order_item::Column::OrderId)
            .distinct()
            .filter(order_item::Column::RawMaterialId.is_in(listing_ids))
            .into_tuple()
            .all(&self.db)
            .await?;

        if order_ids.is_empty() {
            return Ok(Vec::new());
        }

        let headers = order::Entity::find()
            .filter(order::Column::Id.is_in(order_ids))
            .order_by_desc(order::Column::CreatedAt)
            .all(&self.db)
            .await?;

        with_items(&self.db, headers).await
    }

    async fn update_status(&self, id: Uuid, status: OrderStatus) -> AppResult<Order> {
        let mut active: order::ActiveModel = self.find_header(id).await?.into();
        active.status = Set(status.as_str().to_string());
        active.updated_at = Set(Utc::now());

        let header = active.update(&self.db).await?;
        with_items(&self.db, vec![header])
            .await?
            .pop()
            .ok_or_else(|| AppError::not_found("Order not found"))
    }

    async fn update_payment(
        &self,
        id: Uuid,
        payment_status: PaymentStatus,
        status: Option<OrderStatus>,
    ) -> AppResult<Order> {
        let mut active: order::ActiveModel = self.find_header(id).await?.into();
        active.payment_status = Set(payment_status.as_str().to_string());
        if let Some(status) = status {
            active.status = Set(status.as_str().to_string());
        }
        active.updated_at = Set(Utc::now());

        let header = active.update(&self.db).await?;
        with_items(&self.db, vec![header])
            .await?
            .pop()
            .ok_or_else(|| AppError::not_found("Order not found"))
    }

    async fn seller_lines(&self, listing_ids: Vec<Uuid>) -> AppResult<Vec<SellerLine>> {
        if listing_ids.is_empty() {
            return Ok(Vec::new());
        }

        let lines = order_item::Entity::find()
            .filter(order_item::Column::RawMaterialId.is_in(listing_ids))
            .all(&self.db)
            .await?;

        if lines.is_empty() {
            return Ok(Vec::new());
        }

        let order_ids: Vec<Uuid> = lines.iter().map(|line| line.order_id).collect();
        let statuses: HashMap<Uuid, (OrderStatus, PaymentStatus)> = order::Entity::find()
            .filter(order::Column::Id.is_in(order_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|header| {
                Ok((
                    header.id,
                    (
                        parse_status(&header.status)?,
                        parse_payment_status(&header.payment_status)?,
                    ),
                ))
            })
            .collect::<AppResult<_>>()?;

        Ok(lines
            .into_iter()
            .filter_map(|line| {
                let (status, payment_status) = *statuses.get(&line.order_id)?;
                Some(SellerLine {
                    order_id: line.order_id,
                    raw_material_id: line.raw_material_id,
                    quantity: line.quantity,
                    price: line.price,
                    status,
                    payment_status,
                })
            })
            .collect())
    }
}
