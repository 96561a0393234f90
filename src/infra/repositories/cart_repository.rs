//! Cart repository: one header row per user plus ordered item rows.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::{cart, cart_item};
use crate::domain::{Cart, CartItem};
use crate::errors::{AppError, AppResult};
use crate::infra::unit_of_work::in_transaction;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Cart repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CartRepository: Send + Sync {
    /// Load a user's cart with its lines in insertion order
    async fn find_by_user(&self, user_id: Uuid) -> AppResult<Option<Cart>>;

    /// Persist the cart header and replace its full item list
    async fn save(&self, cart: Cart) -> AppResult<Cart>;
}

/// Concrete implementation of CartRepository
pub struct CartStore {
    db: DatabaseConnection,
}

impl CartStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Replace every line of a cart.
async fn replace_items<C: ConnectionTrait>(
    conn: &C,
    cart_id: Uuid,
    items: &[CartItem],
) -> Result<(), sea_orm::DbErr> {
    cart_item::Entity::delete_many()
        .filter(cart_item::Column::CartId.eq(cart_id))
        .exec(conn)
        .await?;

    if items.is_empty() {
        return Ok(());
    }

    let rows = items
        .iter()
        .enumerate()
        .map(|(position, item)| cart_item::ActiveModel {
            id: Set(Uuid::new_v4()),
            cart_id: Set(cart_id),
            raw_material_id: Set(item.raw_material_id),
            quantity: Set(item.quantity),
            position: Set(position as i32),
            added_at: Set(item.added_at),
        });

    cart_item::Entity::insert_many(rows).exec(conn).await?;
    Ok(())
}

/// Empty a user's cart, if they have one. Used by checkout inside its transaction.
pub(crate) async fn clear_user_cart<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
) -> Result<(), sea_orm::DbErr> {
    let header = cart::Entity::find()
        .filter(cart::Column::UserId.eq(user_id))
        .one(conn)
        .await?;

    if let Some(header) = header {
        replace_items(conn, header.id, &[]).await?;
        let mut active: cart::ActiveModel = header.into();
        active.updated_at = Set(chrono::Utc::now());
        active.update(conn).await?;
    }
    Ok(())
}

#[async_trait]
impl CartRepository for CartStore {
    async fn find_by_user(&self, user_id: Uuid) -> AppResult<Option<Cart>> {
        let Some(header) = cart::Entity::find()
            .filter(cart::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .map_err(AppError::from)?
        else {
            return Ok(None);
        };

        let items = cart_item::Entity::find()
            .filter(cart_item::Column::CartId.eq(header.id))
            .order_by_asc(cart_item::Column::Position)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(Some(Cart {
            id: header.id,
            user_id: header.user_id,
            items: items.into_iter().map(CartItem::from).collect(),
            created_at: header.created_at,
            updated_at: header.updated_at,
        }))
    }

    async fn save(&self, cart: Cart) -> AppResult<Cart> {
        in_transaction(&self.db, move |txn| {
            Box::pin(async move {
                let existing = cart::Entity::find_by_id(cart.id).one(txn).await?;

                match existing {
                    Some(header) => {
                        let mut active: cart::ActiveModel = header.into();
                        active.updated_at = Set(cart.updated_at);
                        active.update(txn).await?;
                    }
                    None => {
                        cart::ActiveModel {
                            id: Set(cart.id),
                            user_id: Set(cart.user_id),
                            created_at: Set(cart.created_at),
                            updated_at: Set(cart.updated_at),
                        }
                        .insert(txn)
                        .await?;
                    }
                }

                replace_items(txn, cart.id, &cart.items).await?;
                Ok(cart)
            })
        })
        .await
    }
}
