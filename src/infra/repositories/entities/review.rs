//! Review database entity.

use sea_orm::entity::prelude::*;

use crate::domain::Review;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "reviews")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub rating: i32,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub comment: String,
    pub raw_material_id: Uuid,
    pub raw_material_name: String,
    pub seller_id: Uuid,
    pub seller_name: String,
    pub user_id: Uuid,
    pub user_name: String,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Review {
    fn from(model: Model) -> Self {
        Review {
            id: model.id,
            rating: model.rating,
            title: model.title,
            comment: model.comment,
            raw_material_id: model.raw_material_id,
            raw_material_name: model.raw_material_name,
            seller_id: model.seller_id,
            seller_name: model.seller_name,
            user_id: model.user_id,
            user_name: model.user_name,
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
