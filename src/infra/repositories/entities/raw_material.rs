//! Raw material (listing) database entity.

use sea_orm::entity::prelude::*;
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};

use crate::domain::{Listing, ListingImage};

/// JSON array of strings (features, tags)
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct StringList(pub Vec<String>);

/// JSON array of image references
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct ImageList(pub Vec<ListingImage>);

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "raw_materials")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub price: f64,
    pub original_price: Option<f64>,
    pub discount: i32,
    pub quantity: i32,
    pub category: String,
    pub subcategory: Option<String>,
    #[sea_orm(column_type = "JsonBinary")]
    pub features: StringList,
    #[sea_orm(column_type = "JsonBinary")]
    pub tags: StringList,
    #[sea_orm(column_type = "JsonBinary")]
    pub images: ImageList,
    #[sea_orm(column_type = "Text", nullable)]
    pub main_image: Option<String>,
    pub ratings: f64,
    pub num_reviews: i32,
    pub created_by: Uuid,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::CreatedBy",
        to = "super::user::Column::Id"
    )]
    Owner,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Listing {
    fn from(model: Model) -> Self {
        Listing {
            id: model.id,
            name: model.name,
            description: model.description,
            price: model.price,
            original_price: model.original_price,
            discount: model.discount,
            quantity: model.quantity,
            category: model.category,
            subcategory: model.subcategory,
            features: model.features.0,
            tags: model.tags.0,
            images: model.images.0,
            main_image: model.main_image,
            ratings: model.ratings,
            num_reviews: model.num_reviews,
            created_by: model.created_by,
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
