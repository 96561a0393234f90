//! Migration: Create reviews table.
//!
//! One active review per (user, listing) is checked by the service, not here.

use sea_orm_migration::prelude::*;

use super::m20240101_000002_create_raw_materials_table::RawMaterials;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Reviews::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Reviews::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Reviews::Rating).integer().not_null())
                    .col(
                        ColumnDef::new(Reviews::Title)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Reviews::Comment).text().not_null())
                    .col(ColumnDef::new(Reviews::RawMaterialId).uuid().not_null())
                    .col(ColumnDef::new(Reviews::RawMaterialName).string().not_null())
                    .col(ColumnDef::new(Reviews::SellerId).uuid().not_null())
                    .col(ColumnDef::new(Reviews::SellerName).string().not_null())
                    .col(ColumnDef::new(Reviews::UserId).uuid().not_null())
                    .col(ColumnDef::new(Reviews::UserName).string().not_null())
                    .col(
                        ColumnDef::new(Reviews::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Reviews::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Reviews::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reviews_raw_material_id")
                            .from(Reviews::Table, Reviews::RawMaterialId)
                            .to(RawMaterials::Table, RawMaterials::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_reviews_raw_material_id")
                    .table(Reviews::Table)
                    .col(Reviews::RawMaterialId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_reviews_seller_id")
                    .table(Reviews::Table)
                    .col(Reviews::SellerId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Reviews::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Reviews {
    Table,
    Id,
    Rating,
    Title,
    Comment,
    RawMaterialId,
    RawMaterialName,
    SellerId,
    SellerName,
    UserId,
    UserName,
    IsActive,
    CreatedAt,
    UpdatedAt,
}
