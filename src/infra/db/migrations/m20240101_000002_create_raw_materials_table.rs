//! Migration: Create raw_materials table.

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_users_table::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RawMaterials::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RawMaterials::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(RawMaterials::Name).string().not_null())
                    .col(ColumnDef::new(RawMaterials::Description).text().not_null())
                    .col(ColumnDef::new(RawMaterials::Price).double().not_null())
                    .col(ColumnDef::new(RawMaterials::OriginalPrice).double().null())
                    .col(
                        ColumnDef::new(RawMaterials::Discount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(RawMaterials::Quantity).integer().not_null())
                    .col(ColumnDef::new(RawMaterials::Category).string().not_null())
                    .col(ColumnDef::new(RawMaterials::Subcategory).string().null())
                    .col(ColumnDef::new(RawMaterials::Features).json_binary().not_null())
                    .col(ColumnDef::new(RawMaterials::Tags).json_binary().not_null())
                    .col(ColumnDef::new(RawMaterials::Images).json_binary().not_null())
                    .col(ColumnDef::new(RawMaterials::MainImage).text().null())
                    .col(
                        ColumnDef::new(RawMaterials::Ratings)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(RawMaterials::NumReviews)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(RawMaterials::CreatedBy).uuid().not_null())
                    .col(
                        ColumnDef::new(RawMaterials::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(RawMaterials::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RawMaterials::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_raw_materials_created_by")
                            .from(RawMaterials::Table, RawMaterials::CreatedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_raw_materials_created_by")
                    .table(RawMaterials::Table)
                    .col(RawMaterials::CreatedBy)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_raw_materials_is_active")
                    .table(RawMaterials::Table)
                    .col(RawMaterials::IsActive)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RawMaterials::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub(super) enum RawMaterials {
    Table,
    Id,
    Name,
    Description,
    Price,
    OriginalPrice,
    Discount,
    Quantity,
    Category,
    Subcategory,
    Features,
    Tags,
    Images,
    MainImage,
    Ratings,
    NumReviews,
    CreatedBy,
    IsActive,
    CreatedAt,
    UpdatedAt,
}
