use sea_orm_migration::{prelude::*, schema::*};

use super::m20240301_000002_create_destinations::Destination;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DestinationImage::Table)
                    .if_not_exists()
                    .col(pk_auto(DestinationImage::Id))
                    .col(integer(DestinationImage::DestinationId).not_null())
                    .col(string_len(DestinationImage::ImageUrl, 500).not_null())
                    .col(string_len_null(DestinationImage::Caption, 200))
                    .col(integer(DestinationImage::DisplayOrder).not_null().default(0))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_destination_image_destination")
                            .from(DestinationImage::Table, DestinationImage::DestinationId)
                            .to(Destination::Table, Destination::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DestinationImage::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum DestinationImage {
    Table,
    Id,
    DestinationId,
    ImageUrl,
    Caption,
    DisplayOrder,
}
