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
                    .table(DestinationTag::Table)
                    .if_not_exists()
                    .col(pk_auto(DestinationTag::Id))
                    .col(integer(DestinationTag::DestinationId).not_null())
                    .col(string_len(DestinationTag::Name, 50).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_destination_tag_destination")
                            .from(DestinationTag::Table, DestinationTag::DestinationId)
                            .to(Destination::Table, Destination::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_destination_tag_name")
                    .table(DestinationTag::Table)
                    .col(DestinationTag::Name)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DestinationTag::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum DestinationTag {
    Table,
    Id,
    DestinationId,
    Name,
}
