use sea_orm_migration::{prelude::*, schema::*};

use super::m20240301_000001_create_cities::City;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Destination::Table)
                    .if_not_exists()
                    .col(pk_auto(Destination::Id))
                    .col(string_len(Destination::Name, 100).not_null())
                    .col(string_len_null(Destination::Description, 1000))
                    .col(string_len(Destination::Category, 20).not_null())
                    .col(integer(Destination::CityId).not_null())
                    .col(decimal_len_null(Destination::Price, 10, 2))
                    .col(double(Destination::Latitude).not_null())
                    .col(double(Destination::Longitude).not_null())
                    .col(string_null(Destination::Address))
                    .col(string_null(Destination::Phone))
                    .col(string_null(Destination::Website))
                    .col(string_null(Destination::OpeningHours))
                    .col(boolean(Destination::Active).not_null().default(true))
                    .col(double(Destination::AverageRating).not_null().default(0.0))
                    .col(big_integer(Destination::ReviewCount).not_null().default(0))
                    .col(integer(Destination::Version).not_null().default(0))
                    .col(
                        timestamp_with_time_zone(Destination::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Destination::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_destination_city")
                            .from(Destination::Table, Destination::CityId)
                            .to(City::Table, City::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_destination_city")
                    .table(Destination::Table)
                    .col(Destination::CityId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Destination::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Destination {
    Table,
    Id,
    Name,
    Description,
    Category,
    CityId,
    Price,
    Latitude,
    Longitude,
    Address,
    Phone,
    Website,
    OpeningHours,
    Active,
    AverageRating,
    ReviewCount,
    Version,
    CreatedAt,
    UpdatedAt,
}
