use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(City::Table)
                    .if_not_exists()
                    .col(pk_auto(City::Id))
                    .col(string_len(City::Name, 100).not_null())
                    .col(string_len_null(City::ArabicName, 100))
                    .col(string_len(City::Region, 100).not_null())
                    .col(double(City::Latitude).not_null())
                    .col(double(City::Longitude).not_null())
                    .col(string_len_null(City::Description, 1000))
                    .col(string_len_null(City::ImageUrl, 500))
                    .col(boolean(City::IsPopular).not_null().default(false))
                    .col(integer(City::Version).not_null().default(0))
                    .col(
                        timestamp_with_time_zone(City::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(City::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_city_region")
                    .table(City::Table)
                    .col(City::Region)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(City::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum City {
    Table,
    Id,
    Name,
    ArabicName,
    Region,
    Latitude,
    Longitude,
    Description,
    ImageUrl,
    IsPopular,
    Version,
    CreatedAt,
    UpdatedAt,
}
