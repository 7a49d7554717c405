pub use sea_orm_migration::prelude::*;

mod m20240301_000001_create_cities;
mod m20240301_000002_create_destinations;
mod m20240301_000003_create_destination_images;
mod m20240301_000004_create_destination_tags;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_cities::Migration),
            Box::new(m20240301_000002_create_destinations::Migration),
            Box::new(m20240301_000003_create_destination_images::Migration),
            Box::new(m20240301_000004_create_destination_tags::Migration),
        ]
    }
}
