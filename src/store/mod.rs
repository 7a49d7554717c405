//! Persistence of the catalog through SeaORM.
//!
//! Reads return fully loaded records for the query engine. Every mutation
//! runs inside a single transaction.

pub mod cities;
pub mod destinations;
pub mod images;

/// Fresh in-memory database with the schema applied.
#[cfg(test)]
pub(crate) async fn memory_db() -> sea_orm::DatabaseConnection {
    use sea_orm_migration::MigratorTrait;

    let config = crate::config::Config::for_database("sqlite::memory:");
    let db = crate::db::connect(&config).await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    db
}
