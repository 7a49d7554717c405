use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, QueryTrait, Set, TransactionTrait,
};

use crate::entities::{city, destination, destination_image, destination_tag};
use crate::error::{AppError, AppResult};
use crate::query::CityRecord;

pub fn not_found(id: i32) -> AppError {
    AppError::NotFound(format!("City not found with id: {}", id))
}

pub async fn get<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<city::Model> {
    city::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| not_found(id))
}

pub async fn exists<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<bool> {
    Ok(city::Entity::find_by_id(id).one(db).await?.is_some())
}

/// Active destination counts keyed by city id.
async fn destination_counts<C: ConnectionTrait>(db: &C) -> AppResult<HashMap<i32, u64>> {
    let city_ids: Vec<i32> = destination::Entity::find()
        .select_only()
        .column(destination::Column::CityId)
        .filter(destination::Column::Active.eq(true))
        .into_tuple()
        .all(db)
        .await?;

    let mut counts = HashMap::new();
    for city_id in city_ids {
        *counts.entry(city_id).or_insert(0) += 1;
    }
    Ok(counts)
}

async fn with_counts<C: ConnectionTrait>(
    db: &C,
    cities: Vec<city::Model>,
) -> AppResult<Vec<CityRecord>> {
    let counts = destination_counts(db).await?;
    Ok(cities
        .into_iter()
        .map(|city| CityRecord {
            destination_count: counts.get(&city.id).copied().unwrap_or(0),
            city,
        })
        .collect())
}

pub async fn load_records<C: ConnectionTrait>(db: &C) -> AppResult<Vec<CityRecord>> {
    let cities = city::Entity::find().all(db).await?;
    with_counts(db, cities).await
}

pub async fn record<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<CityRecord> {
    let city = get(db, id).await?;
    let mut records = with_counts(db, vec![city]).await?;
    records.pop().ok_or_else(|| not_found(id))
}

/// Case-insensitive exact name lookup.
pub async fn find_by_name<C: ConnectionTrait>(db: &C, name: &str) -> AppResult<CityRecord> {
    let wanted = name.trim().to_lowercase();
    let mut matches: Vec<city::Model> = city::Entity::find()
        .order_by_asc(city::Column::Id)
        .all(db)
        .await?
        .into_iter()
        .filter(|city| city.name.to_lowercase() == wanted)
        .collect();

    if matches.is_empty() {
        return Err(AppError::NotFound(format!(
            "City not found with name: {}",
            name
        )));
    }
    matches.truncate(1);
    let mut records = with_counts(db, matches).await?;
    records
        .pop()
        .ok_or_else(|| AppError::NotFound(format!("City not found with name: {}", name)))
}

pub async fn find_by_region<C: ConnectionTrait>(db: &C, region: &str) -> AppResult<Vec<CityRecord>> {
    let cities = city::Entity::find()
        .filter(city::Column::Region.eq(region))
        .all(db)
        .await?;
    with_counts(db, cities).await
}

pub async fn find_popular<C: ConnectionTrait>(db: &C) -> AppResult<Vec<CityRecord>> {
    let cities = city::Entity::find()
        .filter(city::Column::IsPopular.eq(true))
        .all(db)
        .await?;
    with_counts(db, cities).await
}

pub async fn regions<C: ConnectionTrait>(db: &C) -> AppResult<Vec<String>> {
    let regions = city::Entity::find()
        .select_only()
        .column(city::Column::Region)
        .distinct()
        .order_by_asc(city::Column::Region)
        .into_tuple()
        .all(db)
        .await?;
    Ok(regions)
}

pub async fn create(db: &DatabaseConnection, mut city: city::ActiveModel) -> AppResult<city::Model> {
    let now = Utc::now();
    city.version = Set(0);
    city.created_at = Set(now.into());
    city.updated_at = Set(now.into());

    let created = city.insert(db).await?;
    tracing::info!(city_id = created.id, name = %created.name, "Created city");
    Ok(created)
}

/// Applies the fields set in `changes` on top of the stored city.
///
/// The write only goes through if the row still carries the version read
/// at the start of the transaction; otherwise the update is rejected as a
/// conflict. `expected_version`, when given, must match that version too.
pub async fn update(
    db: &DatabaseConnection,
    id: i32,
    expected_version: Option<i32>,
    changes: city::ActiveModel,
) -> AppResult<city::Model> {
    let txn = db.begin().await?;

    let current = get(&txn, id).await?;
    check_version(expected_version, current.version, "City", id)?;
    write_versioned(&txn, id, current.version, changes).await?;

    let updated = get(&txn, id).await?;
    txn.commit().await?;

    tracing::info!(city_id = id, version = updated.version, "Updated city");
    Ok(updated)
}

/// Writes `changes` only while the row still carries `read_version`, and
/// bumps it. Zero rows touched means another writer got there first.
pub(crate) async fn write_versioned<C: ConnectionTrait>(
    db: &C,
    id: i32,
    read_version: i32,
    mut changes: city::ActiveModel,
) -> AppResult<()> {
    changes.version = Set(read_version + 1);
    changes.updated_at = Set(Utc::now().into());

    let result = city::Entity::update_many()
        .set(changes)
        .filter(city::Column::Id.eq(id))
        .filter(city::Column::Version.eq(read_version))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(concurrent_modification("City", id));
    }
    Ok(())
}

/// Deletes the city and everything it owns: the tags and images of its
/// destinations, the destinations, then the city row.
pub async fn delete(db: &DatabaseConnection, id: i32) -> AppResult<()> {
    let txn = db.begin().await?;

    if !exists(&txn, id).await? {
        return Err(not_found(id));
    }

    let owned = || {
        destination::Entity::find()
            .select_only()
            .column(destination::Column::Id)
            .filter(destination::Column::CityId.eq(id))
            .into_query()
    };

    let tags = destination_tag::Entity::delete_many()
        .filter(destination_tag::Column::DestinationId.in_subquery(owned()))
        .exec(&txn)
        .await?;
    let images = destination_image::Entity::delete_many()
        .filter(destination_image::Column::DestinationId.in_subquery(owned()))
        .exec(&txn)
        .await?;
    let destinations = destination::Entity::delete_many()
        .filter(destination::Column::CityId.eq(id))
        .exec(&txn)
        .await?;

    let result = city::Entity::delete_by_id(id).exec(&txn).await?;
    if result.rows_affected == 0 {
        return Err(not_found(id));
    }

    txn.commit().await?;

    tracing::info!(
        city_id = id,
        destinations = destinations.rows_affected,
        images = images.rows_affected,
        tags = tags.rows_affected,
        "Deleted city"
    );
    Ok(())
}

pub(crate) fn check_version(
    expected: Option<i32>,
    current: i32,
    entity: &str,
    id: i32,
) -> AppResult<()> {
    match expected {
        Some(expected) if expected != current => Err(AppError::Conflict(format!(
            "{} {} has version {}, expected {}",
            entity, id, current, expected
        ))),
        _ => Ok(()),
    }
}

pub(crate) fn concurrent_modification(entity: &str, id: i32) -> AppError {
    AppError::Conflict(format!(
        "{} {} was modified concurrently, reload and retry",
        entity, id
    ))
}
