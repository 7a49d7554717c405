use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, Select, Set, TransactionTrait,
};

use crate::entities::{city, destination, destination_image, destination_tag};
use crate::error::{AppError, AppResult};
use crate::query::DestinationRecord;
use crate::store::cities::{self, check_version, concurrent_modification};

// Keeps `IN (...)` lists under SQLite's bound-parameter limit.
const ID_CHUNK: usize = 500;

pub fn not_found(id: i32) -> AppError {
    AppError::NotFound(format!("Destination not found with id: {}", id))
}

pub async fn get<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<destination::Model> {
    destination::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| not_found(id))
}

/// Loads the destinations `select` yields together with their city, tags
/// and ordered images.
pub async fn load_records<C: ConnectionTrait>(
    db: &C,
    select: Select<destination::Entity>,
) -> AppResult<Vec<DestinationRecord>> {
    let destinations = select.all(db).await?;
    assemble(db, destinations).await
}

/// Every destination that can show up in a listing.
pub async fn load_active<C: ConnectionTrait>(db: &C) -> AppResult<Vec<DestinationRecord>> {
    load_records(
        db,
        destination::Entity::find().filter(destination::Column::Active.eq(true)),
    )
    .await
}

/// A single destination, inactive ones included.
pub async fn record<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<DestinationRecord> {
    let destination = get(db, id).await?;
    let mut records = assemble(db, vec![destination]).await?;
    records.pop().ok_or_else(|| not_found(id))
}

async fn assemble<C: ConnectionTrait>(
    db: &C,
    destinations: Vec<destination::Model>,
) -> AppResult<Vec<DestinationRecord>> {
    if destinations.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<i32> = destinations.iter().map(|d| d.id).collect();
    let mut city_ids: Vec<i32> = destinations.iter().map(|d| d.city_id).collect();
    city_ids.sort_unstable();
    city_ids.dedup();

    let mut cities: HashMap<i32, city::Model> = HashMap::new();
    for chunk in city_ids.chunks(ID_CHUNK) {
        for city in city::Entity::find()
            .filter(city::Column::Id.is_in(chunk.to_vec()))
            .all(db)
            .await?
        {
            cities.insert(city.id, city);
        }
    }

    let mut tags: HashMap<i32, Vec<destination_tag::Model>> = HashMap::new();
    let mut images: HashMap<i32, Vec<destination_image::Model>> = HashMap::new();
    for chunk in ids.chunks(ID_CHUNK) {
        for tag in destination_tag::Entity::find()
            .filter(destination_tag::Column::DestinationId.is_in(chunk.to_vec()))
            .order_by_asc(destination_tag::Column::Name)
            .all(db)
            .await?
        {
            tags.entry(tag.destination_id).or_default().push(tag);
        }
        for image in destination_image::Entity::find()
            .filter(destination_image::Column::DestinationId.is_in(chunk.to_vec()))
            .order_by_asc(destination_image::Column::DisplayOrder)
            .order_by_asc(destination_image::Column::Id)
            .all(db)
            .await?
        {
            images.entry(image.destination_id).or_default().push(image);
        }
    }

    destinations
        .into_iter()
        .map(|destination| {
            let city = cities.get(&destination.city_id).cloned().ok_or_else(|| {
                AppError::Internal(format!(
                    "Destination {} references missing city {}",
                    destination.id, destination.city_id
                ))
            })?;
            Ok(DestinationRecord {
                tags: tags.remove(&destination.id).unwrap_or_default(),
                images: images.remove(&destination.id).unwrap_or_default(),
                city,
                destination,
            })
        })
        .collect()
}

/// Inserts a destination along with its tags and images.
pub async fn create(
    db: &DatabaseConnection,
    mut destination: destination::ActiveModel,
    tags: Vec<String>,
    image_urls: Vec<String>,
) -> AppResult<DestinationRecord> {
    let txn = db.begin().await?;

    if let ActiveValue::Set(city_id) = destination.city_id {
        if !cities::exists(&txn, city_id).await? {
            return Err(cities::not_found(city_id));
        }
    }

    let now = Utc::now();
    destination.version = Set(0);
    destination.created_at = Set(now.into());
    destination.updated_at = Set(now.into());

    let created = destination.insert(&txn).await?;
    replace_tags(&txn, created.id, tags).await?;
    replace_images(&txn, created.id, image_urls).await?;

    let record = record(&txn, created.id).await?;
    txn.commit().await?;

    tracing::info!(
        destination_id = record.destination.id,
        city_id = record.destination.city_id,
        name = %record.destination.name,
        "Created destination"
    );
    Ok(record)
}

/// Partial update guarded by the version column. `tags` and `image_urls`
/// replace the stored sets when given.
pub async fn update(
    db: &DatabaseConnection,
    id: i32,
    expected_version: Option<i32>,
    changes: destination::ActiveModel,
    tags: Option<Vec<String>>,
    image_urls: Option<Vec<String>>,
) -> AppResult<DestinationRecord> {
    let txn = db.begin().await?;

    let current = get(&txn, id).await?;
    check_version(expected_version, current.version, "Destination", id)?;

    if let ActiveValue::Set(city_id) = changes.city_id {
        if city_id != current.city_id && !cities::exists(&txn, city_id).await? {
            return Err(cities::not_found(city_id));
        }
    }

    write_versioned(&txn, id, current.version, changes).await?;

    if let Some(tags) = tags {
        replace_tags(&txn, id, tags).await?;
    }
    if let Some(image_urls) = image_urls {
        replace_images(&txn, id, image_urls).await?;
    }

    let record = record(&txn, id).await?;
    txn.commit().await?;

    tracing::info!(
        destination_id = id,
        version = record.destination.version,
        "Updated destination"
    );
    Ok(record)
}

/// Conditional write keyed on the version read at the start of the update.
pub(crate) async fn write_versioned<C: ConnectionTrait>(
    db: &C,
    id: i32,
    read_version: i32,
    mut changes: destination::ActiveModel,
) -> AppResult<()> {
    changes.version = Set(read_version + 1);
    changes.updated_at = Set(Utc::now().into());

    let result = destination::Entity::update_many()
        .set(changes)
        .filter(destination::Column::Id.eq(id))
        .filter(destination::Column::Version.eq(read_version))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(concurrent_modification("Destination", id));
    }
    Ok(())
}

pub async fn delete(db: &DatabaseConnection, id: i32) -> AppResult<()> {
    let txn = db.begin().await?;

    get(&txn, id).await?;

    destination_tag::Entity::delete_many()
        .filter(destination_tag::Column::DestinationId.eq(id))
        .exec(&txn)
        .await?;
    destination_image::Entity::delete_many()
        .filter(destination_image::Column::DestinationId.eq(id))
        .exec(&txn)
        .await?;

    let result = destination::Entity::delete_by_id(id).exec(&txn).await?;
    if result.rows_affected == 0 {
        return Err(not_found(id));
    }

    txn.commit().await?;

    tracing::info!(destination_id = id, "Deleted destination");
    Ok(())
}

/// Trims names and drops blanks and duplicates, keeping first-seen order.
pub fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !seen.iter().any(|t| t == tag) {
            seen.push(tag.to_string());
        }
    }
    seen
}

async fn replace_tags<C: ConnectionTrait>(
    db: &C,
    destination_id: i32,
    tags: Vec<String>,
) -> AppResult<()> {
    destination_tag::Entity::delete_many()
        .filter(destination_tag::Column::DestinationId.eq(destination_id))
        .exec(db)
        .await?;

    let models: Vec<destination_tag::ActiveModel> = normalize_tags(tags)
        .into_iter()
        .map(|name| destination_tag::ActiveModel {
            destination_id: Set(destination_id),
            name: Set(name),
            ..Default::default()
        })
        .collect();

    if !models.is_empty() {
        destination_tag::Entity::insert_many(models).exec(db).await?;
    }
    Ok(())
}

async fn replace_images<C: ConnectionTrait>(
    db: &C,
    destination_id: i32,
    image_urls: Vec<String>,
) -> AppResult<()> {
    destination_image::Entity::delete_many()
        .filter(destination_image::Column::DestinationId.eq(destination_id))
        .exec(db)
        .await?;

    let models: Vec<destination_image::ActiveModel> = image_urls
        .into_iter()
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
        .enumerate()
        .map(|(order, url)| destination_image::ActiveModel {
            destination_id: Set(destination_id),
            image_url: Set(url),
            caption: Set(None),
            display_order: Set(order as i32),
            ..Default::default()
        })
        .collect();

    if !models.is_empty() {
        destination_image::Entity::insert_many(models).exec(db).await?;
    }
    Ok(())
}
