use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

use crate::entities::destination_image;
use crate::error::{AppError, AppResult};
use crate::store::destinations;

/// Images of a destination, by display order then id.
pub async fn list<C: ConnectionTrait>(
    db: &C,
    destination_id: i32,
) -> AppResult<Vec<destination_image::Model>> {
    destinations::get(db, destination_id).await?;

    let images = destination_image::Entity::find()
        .filter(destination_image::Column::DestinationId.eq(destination_id))
        .order_by_asc(destination_image::Column::DisplayOrder)
        .order_by_asc(destination_image::Column::Id)
        .all(db)
        .await?;
    Ok(images)
}

/// Looks an image up through its owning destination. An image attached to
/// some other destination is reported as missing.
pub async fn get<C: ConnectionTrait>(
    db: &C,
    destination_id: i32,
    image_id: i32,
) -> AppResult<destination_image::Model> {
    destinations::get(db, destination_id).await?;

    destination_image::Entity::find_by_id(image_id)
        .filter(destination_image::Column::DestinationId.eq(destination_id))
        .one(db)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "Image {} not found for destination {}",
                image_id, destination_id
            ))
        })
}

/// Appends an image after the current last one.
pub async fn attach(
    db: &DatabaseConnection,
    destination_id: i32,
    image_url: String,
    caption: Option<String>,
) -> AppResult<destination_image::Model> {
    let txn = db.begin().await?;

    let next_order = list(&txn, destination_id)
        .await?
        .iter()
        .map(|image| image.display_order)
        .max()
        .map_or(0, |max| max + 1);

    let image = destination_image::ActiveModel {
        destination_id: Set(destination_id),
        image_url: Set(image_url),
        caption: Set(caption),
        display_order: Set(next_order),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    tracing::info!(
        destination_id,
        image_id = image.id,
        display_order = image.display_order,
        "Attached image"
    );
    Ok(image)
}

pub async fn reorder(
    db: &DatabaseConnection,
    destination_id: i32,
    image_id: i32,
    new_order: i32,
) -> AppResult<destination_image::Model> {
    let txn = db.begin().await?;

    let mut image: destination_image::ActiveModel =
        get(&txn, destination_id, image_id).await?.into();
    image.display_order = Set(new_order);
    let image = image.update(&txn).await?;

    txn.commit().await?;

    tracing::debug!(destination_id, image_id, new_order, "Reordered image");
    Ok(image)
}

pub async fn set_caption(
    db: &DatabaseConnection,
    destination_id: i32,
    image_id: i32,
    caption: Option<String>,
) -> AppResult<destination_image::Model> {
    let txn = db.begin().await?;

    let mut image: destination_image::ActiveModel =
        get(&txn, destination_id, image_id).await?.into();
    image.caption = Set(caption);
    let image = image.update(&txn).await?;

    txn.commit().await?;
    Ok(image)
}

pub async fn delete(db: &DatabaseConnection, destination_id: i32, image_id: i32) -> AppResult<()> {
    let txn = db.begin().await?;

    get(&txn, destination_id, image_id).await?;
    destination_image::Entity::delete_by_id(image_id)
        .exec(&txn)
        .await?;

    txn.commit().await?;

    tracing::info!(destination_id, image_id, "Deleted image");
    Ok(())
}
