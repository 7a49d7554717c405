use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use axum_extra::extract::{Query, WithRejection};
use serde::{Deserialize, Serialize};

use crate::entities::destination_image;
use crate::error::{AppResult, Violations};
use crate::handlers::{check_max_len, clean, JsonBody, PathParam, QueryParams, CAPTION_MAX, URL_MAX};
use crate::response::ApiResponse;
use crate::store;
use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageDto {
    pub id: i32,
    pub destination_id: i32,
    pub image_url: String,
    pub caption: Option<String>,
    pub display_order: i32,
}

impl From<destination_image::Model> for ImageDto {
    fn from(image: destination_image::Model) -> Self {
        Self {
            id: image.id,
            destination_id: image.destination_id,
            image_url: image.image_url,
            caption: image.caption,
            display_order: image.display_order,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachImageRequest {
    pub image_url: Option<String>,
    pub caption: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderParams {
    pub new_order: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct CaptionParams {
    pub caption: Option<String>,
}

fn check_caption(violations: &mut Violations, caption: Option<&str>) {
    check_max_len(violations, "caption", caption, CAPTION_MAX);
}

/// List the images of a destination in display order
pub async fn list_images(
    State(state): State<AppState>,
    WithRejection(Path(destination_id), _): PathParam<i32>,
) -> AppResult<Json<ApiResponse<Vec<ImageDto>>>> {
    let images = store::images::list(&state.db, destination_id).await?;
    Ok(ApiResponse::with_message(
        "Images retrieved successfully",
        images.into_iter().map(ImageDto::from).collect(),
    ))
}

/// Attach an image URL to a destination
pub async fn attach_image(
    State(state): State<AppState>,
    WithRejection(Path(destination_id), _): PathParam<i32>,
    WithRejection(Json(req), _): JsonBody<AttachImageRequest>,
) -> AppResult<impl IntoResponse> {
    let mut violations = Violations::new();
    let image_url = clean(req.image_url);
    let caption = clean(req.caption);
    violations.check(image_url.is_some(), "imageUrl", "Image URL is required");
    check_max_len(&mut violations, "imageUrl", image_url.as_deref(), URL_MAX);
    check_caption(&mut violations, caption.as_deref());
    violations.finish()?;

    let image = store::images::attach(
        &state.db,
        destination_id,
        image_url.unwrap_or_default(),
        caption,
    )
    .await?;
    Ok(ApiResponse::created(
        "Image attached successfully",
        ImageDto::from(image),
    ))
}

pub async fn reorder_image(
    State(state): State<AppState>,
    WithRejection(Path((destination_id, image_id)), _): PathParam<(i32, i32)>,
    WithRejection(Query(params), _): QueryParams<ReorderParams>,
) -> AppResult<Json<ApiResponse<ImageDto>>> {
    let mut violations = Violations::new();
    match params.new_order {
        None => {
            violations.add("newOrder", "New order is required");
        }
        Some(order) => {
            violations.check(order >= 0, "newOrder", "Display order must not be negative");
        }
    }
    violations.finish()?;

    let image = store::images::reorder(
        &state.db,
        destination_id,
        image_id,
        params.new_order.unwrap_or_default(),
    )
    .await?;
    Ok(ApiResponse::with_message(
        "Image reordered successfully",
        image.into(),
    ))
}

/// Replace an image caption. A blank caption clears it.
pub async fn update_caption(
    State(state): State<AppState>,
    WithRejection(Path((destination_id, image_id)), _): PathParam<(i32, i32)>,
    WithRejection(Query(params), _): QueryParams<CaptionParams>,
) -> AppResult<Json<ApiResponse<ImageDto>>> {
    let caption = clean(params.caption);
    let mut violations = Violations::new();
    check_caption(&mut violations, caption.as_deref());
    violations.finish()?;

    let image = store::images::set_caption(&state.db, destination_id, image_id, caption).await?;
    Ok(ApiResponse::with_message(
        "Caption updated successfully",
        image.into(),
    ))
}

pub async fn delete_image(
    State(state): State<AppState>,
    WithRejection(Path((destination_id, image_id)), _): PathParam<(i32, i32)>,
) -> AppResult<Json<ApiResponse<()>>> {
    store::images::delete(&state.db, destination_id, image_id).await?;
    Ok(ApiResponse::message("Image deleted successfully"))
}
