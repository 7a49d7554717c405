use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use axum_extra::extract::{Query, WithRejection};
use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use sea_orm::{ActiveValue::NotSet, Iterable, Set};
use serde::{Deserialize, Serialize};

use crate::entities::destination::{self, Category};
use crate::error::{AppError, AppResult, Violations};
use crate::handlers::{
    check_latitude, check_longitude, check_max_len, check_name, check_required_coordinates, clean,
    JsonBody, PathParam, QueryParams, DESCRIPTION_MAX, SHORT_TEXT_MAX, TAG_MAX, URL_MAX,
};
use crate::query::{
    self, compare_popularity, DestinationCriteria, DestinationRecord, DestinationSort, FetchPlan,
    Filter, Nearby, Page, PageParams, ProximityParams, ProximityQuery, MAX_SEARCH_RADIUS_KM,
};
use crate::response::ApiResponse;
use crate::store;
use crate::utils::serde_ext::double_option;
use crate::AppState;

pub const DEFAULT_DESTINATION_RADIUS_KM: f64 = 50.0;
pub const DEFAULT_NEARBY_LIMIT: i64 = 20;
pub const DEFAULT_POPULAR_LIMIT: i64 = 10;
pub const MAX_POPULAR_LIMIT: i64 = 50;

/// The owning city as embedded in a destination.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CitySummary {
    pub id: i32,
    pub name: String,
    pub arabic_name: Option<String>,
    pub region: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationDto {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub category: Category,
    pub city: CitySummary,
    pub price: Option<Decimal>,
    pub latitude: f64,
    pub longitude: f64,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub opening_hours: Option<String>,
    pub active: bool,
    pub average_rating: f64,
    pub review_count: i64,
    pub image_urls: Vec<String>,
    pub tags: Vec<String>,
    pub version: i32,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

impl From<DestinationRecord> for DestinationDto {
    fn from(record: DestinationRecord) -> Self {
        let tags = record.tag_names();
        let DestinationRecord {
            destination: d,
            city,
            images,
            ..
        } = record;

        Self {
            id: d.id,
            name: d.name,
            description: d.description,
            category: d.category,
            city: CitySummary {
                id: city.id,
                name: city.name,
                arabic_name: city.arabic_name,
                region: city.region,
            },
            price: d.price,
            latitude: d.latitude,
            longitude: d.longitude,
            address: d.address,
            phone: d.phone,
            website: d.website,
            opening_hours: d.opening_hours,
            active: d.active,
            average_rating: d.average_rating,
            review_count: d.review_count,
            image_urls: images.into_iter().map(|image| image.image_url).collect(),
            tags,
            version: d.version,
            created_at: d.created_at,
            updated_at: d.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyDestinationDto {
    #[serde(flatten)]
    pub destination: DestinationDto,
    pub distance_km: f64,
}

impl From<Nearby<DestinationRecord>> for NearbyDestinationDto {
    fn from(nearby: Nearby<DestinationRecord>) -> Self {
        Self {
            destination: nearby.item.into(),
            distance_km: nearby.distance_km,
        }
    }
}

/// Criteria plus paging, as posted to the search endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct SearchDestinationsRequest {
    #[serde(flatten)]
    pub criteria: DestinationCriteria,
    #[serde(flatten)]
    pub page: PageParams,
}

fn check_tags(violations: &mut Violations, tags: Option<&Vec<String>>) {
    if tags.is_some_and(|tags| tags.iter().any(|tag| tag.trim().chars().count() > TAG_MAX)) {
        violations.add("tags", format!("Tags must not exceed {} characters", TAG_MAX));
    }
}

fn check_image_urls(violations: &mut Violations, urls: Option<&Vec<String>>) {
    if urls.is_some_and(|urls| urls.iter().any(|url| url.trim().chars().count() > URL_MAX)) {
        violations.add(
            "imageUrls",
            format!("Image URLs must not exceed {} characters", URL_MAX),
        );
    }
}

/// Prices are stored as `decimal(10, 2)`.
fn check_price(violations: &mut Violations, price: Option<Decimal>) {
    if let Some(price) = price {
        let max = Decimal::new(9_999_999_999, 2);
        violations
            .check(!price.is_sign_negative(), "price", "Price cannot be negative")
            .check(price <= max, "price", "Price must not exceed 99999999.99")
            .check(
                price.normalize().scale() <= 2,
                "price",
                "Price must have at most 2 decimal places",
            );
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDestinationRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type", alias = "category")]
    pub category: Option<Category>,
    pub city_id: Option<i32>,
    pub price: Option<Decimal>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub opening_hours: Option<String>,
    pub active: Option<bool>,
    pub tags: Option<Vec<String>>,
    pub image_urls: Option<Vec<String>>,
}

impl CreateDestinationRequest {
    fn into_parts(self) -> AppResult<(destination::ActiveModel, Vec<String>, Vec<String>)> {
        let mut violations = Violations::new();

        let name = clean(self.name);
        match name.as_deref() {
            Some(name) => check_name(&mut violations, "name", name),
            None => {
                violations.add("name", "Destination name is required");
            }
        }
        violations.check(self.category.is_some(), "type", "Destination type is required");
        violations.check(self.city_id.is_some(), "cityId", "City is required");
        check_required_coordinates(&mut violations, self.latitude, self.longitude);
        check_price(&mut violations, self.price);

        let description = clean(self.description);
        let address = clean(self.address);
        let phone = clean(self.phone);
        let website = clean(self.website);
        let opening_hours = clean(self.opening_hours);
        check_max_len(&mut violations, "description", description.as_deref(), DESCRIPTION_MAX);
        check_max_len(&mut violations, "website", website.as_deref(), URL_MAX);
        check_max_len(&mut violations, "phone", phone.as_deref(), SHORT_TEXT_MAX);
        check_tags(&mut violations, self.tags.as_ref());
        check_image_urls(&mut violations, self.image_urls.as_ref());

        violations.finish()?;

        let model = destination::ActiveModel {
            id: NotSet,
            name: Set(name.unwrap_or_default()),
            description: Set(description),
            category: Set(self.category.unwrap_or(Category::Cultural)),
            city_id: Set(self.city_id.unwrap_or_default()),
            price: Set(self.price),
            latitude: Set(self.latitude.unwrap_or_default()),
            longitude: Set(self.longitude.unwrap_or_default()),
            address: Set(address),
            phone: Set(phone),
            website: Set(website),
            opening_hours: Set(opening_hours),
            active: Set(self.active.unwrap_or(true)),
            average_rating: Set(0.0),
            review_count: Set(0),
            ..Default::default()
        };
        Ok((
            model,
            self.tags.unwrap_or_default(),
            self.image_urls.unwrap_or_default(),
        ))
    }
}

/// Partial destination update. Absent fields are left alone; `null` clears
/// the optional ones and is ignored for the rest.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDestinationRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(rename = "type", alias = "category")]
    pub category: Option<Category>,
    pub city_id: Option<i32>,
    #[serde(default, deserialize_with = "double_option")]
    pub price: Option<Option<Decimal>>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(default, deserialize_with = "double_option")]
    pub address: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub website: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub opening_hours: Option<Option<String>>,
    pub active: Option<bool>,
    pub tags: Option<Vec<String>>,
    pub image_urls: Option<Vec<String>>,
    pub version: Option<i32>,
}

pub struct DestinationChanges {
    pub model: destination::ActiveModel,
    pub tags: Option<Vec<String>>,
    pub image_urls: Option<Vec<String>>,
    pub version: Option<i32>,
}

impl UpdateDestinationRequest {
    fn into_changes(self) -> AppResult<DestinationChanges> {
        let mut violations = Violations::new();
        let mut model = destination::ActiveModel::default();

        if let Some(name) = self.name {
            let name = name.trim().to_string();
            check_name(&mut violations, "name", &name);
            model.name = Set(name);
        }
        if let Some(description) = self.description {
            let description = clean(description);
            check_max_len(&mut violations, "description", description.as_deref(), DESCRIPTION_MAX);
            model.description = Set(description);
        }
        if let Some(category) = self.category {
            model.category = Set(category);
        }
        if let Some(city_id) = self.city_id {
            model.city_id = Set(city_id);
        }
        if let Some(price) = self.price {
            check_price(&mut violations, price);
            model.price = Set(price);
        }
        if let Some(latitude) = self.latitude {
            check_latitude(&mut violations, latitude);
            model.latitude = Set(latitude);
        }
        if let Some(longitude) = self.longitude {
            check_longitude(&mut violations, longitude);
            model.longitude = Set(longitude);
        }
        if let Some(address) = self.address {
            model.address = Set(clean(address));
        }
        if let Some(phone) = self.phone {
            let phone = clean(phone);
            check_max_len(&mut violations, "phone", phone.as_deref(), SHORT_TEXT_MAX);
            model.phone = Set(phone);
        }
        if let Some(website) = self.website {
            let website = clean(website);
            check_max_len(&mut violations, "website", website.as_deref(), URL_MAX);
            model.website = Set(website);
        }
        if let Some(opening_hours) = self.opening_hours {
            model.opening_hours = Set(clean(opening_hours));
        }
        if let Some(active) = self.active {
            model.active = Set(active);
        }
        check_tags(&mut violations, self.tags.as_ref());
        check_image_urls(&mut violations, self.image_urls.as_ref());

        violations.finish()?;

        Ok(DestinationChanges {
            model,
            tags: self.tags,
            image_urls: self.image_urls,
            version: self.version,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagingParams {
    pub page: Option<i64>,
    pub size: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LimitParams {
    pub limit: Option<i64>,
}

async fn page_of(
    state: &AppState,
    criteria: &DestinationCriteria,
    plan: &FetchPlan<DestinationSort>,
) -> AppResult<Page<DestinationDto>> {
    let filter = criteria.build()?;
    let records = store::destinations::load_active(&state.db).await?;
    Ok(query::execute(records, &filter, plan).map(DestinationDto::from))
}

/// Search destinations with any combination of criteria
pub async fn search_destinations(
    State(state): State<AppState>,
    WithRejection(Json(req), _): JsonBody<SearchDestinationsRequest>,
) -> AppResult<Json<ApiResponse<Page<DestinationDto>>>> {
    let plan = FetchPlan::<DestinationSort>::resolve(&req.page);
    let filter = req.criteria.build();
    let (plan, filter) = merge_errors(plan, filter)?;

    let records = store::destinations::load_active(&state.db).await?;
    let page = query::execute(records, &filter, &plan).map(DestinationDto::from);

    tracing::debug!(
        predicates = filter.len(),
        total = page.total_elements,
        "Searched destinations"
    );
    Ok(ApiResponse::with_message("Search completed successfully", page))
}

/// Combines two independently validated inputs so every invalid field is
/// reported in one response.
fn merge_errors<A, B>(a: AppResult<A>, b: AppResult<B>) -> AppResult<(A, B)> {
    match (a, b) {
        (Ok(a), Ok(b)) => Ok((a, b)),
        (Err(AppError::Validation(mut first)), Err(AppError::Validation(second))) => {
            for (field, message) in second {
                first.entry(field).or_insert(message);
            }
            Err(AppError::Validation(first))
        }
        (Err(e), _) | (_, Err(e)) => Err(e),
    }
}

/// List active destinations, paged and sorted
pub async fn list_destinations(
    State(state): State<AppState>,
    WithRejection(Query(params), _): QueryParams<PageParams>,
) -> AppResult<Json<ApiResponse<Page<DestinationDto>>>> {
    let plan = FetchPlan::<DestinationSort>::resolve(&params)?;
    let page = page_of(&state, &DestinationCriteria::default(), &plan).await?;
    Ok(ApiResponse::with_message(
        "Destinations retrieved successfully",
        page,
    ))
}

/// Get destination by id, inactive ones included
pub async fn get_destination(
    State(state): State<AppState>,
    WithRejection(Path(id), _): PathParam<i32>,
) -> AppResult<Json<ApiResponse<DestinationDto>>> {
    let record = store::destinations::record(&state.db, id).await?;
    Ok(ApiResponse::with_message(
        "Destination retrieved successfully",
        record.into(),
    ))
}

pub async fn destinations_by_city(
    State(state): State<AppState>,
    WithRejection(Path(city_id), _): PathParam<i32>,
    WithRejection(Query(params), _): QueryParams<PagingParams>,
) -> AppResult<Json<ApiResponse<Page<DestinationDto>>>> {
    let plan = FetchPlan::fixed(params.page, params.size, DestinationSort::Name)?;
    if !store::cities::exists(&state.db, city_id).await? {
        return Err(store::cities::not_found(city_id));
    }

    let page = page_of(&state, &DestinationCriteria::for_city(city_id), &plan).await?;
    Ok(ApiResponse::with_message(
        "Destinations retrieved successfully",
        page,
    ))
}

pub async fn destinations_by_type(
    State(state): State<AppState>,
    WithRejection(Path(raw), _): PathParam<String>,
    WithRejection(Query(params), _): QueryParams<PagingParams>,
) -> AppResult<Json<ApiResponse<Page<DestinationDto>>>> {
    let category: Category = raw.parse().map_err(AppError::InvalidArgument)?;
    let plan = FetchPlan::fixed(params.page, params.size, DestinationSort::Name)?;

    let page = page_of(&state, &DestinationCriteria::for_category(category), &plan).await?;
    Ok(ApiResponse::with_message(
        "Destinations retrieved successfully",
        page,
    ))
}

/// Best rated active destinations
pub async fn popular_destinations(
    State(state): State<AppState>,
    WithRejection(Query(params), _): QueryParams<LimitParams>,
) -> AppResult<Json<ApiResponse<Vec<DestinationDto>>>> {
    let limit = params.limit.unwrap_or(DEFAULT_POPULAR_LIMIT);
    let mut violations = Violations::new();
    violations.check(
        (1..=MAX_POPULAR_LIMIT).contains(&limit),
        "limit",
        "Limit must be between 1 and 50",
    );
    violations.finish()?;

    let records = store::destinations::load_active(&state.db).await?;
    let popular: Vec<DestinationDto> =
        query::top(records, &Filter::new(), limit as usize, compare_popularity)
            .into_iter()
            .map(DestinationDto::from)
            .collect();

    Ok(ApiResponse::with_message(
        "Popular destinations retrieved successfully",
        popular,
    ))
}

/// Destinations around a point, closest first
pub async fn nearby_destinations(
    State(state): State<AppState>,
    WithRejection(Query(mut params), _): QueryParams<ProximityParams>,
) -> AppResult<Json<ApiResponse<Vec<NearbyDestinationDto>>>> {
    params.radius_km.get_or_insert(DEFAULT_DESTINATION_RADIUS_KM);
    params.limit.get_or_insert(DEFAULT_NEARBY_LIMIT);
    let proximity = ProximityQuery::resolve(&params, MAX_SEARCH_RADIUS_KM)?;

    let records = store::destinations::load_active(&state.db).await?;
    let found: Vec<NearbyDestinationDto> = query::search(records, &proximity)
        .into_iter()
        .map(NearbyDestinationDto::from)
        .collect();

    tracing::debug!(
        latitude = proximity.center.latitude,
        longitude = proximity.center.longitude,
        radius_km = proximity.radius_km,
        found = found.len(),
        "Nearby destinations"
    );
    Ok(ApiResponse::with_message(
        "Nearby destinations retrieved successfully",
        found,
    ))
}

pub async fn destination_types() -> Json<ApiResponse<Vec<Category>>> {
    ApiResponse::with_message(
        "Destination types retrieved successfully",
        Category::iter().collect(),
    )
}

/// Create a destination
pub async fn create_destination(
    State(state): State<AppState>,
    WithRejection(Json(req), _): JsonBody<CreateDestinationRequest>,
) -> AppResult<impl IntoResponse> {
    let (model, tags, image_urls) = req.into_parts()?;
    let record = store::destinations::create(&state.db, model, tags, image_urls).await?;
    Ok(ApiResponse::created(
        "Destination created successfully",
        DestinationDto::from(record),
    ))
}

/// Update a destination
pub async fn update_destination(
    State(state): State<AppState>,
    WithRejection(Path(id), _): PathParam<i32>,
    WithRejection(Json(req), _): JsonBody<UpdateDestinationRequest>,
) -> AppResult<Json<ApiResponse<DestinationDto>>> {
    let changes = req.into_changes()?;
    let record = store::destinations::update(
        &state.db,
        id,
        changes.version,
        changes.model,
        changes.tags,
        changes.image_urls,
    )
    .await?;
    Ok(ApiResponse::with_message(
        "Destination updated successfully",
        record.into(),
    ))
}

/// Delete a destination with its tags and images
pub async fn delete_destination(
    State(state): State<AppState>,
    WithRejection(Path(id), _): PathParam<i32>,
) -> AppResult<Json<ApiResponse<()>>> {
    store::destinations::delete(&state.db, id).await?;
    Ok(ApiResponse::message("Destination deleted successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_request_reads_criteria_and_paging() {
        let req: SearchDestinationsRequest = serde_json::from_value(serde_json::json!({
            "name": "palace",
            "type": "HISTORICAL",
            "minPrice": 10,
            "tags": ["unesco"],
            "page": 1,
            "size": 5,
            "sortBy": "price",
            "sortDirection": "desc",
        }))
        .unwrap();

        assert_eq!(req.criteria.name.as_deref(), Some("palace"));
        assert_eq!(req.criteria.category, Some(Category::Historical));
        assert_eq!(req.criteria.min_price, Some(Decimal::from(10)));
        assert_eq!(req.page.page, Some(1));
        assert_eq!(req.page.sort_dir.as_deref(), Some("desc"));
    }

    #[test]
    fn test_merge_errors_keeps_both_sides() {
        let mut a = crate::error::FieldErrors::new();
        a.insert("size".to_string(), "bad size".to_string());
        let mut b = crate::error::FieldErrors::new();
        b.insert("minRating".to_string(), "bad rating".to_string());

        let merged = merge_errors::<(), ()>(
            Err(AppError::Validation(a)),
            Err(AppError::Validation(b)),
        );
        match merged {
            Err(AppError::Validation(errors)) => {
                assert!(errors.contains_key("size"));
                assert!(errors.contains_key("minRating"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_create_requires_type_city_and_coordinates() {
        let req: CreateDestinationRequest = serde_json::from_value(serde_json::json!({
            "name": "Blue Pearl Medina",
            "price": -1,
        }))
        .unwrap();

        match req.into_parts() {
            Err(AppError::Validation(errors)) => {
                for field in ["type", "cityId", "latitude", "longitude", "price"] {
                    assert!(errors.contains_key(field), "missing {field}");
                }
                assert!(!errors.contains_key("name"));
            }
            other => panic!("expected validation error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_price_fits_the_stored_precision() {
        let errors = |price: &str| {
            let mut violations = Violations::new();
            check_price(&mut violations, Some(price.parse().unwrap()));
            violations.finish().err()
        };

        assert!(errors("0").is_none());
        assert!(errors("70.50").is_none());
        assert!(errors("70.500").is_none());
        assert!(errors("99999999.99").is_none());
        for price in ["-1", "100000000", "1000000000", "12.345"] {
            match errors(price) {
                Some(AppError::Validation(errors)) => assert!(errors.contains_key("price"), "{price}"),
                other => panic!("expected price error for {price}, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_update_distinguishes_null_from_absent() {
        let req: UpdateDestinationRequest = serde_json::from_value(serde_json::json!({
            "price": null,
            "phone": "+212 539 98 61 20",
            "name": null,
            "tags": [],
            "version": 3,
        }))
        .unwrap();
        let changes = req.into_changes().unwrap();

        assert_eq!(changes.model.price, Set(None));
        assert_eq!(
            changes.model.phone,
            Set(Some("+212 539 98 61 20".to_string()))
        );
        assert_eq!(changes.model.name, NotSet);
        assert_eq!(changes.model.website, NotSet);
        assert_eq!(changes.tags, Some(vec![]));
        assert_eq!(changes.image_urls, None);
        assert_eq!(changes.version, Some(3));
    }
}
