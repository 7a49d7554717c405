use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use axum_extra::extract::{Query, WithRejection};
use chrono::{DateTime, FixedOffset};
use sea_orm::{ActiveValue::NotSet, Set};
use serde::{Deserialize, Serialize};

use crate::entities::city;
use crate::error::{AppResult, Violations};
use crate::handlers::{
    check_latitude, check_longitude, check_max_len, check_name, check_required_coordinates, clean,
    JsonBody, PathParam, QueryParams, DESCRIPTION_MAX, SHORT_TEXT_MAX, URL_MAX,
};
use crate::query::{
    self, city_name_contains, CityRecord, CitySort, FetchPlan, Filter, Nearby, Page, PageParams,
    ProximityParams, ProximityQuery, Record, Sortable,
};
use crate::response::ApiResponse;
use crate::store;
use crate::utils::serde_ext::double_option;
use crate::AppState;

pub const MAX_CITY_RADIUS_KM: f64 = 500.0;
pub const DEFAULT_CITY_RADIUS_KM: f64 = 100.0;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CityDto {
    pub id: i32,
    pub name: String,
    pub arabic_name: Option<String>,
    pub region: String,
    pub latitude: f64,
    pub longitude: f64,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub is_popular: bool,
    pub destination_count: u64,
    pub version: i32,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

impl From<CityRecord> for CityDto {
    fn from(record: CityRecord) -> Self {
        let c = record.city;
        Self {
            id: c.id,
            name: c.name,
            arabic_name: c.arabic_name,
            region: c.region,
            latitude: c.latitude,
            longitude: c.longitude,
            description: c.description,
            image_url: c.image_url,
            is_popular: c.is_popular,
            destination_count: record.destination_count,
            version: c.version,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyCityDto {
    #[serde(flatten)]
    pub city: CityDto,
    pub distance_km: f64,
}

impl From<Nearby<CityRecord>> for NearbyCityDto {
    fn from(nearby: Nearby<CityRecord>) -> Self {
        Self {
            city: nearby.item.into(),
            distance_km: nearby.distance_km,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCityRequest {
    pub name: Option<String>,
    pub arabic_name: Option<String>,
    pub region: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub is_popular: Option<bool>,
}

impl CreateCityRequest {
    fn into_active_model(self) -> AppResult<city::ActiveModel> {
        let mut violations = Violations::new();

        let name = clean(self.name);
        match name.as_deref() {
            Some(name) => check_name(&mut violations, "name", name),
            None => {
                violations.add("name", "City name is required");
            }
        }
        let region = clean(self.region);
        match region.as_deref() {
            Some(region) => check_max_len(&mut violations, "region", Some(region), SHORT_TEXT_MAX),
            None => {
                violations.add("region", "Region is required");
            }
        }
        let arabic_name = clean(self.arabic_name);
        let description = clean(self.description);
        let image_url = clean(self.image_url);
        check_max_len(&mut violations, "arabicName", arabic_name.as_deref(), SHORT_TEXT_MAX);
        check_max_len(&mut violations, "description", description.as_deref(), DESCRIPTION_MAX);
        check_max_len(&mut violations, "imageUrl", image_url.as_deref(), URL_MAX);
        check_required_coordinates(&mut violations, self.latitude, self.longitude);

        violations.finish()?;

        Ok(city::ActiveModel {
            id: NotSet,
            name: Set(name.unwrap_or_default()),
            arabic_name: Set(arabic_name),
            region: Set(region.unwrap_or_default()),
            latitude: Set(self.latitude.unwrap_or_default()),
            longitude: Set(self.longitude.unwrap_or_default()),
            description: Set(description),
            image_url: Set(image_url),
            is_popular: Set(self.is_popular.unwrap_or(false)),
            ..Default::default()
        })
    }
}

/// Partial city update. Absent fields are left alone; `null` clears the
/// optional ones.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCityRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub arabic_name: Option<Option<String>>,
    pub region: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub image_url: Option<Option<String>>,
    pub is_popular: Option<bool>,
    pub version: Option<i32>,
}

impl UpdateCityRequest {
    fn into_changes(self) -> AppResult<city::ActiveModel> {
        let mut violations = Violations::new();
        let mut changes = city::ActiveModel::default();

        if let Some(name) = self.name {
            let name = name.trim().to_string();
            check_name(&mut violations, "name", &name);
            changes.name = Set(name);
        }
        if let Some(region) = self.region {
            let region = region.trim().to_string();
            violations.check(!region.is_empty(), "region", "Region must not be blank");
            check_max_len(&mut violations, "region", Some(&region), SHORT_TEXT_MAX);
            changes.region = Set(region);
        }
        if let Some(latitude) = self.latitude {
            check_latitude(&mut violations, latitude);
            changes.latitude = Set(latitude);
        }
        if let Some(longitude) = self.longitude {
            check_longitude(&mut violations, longitude);
            changes.longitude = Set(longitude);
        }
        if let Some(arabic_name) = self.arabic_name {
            let arabic_name = clean(arabic_name);
            check_max_len(&mut violations, "arabicName", arabic_name.as_deref(), SHORT_TEXT_MAX);
            changes.arabic_name = Set(arabic_name);
        }
        if let Some(description) = self.description {
            let description = clean(description);
            check_max_len(&mut violations, "description", description.as_deref(), DESCRIPTION_MAX);
            changes.description = Set(description);
        }
        if let Some(image_url) = self.image_url {
            let image_url = clean(image_url);
            check_max_len(&mut violations, "imageUrl", image_url.as_deref(), URL_MAX);
            changes.image_url = Set(image_url);
        }
        if let Some(is_popular) = self.is_popular {
            changes.is_popular = Set(is_popular);
        }

        violations.finish()?;
        Ok(changes)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CitySearchParams {
    pub name: Option<String>,
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub sort_by: Option<String>,
    #[serde(alias = "sortDirection")]
    pub sort_dir: Option<String>,
}

fn sorted_by_name(mut records: Vec<CityRecord>) -> Vec<CityDto> {
    records.sort_by(|a, b| {
        a.compare_by(b, CitySort::Name)
            .then_with(|| a.id().cmp(&b.id()))
    });
    records.into_iter().map(CityDto::from).collect()
}

/// List cities, paged and sorted
pub async fn list_cities(
    State(state): State<AppState>,
    WithRejection(Query(params), _): QueryParams<PageParams>,
) -> AppResult<Json<ApiResponse<Page<CityDto>>>> {
    let plan = FetchPlan::<CitySort>::resolve(&params)?;
    let records = store::cities::load_records(&state.db).await?;
    let page = query::execute(records, &Filter::new(), &plan).map(CityDto::from);

    tracing::debug!(
        page = plan.page,
        size = plan.size,
        total = page.total_elements,
        "Listed cities"
    );
    Ok(ApiResponse::with_message("Cities retrieved successfully", page))
}

/// All cities ordered by name, without paging
pub async fn list_cities_simple(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<CityDto>>>> {
    let records = store::cities::load_records(&state.db).await?;
    Ok(ApiResponse::with_message(
        "Cities retrieved successfully",
        sorted_by_name(records),
    ))
}

/// Get city by id
pub async fn get_city(
    State(state): State<AppState>,
    WithRejection(Path(id), _): PathParam<i32>,
) -> AppResult<Json<ApiResponse<CityDto>>> {
    let record = store::cities::record(&state.db, id).await?;
    Ok(ApiResponse::with_message("City retrieved successfully", record.into()))
}

/// Get city by name, ignoring case
pub async fn get_city_by_name(
    State(state): State<AppState>,
    WithRejection(Path(name), _): PathParam<String>,
) -> AppResult<Json<ApiResponse<CityDto>>> {
    let record = store::cities::find_by_name(&state.db, &name).await?;
    Ok(ApiResponse::with_message("City retrieved successfully", record.into()))
}

pub async fn cities_by_region(
    State(state): State<AppState>,
    WithRejection(Path(region), _): PathParam<String>,
) -> AppResult<Json<ApiResponse<Vec<CityDto>>>> {
    let records = store::cities::find_by_region(&state.db, &region).await?;
    Ok(ApiResponse::with_message(
        "Cities retrieved successfully",
        sorted_by_name(records),
    ))
}

pub async fn popular_cities(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<CityDto>>>> {
    let records = store::cities::find_popular(&state.db).await?;
    Ok(ApiResponse::with_message(
        "Popular cities retrieved successfully",
        sorted_by_name(records),
    ))
}

/// Search cities by name fragment
pub async fn search_cities(
    State(state): State<AppState>,
    WithRejection(Query(params), _): QueryParams<CitySearchParams>,
) -> AppResult<Json<ApiResponse<Page<CityDto>>>> {
    let mut violations = Violations::new();
    let name = clean(params.name);
    violations.check(name.is_some(), "name", "Search name is required");

    let plan = FetchPlan::<CitySort>::resolve(&PageParams {
        page: params.page,
        size: params.size,
        sort_by: params.sort_by,
        sort_dir: params.sort_dir,
    });
    violations.finish()?;
    let plan = plan?;

    let filter = city_name_contains(name.as_deref().unwrap_or_default());
    let records = store::cities::load_records(&state.db).await?;
    let page = query::execute(records, &filter, &plan).map(CityDto::from);

    Ok(ApiResponse::with_message("Search completed successfully", page))
}

/// Cities around a point, closest first
pub async fn nearby_cities(
    State(state): State<AppState>,
    WithRejection(Query(mut params), _): QueryParams<ProximityParams>,
) -> AppResult<Json<ApiResponse<Vec<NearbyCityDto>>>> {
    params.radius_km.get_or_insert(DEFAULT_CITY_RADIUS_KM);
    let proximity = ProximityQuery::resolve(&params, MAX_CITY_RADIUS_KM)?;

    let records = store::cities::load_records(&state.db).await?;
    let found: Vec<NearbyCityDto> = query::search(records, &proximity)
        .into_iter()
        .map(NearbyCityDto::from)
        .collect();

    tracing::debug!(
        latitude = proximity.center.latitude,
        longitude = proximity.center.longitude,
        radius_km = proximity.radius_km,
        found = found.len(),
        "Nearby cities"
    );
    Ok(ApiResponse::with_message(
        "Nearby cities retrieved successfully",
        found,
    ))
}

pub async fn list_regions(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<String>>>> {
    let regions = store::cities::regions(&state.db).await?;
    Ok(ApiResponse::with_message(
        "Regions retrieved successfully",
        regions,
    ))
}

/// Create a city
pub async fn create_city(
    State(state): State<AppState>,
    WithRejection(Json(req), _): JsonBody<CreateCityRequest>,
) -> AppResult<impl IntoResponse> {
    let model = req.into_active_model()?;
    let city = store::cities::create(&state.db, model).await?;
    let dto = CityDto::from(CityRecord {
        city,
        destination_count: 0,
    });
    Ok(ApiResponse::created("City created successfully", dto))
}

/// Update a city
pub async fn update_city(
    State(state): State<AppState>,
    WithRejection(Path(id), _): PathParam<i32>,
    WithRejection(Json(req), _): JsonBody<UpdateCityRequest>,
) -> AppResult<Json<ApiResponse<CityDto>>> {
    let expected_version = req.version;
    let changes = req.into_changes()?;
    store::cities::update(&state.db, id, expected_version, changes).await?;

    let record = store::cities::record(&state.db, id).await?;
    Ok(ApiResponse::with_message("City updated successfully", record.into()))
}

/// Delete a city together with its destinations
pub async fn delete_city(
    State(state): State<AppState>,
    WithRejection(Path(id), _): PathParam<i32>,
) -> AppResult<Json<ApiResponse<()>>> {
    store::cities::delete(&state.db, id).await?;
    Ok(ApiResponse::message("City deleted successfully"))
}
