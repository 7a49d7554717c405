pub mod city;
pub mod destination;
pub mod health;
pub mod image;

use axum::{extract::Path, Json};
use axum_extra::extract::{Query, WithRejection};

use crate::error::{AppError, Violations};

/// JSON body whose decoding failures use the error envelope.
pub type JsonBody<T> = WithRejection<Json<T>, AppError>;
pub type QueryParams<T> = WithRejection<Query<T>, AppError>;
pub type PathParam<T> = WithRejection<Path<T>, AppError>;

pub const NAME_MIN: usize = 2;
pub const NAME_MAX: usize = 100;
pub const DESCRIPTION_MAX: usize = 1000;
pub const URL_MAX: usize = 500;
pub const SHORT_TEXT_MAX: usize = 100;
pub const CAPTION_MAX: usize = 200;
pub const TAG_MAX: usize = 50;

/// Trimmed text, with blank strings treated as absent.
pub(crate) fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub(crate) fn check_name(violations: &mut Violations, field: &str, name: &str) {
    let len = name.chars().count();
    violations.check(
        (NAME_MIN..=NAME_MAX).contains(&len),
        field,
        "Name must be between 2 and 100 characters",
    );
}

pub(crate) fn check_max_len(
    violations: &mut Violations,
    field: &str,
    value: Option<&str>,
    max: usize,
) {
    if let Some(value) = value {
        if value.chars().count() > max {
            violations.add(field, format!("Must not exceed {} characters", max));
        }
    }
}

/// Validates a coordinate pair that is required on create.
pub(crate) fn check_required_coordinates(
    violations: &mut Violations,
    latitude: Option<f64>,
    longitude: Option<f64>,
) {
    match latitude {
        None => {
            violations.add("latitude", "Latitude is required");
        }
        Some(lat) => check_latitude(violations, lat),
    }
    match longitude {
        None => {
            violations.add("longitude", "Longitude is required");
        }
        Some(lng) => check_longitude(violations, lng),
    }
}

pub(crate) fn check_latitude(violations: &mut Violations, latitude: f64) {
    violations.check(
        crate::utils::geo::is_valid_latitude(latitude),
        "latitude",
        "Latitude must be between -90 and 90",
    );
}

pub(crate) fn check_longitude(violations: &mut Violations, longitude: f64) {
    violations.check(
        crate::utils::geo::is_valid_longitude(longitude),
        "longitude",
        "Longitude must be between -180 and 180",
    );
}
