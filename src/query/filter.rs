use rust_decimal::Decimal;
use serde::Deserialize;

use crate::entities::destination::Category;
use crate::error::{AppResult, Violations};
use crate::query::proximity::{check_center, check_radius};
use crate::query::records::{CityRecord, DestinationRecord};
use crate::utils::geo::Coordinate;

pub const MAX_SEARCH_RADIUS_KM: f64 = 200.0;

pub type Predicate<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

/// Conjunction of predicates. An empty filter accepts every record.
pub struct Filter<T> {
    predicates: Vec<Predicate<T>>,
}

impl<T> Default for Filter<T> {
    fn default() -> Self {
        Self {
            predicates: Vec::new(),
        }
    }
}

impl<T> Filter<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn and(mut self, predicate: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        self.predicates.push(Box::new(predicate));
        self
    }

    pub fn matches(&self, record: &T) -> bool {
        self.predicates.iter().all(|predicate| predicate(record))
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}

/// Case-insensitive substring match on city names. A blank needle matches
/// everything.
pub fn city_name_contains(needle: &str) -> Filter<CityRecord> {
    let needle = needle.trim().to_lowercase();
    if needle.is_empty() {
        return Filter::new();
    }
    Filter::new().and(move |record: &CityRecord| record.city.name.to_lowercase().contains(&needle))
}

/// Sparse destination search criteria. Every absent field leaves that
/// dimension unconstrained.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationCriteria {
    pub name: Option<String>,
    pub city_id: Option<i32>,
    #[serde(rename = "type", alias = "category")]
    pub category: Option<Category>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub min_rating: Option<f64>,
    pub tags: Option<Vec<String>>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub radius_km: Option<f64>,
}

impl DestinationCriteria {
    pub fn for_city(city_id: i32) -> Self {
        Self {
            city_id: Some(city_id),
            ..Default::default()
        }
    }

    pub fn for_category(category: Category) -> Self {
        Self {
            category: Some(category),
            ..Default::default()
        }
    }

    /// Builds the predicate set, reporting every invalid field at once.
    pub fn build(&self) -> AppResult<Filter<DestinationRecord>> {
        let mut violations = Violations::new();
        let mut filter = Filter::new();

        if let Some(needle) = self.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            let needle = needle.to_lowercase();
            filter = filter.and(move |r: &DestinationRecord| {
                r.destination.name.to_lowercase().contains(&needle)
            });
        }

        if let Some(city_id) = self.city_id {
            filter = filter.and(move |r: &DestinationRecord| r.destination.city_id == city_id);
        }

        if let Some(category) = self.category {
            filter = filter.and(move |r: &DestinationRecord| r.destination.category == category);
        }

        if let Some(min) = self.min_price {
            violations.check(!min.is_sign_negative(), "minPrice", "Minimum price cannot be negative");
            filter = filter.and(move |r: &DestinationRecord| {
                r.destination.price.is_some_and(|price| price >= min)
            });
        }

        if let Some(max) = self.max_price {
            violations.check(!max.is_sign_negative(), "maxPrice", "Maximum price cannot be negative");
            filter = filter.and(move |r: &DestinationRecord| {
                r.destination.price.is_some_and(|price| price <= max)
            });
        }

        if let (Some(min), Some(max)) = (self.min_price, self.max_price) {
            violations.check(
                min <= max,
                "minPrice",
                "Minimum price cannot exceed maximum price",
            );
        }

        if let Some(min_rating) = self.min_rating {
            violations.check(
                min_rating.is_finite() && (0.0..=5.0).contains(&min_rating),
                "minRating",
                "Minimum rating must be between 0 and 5",
            );
            filter = filter.and(move |r: &DestinationRecord| {
                r.destination.average_rating >= min_rating
            });
        }

        let tags: Vec<String> = self
            .tags
            .iter()
            .flatten()
            .map(|tag| tag.trim().to_string())
            .filter(|tag| !tag.is_empty())
            .collect();
        if !tags.is_empty() {
            filter = filter.and(move |r: &DestinationRecord| r.has_any_tag(&tags));
        }

        if self.latitude.is_some() || self.longitude.is_some() || self.radius_km.is_some() {
            let center = check_center(self.latitude, self.longitude, &mut violations);
            let radius = check_radius(self.radius_km, MAX_SEARCH_RADIUS_KM, &mut violations);
            if let (Some(center), Some(radius)) = (center, radius) {
                filter = filter.and(move |r: &DestinationRecord| {
                    let point = Coordinate {
                        latitude: r.destination.latitude,
                        longitude: r.destination.longitude,
                    };
                    center.distance_to(&point) <= radius
                });
            }
        }

        violations.finish()?;
        Ok(filter)
    }
}
