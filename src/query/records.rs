//! Normalized views of stored entities, with their relations loaded, that
//! predicates and comparators run over.

use std::cmp::Ordering;

use crate::entities::{city, destination, destination_image, destination_tag};
use crate::query::executor::Record;
use crate::query::page::{SortField, Sortable};
use crate::query::proximity::Located;
use crate::utils::geo::Coordinate;

#[derive(Debug, Clone, PartialEq)]
pub struct CityRecord {
    pub city: city::Model,
    /// Active destinations owned by the city, counted at load time.
    pub destination_count: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DestinationRecord {
    pub destination: destination::Model,
    pub city: city::Model,
    pub tags: Vec<destination_tag::Model>,
    /// Sorted by display order, then id.
    pub images: Vec<destination_image::Model>,
}

impl DestinationRecord {
    pub fn has_any_tag(&self, names: &[String]) -> bool {
        self.tags.iter().any(|tag| names.contains(&tag.name))
    }

    pub fn tag_names(&self) -> Vec<String> {
        self.tags.iter().map(|tag| tag.name.clone()).collect()
    }
}

impl Record for CityRecord {
    fn id(&self) -> i32 {
        self.city.id
    }
}

impl Record for DestinationRecord {
    fn id(&self) -> i32 {
        self.destination.id
    }

    fn is_visible(&self) -> bool {
        self.destination.active
    }
}

impl Located for CityRecord {
    fn coordinate(&self) -> Coordinate {
        Coordinate {
            latitude: self.city.latitude,
            longitude: self.city.longitude,
        }
    }
}

impl Located for DestinationRecord {
    fn coordinate(&self) -> Coordinate {
        Coordinate {
            latitude: self.destination.latitude,
            longitude: self.destination.longitude,
        }
    }
}

/// Case-insensitive first, exact second, so the order is total.
pub fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CitySort {
    Id,
    Name,
    Region,
    CreatedAt,
    UpdatedAt,
}

impl SortField for CitySort {
    const DEFAULT: Self = CitySort::Name;

    fn parse(name: &str) -> Option<Self> {
        match name {
            "id" => Some(CitySort::Id),
            "name" => Some(CitySort::Name),
            "region" => Some(CitySort::Region),
            "createdAt" | "created_at" => Some(CitySort::CreatedAt),
            "updatedAt" | "updated_at" => Some(CitySort::UpdatedAt),
            _ => None,
        }
    }

    fn names() -> &'static [&'static str] {
        &["id", "name", "region", "createdAt", "updatedAt"]
    }
}

impl Sortable<CitySort> for CityRecord {
    fn compare_by(&self, other: &Self, field: CitySort) -> Ordering {
        let (a, b) = (&self.city, &other.city);
        match field {
            CitySort::Id => a.id.cmp(&b.id),
            CitySort::Name => compare_text(&a.name, &b.name),
            CitySort::Region => compare_text(&a.region, &b.region),
            CitySort::CreatedAt => a.created_at.cmp(&b.created_at),
            CitySort::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestinationSort {
    Id,
    Name,
    Type,
    Price,
    AverageRating,
    ReviewCount,
    CreatedAt,
    UpdatedAt,
}

impl SortField for DestinationSort {
    const DEFAULT: Self = DestinationSort::Name;

    fn parse(name: &str) -> Option<Self> {
        match name {
            "id" => Some(DestinationSort::Id),
            "name" => Some(DestinationSort::Name),
            "type" | "category" => Some(DestinationSort::Type),
            "price" => Some(DestinationSort::Price),
            "averageRating" | "average_rating" | "rating" => Some(DestinationSort::AverageRating),
            "reviewCount" | "review_count" => Some(DestinationSort::ReviewCount),
            "createdAt" | "created_at" => Some(DestinationSort::CreatedAt),
            "updatedAt" | "updated_at" => Some(DestinationSort::UpdatedAt),
            _ => None,
        }
    }

    fn names() -> &'static [&'static str] {
        &[
            "id",
            "name",
            "type",
            "price",
            "averageRating",
            "reviewCount",
            "createdAt",
            "updatedAt",
        ]
    }
}

impl Sortable<DestinationSort> for DestinationRecord {
    fn compare_by(&self, other: &Self, field: DestinationSort) -> Ordering {
        let (a, b) = (&self.destination, &other.destination);
        match field {
            DestinationSort::Id => a.id.cmp(&b.id),
            DestinationSort::Name => compare_text(&a.name, &b.name),
            DestinationSort::Type => a.category.as_str().cmp(b.category.as_str()),
            // Unpriced destinations come first in ascending order.
            DestinationSort::Price => a.price.cmp(&b.price),
            DestinationSort::AverageRating => a.average_rating.total_cmp(&b.average_rating),
            DestinationSort::ReviewCount => a.review_count.cmp(&b.review_count),
            DestinationSort::CreatedAt => a.created_at.cmp(&b.created_at),
            DestinationSort::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        }
    }
}

/// Popularity order: rating, then review count, both descending, then name.
pub fn compare_popularity(a: &DestinationRecord, b: &DestinationRecord) -> Ordering {
    let (a, b) = (&a.destination, &b.destination);
    b.average_rating
        .total_cmp(&a.average_rating)
        .then_with(|| b.review_count.cmp(&a.review_count))
        .then_with(|| compare_text(&a.name, &b.name))
}
