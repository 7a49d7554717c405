use serde::{Deserialize, Serialize};

use crate::error::{AppResult, Violations};
use crate::query::executor::Record;
use crate::utils::geo::{is_valid_latitude, is_valid_longitude, Coordinate};

pub const MAX_NEARBY_LIMIT: i64 = 100;

pub trait Located: Record {
    fn coordinate(&self) -> Coordinate;
}

/// Raw "nearby" parameters as they arrive from a caller.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProximityParams {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub radius_km: Option<f64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProximityQuery {
    pub center: Coordinate,
    pub radius_km: f64,
    pub limit: Option<usize>,
}

impl ProximityQuery {
    /// Center and radius are mandatory; a missing or invalid one fails
    /// instead of widening the search.
    pub fn resolve(params: &ProximityParams, max_radius_km: f64) -> AppResult<Self> {
        let mut violations = Violations::new();
        let center = check_center(params.latitude, params.longitude, &mut violations);
        let radius_km = check_radius(params.radius_km, max_radius_km, &mut violations);

        if let Some(limit) = params.limit {
            violations.check(
                (1..=MAX_NEARBY_LIMIT).contains(&limit),
                "limit",
                "Limit must be between 1 and 100",
            );
        }

        violations.finish()?;

        Ok(Self {
            center: center.unwrap_or(Coordinate {
                latitude: 0.0,
                longitude: 0.0,
            }),
            radius_km: radius_km.unwrap_or(0.0),
            limit: params.limit.map(|limit| limit as usize),
        })
    }

    /// Distance from the center when `point` is inside the radius.
    pub fn distance_if_within(&self, point: &Coordinate) -> Option<f64> {
        let distance = self.center.distance_to(point);
        (distance <= self.radius_km).then_some(distance)
    }
}

pub(crate) fn check_center(
    latitude: Option<f64>,
    longitude: Option<f64>,
    violations: &mut Violations,
) -> Option<Coordinate> {
    match latitude {
        None => {
            violations.add("latitude", "Latitude is required");
        }
        Some(lat) => {
            violations.check(
                is_valid_latitude(lat),
                "latitude",
                "Latitude must be between -90 and 90",
            );
        }
    }
    match longitude {
        None => {
            violations.add("longitude", "Longitude is required");
        }
        Some(lng) => {
            violations.check(
                is_valid_longitude(lng),
                "longitude",
                "Longitude must be between -180 and 180",
            );
        }
    }

    let (latitude, longitude) = (latitude?, longitude?);
    (is_valid_latitude(latitude) && is_valid_longitude(longitude)).then_some(Coordinate {
        latitude,
        longitude,
    })
}

pub(crate) fn check_radius(
    radius_km: Option<f64>,
    max_radius_km: f64,
    violations: &mut Violations,
) -> Option<f64> {
    let Some(radius) = radius_km else {
        violations.add("radiusKm", "Radius is required");
        return None;
    };
    let valid = radius.is_finite() && radius > 0.0 && radius <= max_radius_km;
    if !valid {
        violations.add(
            "radiusKm",
            format!("Radius must be greater than 0 and at most {} km", max_radius_km),
        );
    }
    valid.then_some(radius)
}

/// A record paired with its distance from the search center.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Nearby<T> {
    pub item: T,
    pub distance_km: f64,
}

/// Visible records within the radius, closest first. Equal distances keep
/// id order.
pub fn search<T: Located>(records: Vec<T>, query: &ProximityQuery) -> Vec<Nearby<T>> {
    let mut found: Vec<Nearby<T>> = records
        .into_iter()
        .filter(|record| record.is_visible())
        .filter_map(|record| {
            query
                .distance_if_within(&record.coordinate())
                .map(|distance_km| Nearby {
                    item: record,
                    distance_km,
                })
        })
        .collect();

    found.sort_by(|a, b| {
        a.distance_km
            .total_cmp(&b.distance_km)
            .then_with(|| a.item.id().cmp(&b.item.id()))
    });

    if let Some(limit) = query.limit {
        found.truncate(limit);
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::query::records::fixtures::{city, DestinationBuilder};
    use crate::query::records::DestinationRecord;

    const CHEFCHAOUEN: (f64, f64) = (35.1681, -5.2636);
    const MARRAKECH: (f64, f64) = (31.6295, -7.9811);

    fn params(lat: Option<f64>, lng: Option<f64>, radius: Option<f64>) -> ProximityParams {
        ProximityParams {
            latitude: lat,
            longitude: lng,
            radius_km: radius,
            limit: None,
        }
    }

    fn query(center: (f64, f64), radius: f64) -> ProximityQuery {
        ProximityQuery::resolve(&params(Some(center.0), Some(center.1), Some(radius)), 500.0)
            .unwrap()
    }

    fn catalog() -> Vec<DestinationRecord> {
        let chefchaouen = city(1, "Chefchaouen", CHEFCHAOUEN.0, CHEFCHAOUEN.1);
        let marrakech = city(2, "Marrakech", MARRAKECH.0, MARRAKECH.1);
        vec![
            DestinationBuilder::new(1, "Blue Pearl Medina", &chefchaouen).build(),
            DestinationBuilder::new(2, "Ras El Maa", &chefchaouen)
                .at(35.1712, -5.2597)
                .build(),
            DestinationBuilder::new(3, "Closed Riad", &chefchaouen).inactive().build(),
            DestinationBuilder::new(4, "Akchour Falls", &chefchaouen)
                .at(35.2386, -5.1764)
                .build(),
            DestinationBuilder::new(5, "Jemaa el-Fnaa", &marrakech)
                .at(31.6258, -7.9890)
                .build(),
        ]
    }

    fn ids<T: Located>(found: &[Nearby<T>]) -> Vec<i32> {
        found.iter().map(|n| n.item.id()).collect()
    }

    #[test]
    fn test_blue_pearl_found_at_its_own_coordinates() {
        let found = search(catalog(), &query(CHEFCHAOUEN, 1.0));
        assert_eq!(ids(&found), vec![1, 2]);
        assert_eq!(found[0].item.destination.name, "Blue Pearl Medina");
        assert!(found[0].distance_km < 1e-6);
    }

    #[test]
    fn test_nothing_near_marrakech_center_within_one_km() {
        let chefchaouen = city(1, "Chefchaouen", CHEFCHAOUEN.0, CHEFCHAOUEN.1);
        let only_blue_pearl =
            vec![DestinationBuilder::new(1, "Blue Pearl Medina", &chefchaouen).build()];
        assert!(search(only_blue_pearl, &query(MARRAKECH, 1.0)).is_empty());
    }

    #[test]
    fn test_results_sorted_by_distance_and_exclude_inactive() {
        let found = search(catalog(), &query(CHEFCHAOUEN, 50.0));
        assert_eq!(ids(&found), vec![1, 2, 4]);
        assert!(found.windows(2).all(|w| w[0].distance_km <= w[1].distance_km));
        assert!(found.iter().all(|n| n.distance_km <= 50.0));
    }

    #[test]
    fn test_larger_radius_is_superset() {
        let mut previous: Vec<i32> = Vec::new();
        for radius in [0.5, 1.0, 10.0, 100.0, 500.0] {
            let current = ids(&search(catalog(), &query(CHEFCHAOUEN, radius)));
            assert!(previous.iter().all(|id| current.contains(id)), "radius {radius}");
            previous = current;
        }
        assert_eq!(previous, vec![1, 2, 4, 5]);
    }

    #[test]
    fn test_limit_truncates_closest_first() {
        let mut p = params(Some(CHEFCHAOUEN.0), Some(CHEFCHAOUEN.1), Some(400.0));
        p.limit = Some(2);
        let q = ProximityQuery::resolve(&p, 500.0).unwrap();
        assert_eq!(ids(&search(catalog(), &q)), vec![1, 2]);
    }

    #[test]
    fn test_missing_center_or_radius_is_rejected() {
        let result = ProximityQuery::resolve(&params(None, None, None), 200.0);
        match result {
            Err(AppError::Validation(errors)) => {
                assert!(errors.contains_key("latitude"));
                assert!(errors.contains_key("longitude"));
                assert!(errors.contains_key("radiusKm"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        for p in [
            params(Some(91.0), Some(0.0), Some(10.0)),
            params(Some(0.0), Some(-181.0), Some(10.0)),
            params(Some(0.0), Some(0.0), Some(0.0)),
            params(Some(0.0), Some(0.0), Some(-5.0)),
            params(Some(0.0), Some(0.0), Some(201.0)),
            params(Some(0.0), Some(0.0), Some(f64::NAN)),
        ] {
            assert!(ProximityQuery::resolve(&p, 200.0).is_err(), "{:?}", p);
        }

        let mut bad_limit = params(Some(0.0), Some(0.0), Some(10.0));
        bad_limit.limit = Some(0);
        assert!(ProximityQuery::resolve(&bad_limit, 200.0).is_err());
    }
}
