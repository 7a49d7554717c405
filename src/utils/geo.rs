use serde::{Deserialize, Serialize};

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        distance_km(self.latitude, self.longitude, other.latitude, other.longitude)
    }
}

pub fn is_valid_latitude(latitude: f64) -> bool {
    latitude.is_finite() && (-90.0..=90.0).contains(&latitude)
}

pub fn is_valid_longitude(longitude: f64) -> bool {
    longitude.is_finite() && (-180.0..=180.0).contains(&longitude)
}

/// Great-circle distance between two coordinates in kilometers
/// (spherical law of cosines).
pub fn distance_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    if lat1 == lat2 && lng1 == lng2 {
        return 0.0;
    }

    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lng = lng2.to_radians() - lng1.to_radians();

    let cos_angle = lat1_rad.cos() * lat2_rad.cos() * delta_lng.cos()
        + lat1_rad.sin() * lat2_rad.sin();

    // Rounding can push the argument just outside acos' domain.
    EARTH_RADIUS_KM * cos_angle.clamp(-1.0, 1.0).acos()
}
