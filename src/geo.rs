// src/geo.rs

use geo::{Distance, Haversine, Point};
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// A WGS84 coordinate.
///
/// Equality and hashing are bitwise over both fields so the point can key a
/// map exactly as constructed. Fuzzy matching happens at lookup time
/// (`UsageHistory::find_nearby`), never at the key level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl PartialEq for GeoPoint {
    fn eq(&self, other: &Self) -> bool {
        self.lat.to_bits() == other.lat.to_bits() && self.lon.to_bits() == other.lon.to_bits()
    }
}

impl Eq for GeoPoint {}

impl Hash for GeoPoint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.lat.to_bits());
        state.write_u64(self.lon.to_bits());
    }
}

/// Great-circle distance between two coordinates in meters.
pub fn distance_m(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let p1 = Point::new(a.lon, a.lat);
    let p2 = Point::new(b.lon, b.lat);
    Haversine::distance(p1, p2)
}
