// src/preference/segment.rs

use crate::geo::GeoPoint;
use serde::{Deserialize, Serialize};

/// Canonical identity of a stretch of road.
///
/// Two segments with identical endpoints, lane count and name are the same
/// key even when constructed independently; proximity tolerance lives in
/// `UsageHistory::find_nearby`, not here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SegmentId {
    pub start: GeoPoint,
    pub end: GeoPoint,
    pub lane_count: u8,
    pub name: Option<String>,
}

impl SegmentId {
    pub fn new(start: GeoPoint, end: GeoPoint, lane_count: u8, name: Option<String>) -> Self {
        Self {
            start,
            end,
            lane_count,
            name,
        }
    }
}
