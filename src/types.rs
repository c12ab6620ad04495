use crate::geo::GeoPoint;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub matching: MatchingConfig,
    pub prediction: PredictionConfig,
    pub announcement: AnnouncementConfig,
    pub storage: StorageConfig,
    pub replay: ReplayConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Match radius around a segment endpoint in meters.
    pub radius_m: f64,
    /// Lane count assumed when minting a segment without road data.
    pub default_lane_count: u8,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            radius_m: 50.0,
            default_lane_count: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionConfig {
    /// Records within this many hours of the current hour are relevant.
    pub hour_window: i64,
    /// Records younger than this are relevant regardless of weekday.
    pub recency_days: i64,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            hour_window: 2,
            recency_days: 7,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnouncementConfig {
    /// Minimum spacing between spoken cues in seconds.
    pub min_interval_secs: i64,
    /// Always announce at or below this distance (meters).
    pub close_range_m: f64,
    /// Band announcements apply at or below this distance (meters).
    pub band_range_m: f64,
    pub band_width_m: f64,
    pub band_tolerance_m: f64,
}

impl Default for AnnouncementConfig {
    fn default() -> Self {
        Self {
            min_interval_secs: 10,
            close_range_m: 200.0,
            band_range_m: 500.0,
            band_width_m: 100.0,
            band_tolerance_m: 10.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub history_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayConfig {
    pub drive_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

/// One maneuver of a route, externally supplied and read-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteStep {
    pub instruction: String,
    pub polyline: Vec<GeoPoint>,
}

impl RouteStep {
    /// The point a step is located at for nearest-step search.
    pub fn anchor(&self) -> Option<&GeoPoint> {
        self.polyline.first()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    pub steps: Vec<RouteStep>,
}

/// Relative direction from an occupied lane toward the preferred one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LaneHint {
    Left,
    Right,
}

/// Per-position-update output of the reconciler.
///
/// Produced fresh on every update and handed to the rendering/voice
/// collaborators; never stored by the engine.
#[derive(Debug, Clone, Serialize)]
pub struct GuidanceEvent {
    pub step_index: usize,
    pub instruction: String,
    pub next_instruction: Option<String>,
    pub distance_to_next_step_m: f64,
    pub preferred_lane: Option<i32>,
    pub should_announce: bool,
    pub announcement: Option<String>,
}
