// src/navigation/scheduler.rs
//
// Time/distance gating for spoken cues. Guarantees a close-range cue and
// periodic reminders further out without letting the voice channel spam.

use crate::types::AnnouncementConfig;
use chrono::{DateTime, Duration, Local};
use tracing::debug;

pub struct AnnouncementScheduler {
    config: AnnouncementConfig,
}

impl AnnouncementScheduler {
    pub fn new(config: AnnouncementConfig) -> Self {
        Self { config }
    }

    /// Decide whether a cue should fire at `distance_m` from the next
    /// maneuver.
    ///
    /// The first cue of a navigation session always fires. After that the
    /// minimum interval must have elapsed, and the distance must either be
    /// in close range or sit on a ~100 m band inside the reminder range.
    /// The band check compares `distance % band_width` against a narrow
    /// tolerance; depending on sampling distances it can skip a band. That
    /// matches the shipped behavior and is kept as-is.
    pub fn should_announce(
        &self,
        distance_m: f64,
        last_announced_at: Option<DateTime<Local>>,
        now: DateTime<Local>,
    ) -> bool {
        let Some(last) = last_announced_at else {
            return true;
        };

        let elapsed = now.signed_duration_since(last);
        if elapsed < Duration::seconds(self.config.min_interval_secs) {
            debug!(
                "Cue suppressed: {}s since last announcement",
                elapsed.num_seconds()
            );
            return false;
        }

        distance_m <= self.config.close_range_m
            || (distance_m <= self.config.band_range_m
                && distance_m % self.config.band_width_m < self.config.band_tolerance_m)
    }
}
