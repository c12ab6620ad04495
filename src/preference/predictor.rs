// src/preference/predictor.rs
//
// Contextual preferred-lane prediction: a frequency count over the
// "similar time of day, same weekday or recent" slice of a segment's
// history. Cheap enough to run on every position tick, and explainable.

use crate::preference::history::{UsageHistory, UsageRecord};
use crate::preference::segment::SegmentId;
use crate::types::PredictionConfig;
use chrono::{DateTime, Datelike, Duration, Local, Timelike, Utc};
use tracing::debug;

pub struct LanePredictor {
    config: PredictionConfig,
}

impl LanePredictor {
    pub fn new(config: PredictionConfig) -> Self {
        Self { config }
    }

    /// Predict the driver's habitual lane for `segment` under the time
    /// context of `now`. `None` when the segment has no history or no record
    /// survives the relevance filter.
    pub fn predict(
        &self,
        history: &UsageHistory,
        segment: &SegmentId,
        now: DateTime<Local>,
    ) -> Option<i32> {
        let records = history.records(segment);
        if records.is_empty() {
            return None;
        }

        let current_hour = now.hour();
        let current_day = now.weekday().number_from_sunday();
        let now_utc = now.with_timezone(&Utc);

        let relevant: Vec<&UsageRecord> = records
            .iter()
            .filter(|r| self.is_relevant(r, current_hour, current_day, now_utc))
            .collect();

        if relevant.is_empty() {
            return None;
        }

        let lane = most_frequent_lane(&relevant);
        debug!(
            "Predicted lane {} from {} of {} records",
            lane,
            relevant.len(),
            records.len()
        );
        Some(lane)
    }

    fn is_relevant(
        &self,
        record: &UsageRecord,
        current_hour: u32,
        current_day: u32,
        now_utc: DateTime<Utc>,
    ) -> bool {
        let hour_delta = (record.hour_of_day as i64 - current_hour as i64).abs();

        record.was_successful
            && hour_delta <= self.config.hour_window
            && (record.day_of_week == current_day
                || now_utc - record.timestamp <= Duration::days(self.config.recency_days))
    }
}

/// Most frequent lane among the given records. Ties go to the lane
/// encountered first in record order, so the result is stable for a fixed
/// history.
fn most_frequent_lane(records: &[&UsageRecord]) -> i32 {
    let mut counts: Vec<(i32, u32)> = Vec::new();
    for record in records {
        match counts
            .iter_mut()
            .find(|(lane, _)| *lane == record.lane_position)
        {
            Some((_, n)) => *n += 1,
            None => counts.push((record.lane_position, 1)),
        }
    }

    let mut best = counts[0];
    for &(lane, n) in &counts[1..] {
        if n > best.1 {
            best = (lane, n);
        }
    }
    best.0
}
