// src/preference/history.rs
//
// Per-segment lane usage history with whole-store persistence. The store is
// the single owner of the persisted blob: loaded once at construction,
// rewritten after every append.

use crate::error::GuidanceError;
use crate::geo::{self, GeoPoint};
use crate::preference::segment::SegmentId;
use chrono::{DateTime, Datelike, Local, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// One historical instance of the driver occupying a lane on a segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub timestamp: DateTime<Utc>,
    /// 0-indexed from one side of the road.
    pub lane_position: i32,
    /// 0-23, local calendar at record time.
    pub hour_of_day: u32,
    /// 1-7 with Sunday = 1, local calendar at record time.
    pub day_of_week: u32,
    pub was_successful: bool,
}

/// Mapping from segment identity to its usage records, in append order.
///
/// Per-segment records carry non-decreasing timestamps since appends always
/// use the current clock.
pub struct UsageHistory {
    entries: HashMap<SegmentId, Vec<UsageRecord>>,
    storage_path: PathBuf,
}

impl UsageHistory {
    /// Load the persisted history, or start empty when the blob is missing
    /// or unreadable. Never fails: a corrupt blob costs the learned
    /// preferences, not the session.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let storage_path = path.into();

        let entries = match read_entries(&storage_path) {
            Ok(entries) => entries,
            Err(GuidanceError::Persistence(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No persisted lane history at {}", storage_path.display());
                HashMap::new()
            }
            Err(e) => {
                warn!(
                    "Lane history at {} is unreadable, starting empty: {}",
                    storage_path.display(),
                    e
                );
                HashMap::new()
            }
        };

        Self {
            entries,
            storage_path,
        }
    }

    /// Record a lane choice made at `now` (the caller's wall clock), then
    /// persist the whole store. A failed write is logged and swallowed: the
    /// in-memory state stays authoritative and the next successful write
    /// covers it.
    pub fn record(
        &mut self,
        segment: &SegmentId,
        lane: i32,
        successful: bool,
        now: DateTime<Local>,
    ) {
        let record = UsageRecord {
            timestamp: now.with_timezone(&Utc),
            lane_position: lane,
            hour_of_day: now.hour(),
            day_of_week: now.weekday().number_from_sunday(),
            was_successful: successful,
        };

        debug!(
            "Recording lane {} (successful={}) at hour {} weekday {}",
            lane, successful, record.hour_of_day, record.day_of_week
        );

        self.entries
            .entry(segment.clone())
            .or_default()
            .push(record);

        if let Err(e) = self.save() {
            warn!("Keeping lane history in memory only: {}", e);
        }
    }

    /// All records for a segment, in append order. Empty for unknown keys.
    pub fn records(&self, segment: &SegmentId) -> &[UsageRecord] {
        self.entries
            .get(segment)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Find a learned segment with an endpoint within `radius_m` of `point`,
    /// nearest endpoint first. Strictly inside the radius; the key itself is
    /// never matched fuzzily.
    pub fn find_nearby(&self, point: &GeoPoint, radius_m: f64) -> Option<&SegmentId> {
        self.entries
            .keys()
            .filter_map(|seg| {
                let d = geo::distance_m(point, &seg.start).min(geo::distance_m(point, &seg.end));
                (d < radius_m).then_some((seg, d))
            })
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(seg, _)| seg)
    }

    pub fn segment_count(&self) -> usize {
        self.entries.len()
    }

    /// Drop all entries and the persisted blob.
    pub fn clear(&mut self) {
        self.entries.clear();
        if let Err(e) = fs::remove_file(&self.storage_path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(
                    "Could not remove lane history at {}: {}",
                    self.storage_path.display(),
                    e
                );
            }
        }
    }

    /// Serialize the full store to its storage path.
    ///
    /// Encoded as an array of (segment, records) pairs: a JSON object cannot
    /// key on a compound struct, and the pair form round-trips the key field
    /// by field.
    pub fn save(&self) -> Result<(), GuidanceError> {
        let pairs: Vec<(&SegmentId, &Vec<UsageRecord>)> = self.entries.iter().collect();
        let encoded = serde_json::to_vec(&pairs).map_err(std::io::Error::from)?;
        fs::write(&self.storage_path, encoded)?;
        Ok(())
    }
}

fn read_entries(path: &Path) -> Result<HashMap<SegmentId, Vec<UsageRecord>>, GuidanceError> {
    let raw = fs::read_to_string(path)?;
    let pairs: Vec<(SegmentId, Vec<UsageRecord>)> = serde_json::from_str(&raw)?;
    Ok(pairs.into_iter().collect())
}
