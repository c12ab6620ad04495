// src/preference/mod.rs
//
// Lane preference learning subsystem.
//
// Signal flow:
//   lane choice → history (record, full-store rewrite)
//   position    → history.find_nearby → predictor → preferred lane
//
// The store is the single writer of the persisted blob; the predictor only
// reads through it.

pub mod history;
pub mod predictor;
pub mod segment;

pub use history::{UsageHistory, UsageRecord};
pub use predictor::LanePredictor;
pub use segment::SegmentId;
