// src/navigation/reconciler.rs
//
// Top-level orchestration. One position update in, at most one
// GuidanceEvent out; the presentation layer consumes the returned value
// instead of the engine reaching into view state.

use crate::error::GuidanceError;
use crate::geo::GeoPoint;
use crate::navigation::scheduler::AnnouncementScheduler;
use crate::navigation::step_tracker;
use crate::preference::{LanePredictor, SegmentId, UsageHistory};
use crate::types::{Config, GuidanceEvent, LaneHint, MatchingConfig, Route};
use chrono::{DateTime, Local};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavPhase {
    Idle,
    Navigating,
}

pub struct GuidanceReconciler {
    matching: MatchingConfig,
    history: UsageHistory,
    predictor: LanePredictor,
    scheduler: AnnouncementScheduler,

    phase: NavPhase,
    route: Option<Route>,
    current_step_index: usize,
    last_announcement_at: Option<DateTime<Local>>,
}

impl GuidanceReconciler {
    pub fn new(config: &Config, history: UsageHistory) -> Self {
        Self {
            matching: config.matching.clone(),
            history,
            predictor: LanePredictor::new(config.prediction.clone()),
            scheduler: AnnouncementScheduler::new(config.announcement.clone()),
            phase: NavPhase::Idle,
            route: None,
            current_step_index: 0,
            last_announcement_at: None,
        }
    }

    pub fn phase(&self) -> NavPhase {
        self.phase
    }

    pub fn history(&self) -> &UsageHistory {
        &self.history
    }

    /// Begin navigating `route`. Starting over an active route replaces it.
    pub fn start(&mut self, route: Route) {
        info!("Navigation started: {} steps", route.steps.len());
        self.route = Some(route);
        self.phase = NavPhase::Navigating;
        self.current_step_index = 0;
        self.last_announcement_at = None;
    }

    /// Leave navigation and clear all live state. Safe to call at any time,
    /// including when nothing is active.
    pub fn stop(&mut self) {
        if self.phase == NavPhase::Idle {
            debug!("Stop requested while idle");
            return;
        }
        info!("Navigation stopped");
        self.phase = NavPhase::Idle;
        self.route = None;
        self.current_step_index = 0;
        self.last_announcement_at = None;
    }

    /// Process one position fix.
    ///
    /// Refreshes the tracked step, looks up a learned segment near the
    /// vehicle for a lane prediction, and lets the scheduler gate the
    /// announcement. Returns `Ok(None)` while idle; an unusable route
    /// surfaces as `EmptyRoute` without emitting an event.
    pub fn on_position(
        &mut self,
        point: &GeoPoint,
        now: DateTime<Local>,
    ) -> Result<Option<GuidanceEvent>, GuidanceError> {
        if self.phase == NavPhase::Idle {
            debug!("Position update ignored: navigation inactive");
            return Ok(None);
        }
        let Some(route) = self.route.as_ref() else {
            return Ok(None);
        };

        let matched = step_tracker::locate(route, point)?;
        if matched.step_index != self.current_step_index {
            debug!(
                "Tracked step {} -> {} ({:.0}m)",
                self.current_step_index, matched.step_index, matched.distance_m
            );
        }
        self.current_step_index = matched.step_index;

        let preferred_lane = self
            .history
            .find_nearby(point, self.matching.radius_m)
            .and_then(|seg| self.predictor.predict(&self.history, seg, now));

        let should_announce =
            self.scheduler
                .should_announce(matched.distance_m, self.last_announcement_at, now);

        // Cues speak the maneuver being approached, distance-prefixed.
        let announcement = should_announce
            .then(|| compose_announcement(matched.distance_m, &matched.current.instruction));

        if let Some(text) = &announcement {
            info!("🔊 {}", text);
            self.last_announcement_at = Some(now);
        }

        Ok(Some(GuidanceEvent {
            step_index: matched.step_index,
            instruction: matched.current.instruction.clone(),
            next_instruction: matched.next.map(|s| s.instruction.clone()),
            distance_to_next_step_m: matched.distance_m,
            preferred_lane,
            should_announce,
            announcement,
        }))
    }

    /// Explicit "lane chosen" signal from the host.
    ///
    /// Keys the usage store by the learned segment near `point` when one
    /// exists, otherwise mints a segment from the tracked step's geometry.
    pub fn record_lane_choice(
        &mut self,
        point: &GeoPoint,
        lane: i32,
        successful: bool,
        now: DateTime<Local>,
    ) {
        if self.phase == NavPhase::Idle {
            debug!("Lane choice ignored: navigation inactive");
            return;
        }

        let segment = match self.history.find_nearby(point, self.matching.radius_m) {
            Some(seg) => seg.clone(),
            None => match self.mint_segment() {
                Some(seg) => seg,
                None => {
                    debug!("Lane choice ignored: no geometry to identify a segment");
                    return;
                }
            },
        };

        self.history.record(&segment, lane, successful, now);
    }

    /// Segment identity for the tracked step, built from its polyline
    /// endpoints and the configured default lane count.
    fn mint_segment(&self) -> Option<SegmentId> {
        let route = self.route.as_ref()?;
        let step = route.steps.get(self.current_step_index)?;
        let start = step.polyline.first()?;
        let end = step.polyline.last()?;
        Some(SegmentId::new(
            *start,
            *end,
            self.matching.default_lane_count,
            None,
        ))
    }
}

/// Relative direction from the occupied lane toward the preferred one.
pub fn lane_hint(current_lane: i32, preferred_lane: i32) -> Option<LaneHint> {
    match preferred_lane.cmp(&current_lane) {
        std::cmp::Ordering::Less => Some(LaneHint::Left),
        std::cmp::Ordering::Greater => Some(LaneHint::Right),
        std::cmp::Ordering::Equal => None,
    }
}

/// "In N meters/X.X kilometers, <instruction>", with a lane-side suffix when
/// the instruction names a turn direction.
fn compose_announcement(distance_m: f64, instruction: &str) -> String {
    let mut text = if distance_m > 1000.0 {
        let km = (distance_m / 100.0).round() / 10.0;
        format!("In {} kilometers, {}", km, instruction)
    } else {
        format!("In {} meters, {}", distance_m.round() as i64, instruction)
    };

    if instruction.contains("right") {
        text.push_str(" Use the right lane.");
    } else if instruction.contains("left") {
        text.push_str(" Use the left lane.");
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RouteStep;
    use chrono::{Duration, TimeZone};

    fn config(dir: &tempfile::TempDir) -> Config {
        Config {
            matching: MatchingConfig::default(),
            prediction: Default::default(),
            announcement: Default::default(),
            storage: crate::types::StorageConfig {
                history_path: dir
                    .path()
                    .join("history.json")
                    .to_string_lossy()
                    .into_owned(),
            },
            replay: crate::types::ReplayConfig {
                drive_path: String::new(),
            },
            logging: crate::types::LoggingConfig {
                level: "off".to_string(),
            },
        }
    }

    fn reconciler(dir: &tempfile::TempDir) -> GuidanceReconciler {
        let cfg = config(dir);
        let history = UsageHistory::load(&cfg.storage.history_path);
        GuidanceReconciler::new(&cfg, history)
    }

    fn step(instruction: &str, points: &[GeoPoint]) -> RouteStep {
        RouteStep {
            instruction: instruction.to_string(),
            polyline: points.to_vec(),
        }
    }

    fn turn_route() -> Route {
        Route {
            steps: vec![
                step(
                    "turn right in 300m",
                    &[GeoPoint::new(48.15, 11.55), GeoPoint::new(48.152, 11.55)],
                ),
                step("arrive", &[GeoPoint::new(48.16, 11.56)]),
            ],
        }
    }

    fn monday(h: u32, m: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 3, 2, h, m, 0).unwrap()
    }

    #[test]
    fn test_stop_while_idle_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let mut r = reconciler(&dir);

        r.stop();
        r.stop();
        assert_eq!(r.phase(), NavPhase::Idle);
    }

    #[test]
    fn test_position_while_idle_emits_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut r = reconciler(&dir);

        let event = r
            .on_position(&GeoPoint::new(48.15, 11.55), monday(8, 0))
            .unwrap();
        assert!(event.is_none());
    }

    #[test]
    fn test_empty_route_surfaces_without_event() {
        let dir = tempfile::tempdir().unwrap();
        let mut r = reconciler(&dir);
        r.start(Route { steps: vec![] });

        let result = r.on_position(&GeoPoint::new(48.15, 11.55), monday(8, 0));
        assert!(matches!(result, Err(GuidanceError::EmptyRoute)));
    }

    #[test]
    fn test_first_update_announces_the_turn() {
        let dir = tempfile::tempdir().unwrap();
        let mut r = reconciler(&dir);
        r.start(turn_route());

        let event = r
            .on_position(&GeoPoint::new(48.15, 11.55), monday(8, 0))
            .unwrap()
            .unwrap();

        assert_eq!(event.step_index, 0);
        assert_eq!(event.instruction, "turn right in 300m");
        assert_eq!(event.next_instruction.as_deref(), Some("arrive"));
        assert!(event.distance_to_next_step_m < 1e-6);
        assert!(event.should_announce);

        // The approached maneuver mentions a right turn, so the cue steers
        // the driver into the right lane.
        let text = event.announcement.unwrap();
        assert!(text.starts_with("In 0 meters, turn right in 300m"), "got {text}");
        assert!(text.contains("right lane"));
    }

    #[test]
    fn test_turn_instruction_gets_a_lane_suffix() {
        let text = compose_announcement(150.0, "turn right onto Elm St");
        assert_eq!(text, "In 150 meters, turn right onto Elm St Use the right lane.");

        let text = compose_announcement(150.0, "turn left onto Oak St");
        assert!(text.ends_with("Use the left lane."));
    }

    #[test]
    fn test_kilometer_phrasing_beyond_1km() {
        let text = compose_announcement(1540.0, "continue onto the A9");
        assert_eq!(text, "In 1.5 kilometers, continue onto the A9");
    }

    #[test]
    fn test_second_update_within_spacing_is_silent() {
        let dir = tempfile::tempdir().unwrap();
        let mut r = reconciler(&dir);
        r.start(turn_route());

        let first = r
            .on_position(&GeoPoint::new(48.15, 11.55), monday(8, 0))
            .unwrap()
            .unwrap();
        assert!(first.should_announce);

        let second = r
            .on_position(&GeoPoint::new(48.15, 11.55), monday(8, 0) + Duration::seconds(5))
            .unwrap()
            .unwrap();
        assert!(!second.should_announce);
        assert!(second.announcement.is_none());
    }

    #[test]
    fn test_final_step_still_announces_arrival() {
        let dir = tempfile::tempdir().unwrap();
        let mut r = reconciler(&dir);
        r.start(Route {
            steps: vec![step("arrive", &[GeoPoint::new(48.16, 11.56)])],
        });

        let event = r
            .on_position(&GeoPoint::new(48.16, 11.56), monday(8, 0))
            .unwrap()
            .unwrap();
        assert!(event.should_announce);
        assert_eq!(event.announcement.as_deref(), Some("In 0 meters, arrive"));
        assert!(event.next_instruction.is_none());
    }

    #[test]
    fn test_recorded_lane_choice_feeds_the_prediction() {
        let dir = tempfile::tempdir().unwrap();
        let mut r = reconciler(&dir);
        r.start(turn_route());

        let at_turn = GeoPoint::new(48.15, 11.55);

        // No history yet: no preferred lane.
        let event = r.on_position(&at_turn, monday(8, 0)).unwrap().unwrap();
        assert_eq!(event.preferred_lane, None);

        // Driver picks lane 1 here; a segment is minted from the tracked
        // step's geometry.
        r.record_lane_choice(&at_turn, 1, true, monday(8, 0));
        assert_eq!(r.history().segment_count(), 1);

        // Half an hour later the same spot predicts the recorded lane.
        let event = r.on_position(&at_turn, monday(8, 30)).unwrap().unwrap();
        assert_eq!(event.preferred_lane, Some(1));
    }

    #[test]
    fn test_lane_choice_while_idle_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let mut r = reconciler(&dir);

        r.record_lane_choice(&GeoPoint::new(48.15, 11.55), 1, true, monday(8, 0));
        assert_eq!(r.history().segment_count(), 0);
    }

    #[test]
    fn test_stop_clears_live_state() {
        let dir = tempfile::tempdir().unwrap();
        let mut r = reconciler(&dir);
        r.start(turn_route());
        r.on_position(&GeoPoint::new(48.15, 11.55), monday(8, 0))
            .unwrap();

        r.stop();
        assert_eq!(r.phase(), NavPhase::Idle);
        let event = r
            .on_position(&GeoPoint::new(48.15, 11.55), monday(8, 1))
            .unwrap();
        assert!(event.is_none());
    }

    #[test]
    fn test_lane_hint_directions() {
        assert_eq!(lane_hint(2, 0), Some(LaneHint::Left));
        assert_eq!(lane_hint(0, 2), Some(LaneHint::Right));
        assert_eq!(lane_hint(1, 1), None);
    }
}
