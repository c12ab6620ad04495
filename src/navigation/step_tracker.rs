// src/navigation/step_tracker.rs

use crate::error::GuidanceError;
use crate::geo::{self, GeoPoint};
use crate::types::{Route, RouteStep};

/// The route step nearest to a position, plus the step that follows it.
#[derive(Debug, Clone)]
pub struct StepMatch<'r> {
    pub step_index: usize,
    pub current: &'r RouteStep,
    pub next: Option<&'r RouteStep>,
    pub distance_m: f64,
}

/// Find the step whose anchor point is closest to `position`.
///
/// Steps without geometry cannot anchor a match and are skipped; a route
/// where no step has geometry is as unusable as one with no steps at all
/// and reports `EmptyRoute`.
pub fn locate<'r>(route: &'r Route, position: &GeoPoint) -> Result<StepMatch<'r>, GuidanceError> {
    let mut nearest: Option<(usize, f64)> = None;

    for (index, step) in route.steps.iter().enumerate() {
        let Some(anchor) = step.anchor() else {
            continue;
        };

        let distance = geo::distance_m(position, anchor);
        if nearest.map_or(true, |(_, best)| distance < best) {
            nearest = Some((index, distance));
        }
    }

    let (step_index, distance_m) = nearest.ok_or(GuidanceError::EmptyRoute)?;

    Ok(StepMatch {
        step_index,
        current: &route.steps[step_index],
        next: route.steps.get(step_index + 1),
        distance_m,
    })
}
