// src/main.rs

mod config;
mod error;
mod geo;
mod navigation;
mod preference;
mod types;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use crate::geo::GeoPoint;
use navigation::GuidanceReconciler;
use preference::UsageHistory;
use serde::Deserialize;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use types::{Config, Route};

/// A recorded drive: the route the navigation collaborator produced plus
/// the position fixes the location collaborator delivered. Stands in for
/// both external feeds so the whole engine can be exercised offline.
#[derive(Debug, Deserialize)]
struct DriveFixture {
    route: Route,
    fixes: Vec<Fix>,
}

#[derive(Debug, Deserialize)]
struct Fix {
    lat: f64,
    lon: f64,
    at: DateTime<Local>,
    /// Lane the driver settled into at this fix, when known.
    chosen_lane: Option<i32>,
}

fn main() -> Result<()> {
    let config = Config::load("config.yaml")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone())),
        )
        .init();

    info!("🛣️  Lane Guidance Engine starting");

    let history = UsageHistory::load(&config.storage.history_path);
    info!(
        "✓ Lane history loaded: {} learned segment(s)",
        history.segment_count()
    );

    let drive = load_drive(&config.replay.drive_path)?;
    info!(
        "✓ Drive fixture loaded: {} steps, {} fixes",
        drive.route.steps.len(),
        drive.fixes.len()
    );

    let mut reconciler = GuidanceReconciler::new(&config, history);
    reconciler.start(drive.route);

    let mut announced = 0usize;
    for fix in &drive.fixes {
        let point = GeoPoint::new(fix.lat, fix.lon);

        match reconciler.on_position(&point, fix.at) {
            Ok(Some(event)) => {
                info!(
                    "Step {} \"{}\" at {:.0}m, preferred lane: {}",
                    event.step_index,
                    event.instruction,
                    event.distance_to_next_step_m,
                    event
                        .preferred_lane
                        .map(|l| l.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                );
                if event.should_announce {
                    announced += 1;
                }
            }
            Ok(None) => {}
            Err(e) => error!("Position update failed: {}", e),
        }

        if let Some(lane) = fix.chosen_lane {
            reconciler.record_lane_choice(&point, lane, true, fix.at);
        }
    }

    reconciler.stop();

    info!(
        "✓ Replay finished: {} announcement(s), {} learned segment(s)",
        announced,
        reconciler.history().segment_count()
    );

    Ok(())
}

fn load_drive(path: &str) -> Result<DriveFixture> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading drive fixture from {path}"))?;
    let drive: DriveFixture =
        serde_yaml::from_str(&contents).with_context(|| format!("parsing drive fixture {path}"))?;
    Ok(drive)
}
