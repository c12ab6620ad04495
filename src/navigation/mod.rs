// src/navigation/mod.rs
//
// Live navigation subsystem.
//
// Signal flow:
//   position fix → step_tracker (nearest step + distance) ─┐
//   usage history → predictor (preferred lane) ────────────┼→ reconciler → GuidanceEvent
//   scheduler (cue gating) ────────────────────────────────┘
//
// Orchestrated by reconciler::GuidanceReconciler.

pub mod reconciler;
pub mod scheduler;
pub mod step_tracker;

// Re-exports for ergonomic access from main.rs
pub use reconciler::{lane_hint, GuidanceReconciler, NavPhase};
pub use scheduler::AnnouncementScheduler;
pub use step_tracker::{locate, StepMatch};
