// src/error.rs

use thiserror::Error;

/// Errors surfaced by the guidance engine.
///
/// None of these are fatal to the host: `EmptyRoute` is returned to the
/// caller of the offending update, the storage variants are recovered
/// internally (in-memory state stays authoritative, next write retries).
#[derive(Debug, Error)]
pub enum GuidanceError {
    #[error("route has no usable steps")]
    EmptyRoute,

    #[error("failed to persist lane usage history: {0}")]
    Persistence(#[from] std::io::Error),

    #[error("failed to decode lane usage history: {0}")]
    Decode(#[from] serde_json::Error),
}
