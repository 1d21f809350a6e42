//! Health computation.

use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Report `degraded` while the most recent status poll failed.
pub fn health_status(state: &SharedState) -> HealthResponse {
    let degraded = state.is_degraded();
    if degraded {
        warn!("health check while status polls are failing");
    }

    HealthResponse::new(degraded, state.walk_source().is_some())
}
