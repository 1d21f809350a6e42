//! Alert stream event construction and degraded-mode broadcasts.

use serde::Serialize;
use tracing::{info, warn};

use crate::{
    dto::sse::{ProgressAlertEvent, ServerEvent, SystemStatus, WalkAlertEvent},
    state::SharedState,
};

/// Event name for progress and spawn alerts.
pub const EVENT_PROGRESS: &str = "progress";
/// Event name for planned-walk alerts.
pub const EVENT_WALK: &str = "walk";
/// Event name for degraded-mode transitions.
pub const EVENT_SYSTEM_STATUS: &str = "system_status";

/// Mirror a progress or spawn alert onto the alert stream.
pub fn broadcast_progress_alert(state: &SharedState, payload: ProgressAlertEvent) {
    send_alert_event(state, EVENT_PROGRESS, &payload);
}

/// Mirror a planned walk alert onto the alert stream.
pub fn broadcast_walk_alert(state: &SharedState, payload: WalkAlertEvent) {
    send_alert_event(state, EVENT_WALK, &payload);
}

/// Record the outcome of a status fetch, announcing transitions in and out of degraded mode.
pub fn broadcast_degraded(state: &SharedState, degraded: bool) {
    if !state.update_degraded(degraded) {
        return;
    }

    if degraded {
        warn!("status polls failing; entering degraded mode");
    } else {
        info!("status snapshot received; leaving degraded mode");
    }
    send_alert_event(state, EVENT_SYSTEM_STATUS, &SystemStatus { degraded });
}

fn send_alert_event(state: &SharedState, event: &str, payload: &impl Serialize) {
    match ServerEvent::json(Some(event.to_string()), payload) {
        Ok(event) => state.alerts().broadcast(event),
        Err(err) => warn!(event, error = %err, "failed to serialize alert SSE payload"),
    }
}
