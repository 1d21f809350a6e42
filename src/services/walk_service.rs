//! Planned-walk polling with per-process deduplication.

use time::OffsetDateTime;
use tracing::{debug, info, warn};

use crate::{
    dto::sse::WalkAlertEvent,
    services::{messages, scheduler::TickOutcome, sse_events},
    state::{SharedState, walks::WALK_LOOKAHEAD},
};

/// Counters describing one completed walk tick.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WalkTickSummary {
    /// Walks returned by the API.
    pub listed: usize,
    /// Walks claimed and announced this tick.
    pub announced: usize,
    /// Alerts accepted by the chat platform.
    pub delivered: usize,
}

/// Run one walk tick against the current wall clock.
pub async fn poll_once(state: &SharedState) -> TickOutcome<WalkTickSummary> {
    poll_once_at(state, OffsetDateTime::now_utc()).await
}

/// Run one walk tick as if the current time were `now`.
pub async fn poll_once_at(
    state: &SharedState,
    now: OffsetDateTime,
) -> TickOutcome<WalkTickSummary> {
    let Some(source) = state.walk_source() else {
        return TickOutcome::Skipped;
    };
    let Ok(_gate) = state.walk_gate().try_lock() else {
        debug!("previous walk tick still running; skipping");
        return TickOutcome::Skipped;
    };

    let walks = match source.fetch().await {
        Ok(walks) => walks,
        Err(err) => {
            warn!(
                error = &err as &(dyn std::error::Error + 'static),
                timeout = err.is_timeout(),
                "planned walk fetch failed; skipping tick"
            );
            return TickOutcome::Failed;
        }
    };

    let filter = state.config().filter;
    let mut summary = WalkTickSummary {
        listed: walks.len(),
        ..WalkTickSummary::default()
    };

    for walk in walks
        .iter()
        .filter(|walk| walk.matches(&filter) && walk.starts_within(now, WALK_LOOKAHEAD))
    {
        // Claimed before sending: a failed send is not retried on a later tick.
        if !state.alerted_walks().claim(&walk.id) {
            continue;
        }
        summary.announced += 1;

        let minutes = (walk.starts_at - now).whole_minutes();
        info!(
            walk_id = %walk.id,
            region = walk.region_label(),
            ladder = walk.ladder.label(),
            core = walk.core.label(),
            reported_by = %walk.reported_by,
            confirmed = walk.confirmed,
            minutes,
            "planned walk upcoming"
        );

        let message = messages::walk_alert(walk);
        sse_events::broadcast_walk_alert(
            state,
            WalkAlertEvent {
                id: walk.id.clone(),
                region: walk.region,
                ladder: walk.ladder,
                core: walk.core,
                starts_at: walk.starts_at.unix_timestamp(),
                reported_by: walk.reported_by.clone(),
                confirmed: walk.confirmed,
                message: message.clone(),
            },
        );

        match state.sink().send(state.alert_channel(), message).await {
            Ok(()) => summary.delivered += 1,
            Err(err) => warn!(
                walk_id = %walk.id,
                error = &err as &(dyn std::error::Error + 'static),
                "failed to deliver walk alert"
            ),
        }
    }

    TickOutcome::Completed(summary)
}
