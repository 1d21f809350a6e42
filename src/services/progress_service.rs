//! Progress polling: snapshot → debounce → decision → chat.

use tracing::{debug, info, warn};

use crate::{
    dto::sse::{AlertKind, ProgressAlertEvent},
    services::{scheduler::TickOutcome, sse_events},
    state::{
        SharedState,
        partition::ProgressLevel,
        policy::{AlertPolicy, Decision},
        report::Report,
        tracker::DebounceTracker,
    },
    upstream::FetchResult,
};

/// Counters describing one completed progress tick.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TickSummary {
    /// Reports in the snapshot.
    pub reports: usize,
    /// Confirmed rises past the threshold.
    pub progressed: usize,
    /// Confirmed drops, silent or not.
    pub rolled_back: usize,
    /// Drops back to baseline.
    pub spawned: usize,
    /// Changes ignored as unstable.
    pub suspicious: usize,
    /// Alerts accepted by the chat platform.
    pub delivered: usize,
}

/// Result of running one report through the tracker and the policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    /// Outcome of the decision table.
    pub decision: Decision,
    /// Confirmed level before the report was applied.
    pub previous: ProgressLevel,
    /// Rendered chat text, when the decision is announced.
    pub message: Option<String>,
}

struct PendingAlert {
    report: Report,
    previous: ProgressLevel,
    kind: AlertKind,
    message: String,
}

/// Trust the current snapshot: confirm every reported level without alerting.
pub async fn seed(state: &SharedState) -> FetchResult<usize> {
    let reports = state
        .status_source()
        .fetch(state.config().filter)
        .await?;

    let mut tracker = state.tracker().lock().await;
    for report in &reports {
        tracker.seed(report.partition, report.level);
        debug!(partition = %report.partition, level = %report.level, "seeded partition");
    }
    drop(tracker);

    sse_events::broadcast_degraded(state, false);
    Ok(reports.len())
}

/// Run one progress tick. Skips when the previous tick still holds the gate.
pub async fn poll_once(state: &SharedState) -> TickOutcome<TickSummary> {
    let Ok(_gate) = state.poll_gate().try_lock() else {
        debug!("previous progress tick still running; skipping");
        return TickOutcome::Skipped;
    };

    let reports = match state.status_source().fetch(state.config().filter).await {
        Ok(reports) => reports,
        Err(err) => {
            warn!(
                error = &err as &(dyn std::error::Error + 'static),
                timeout = err.is_timeout(),
                "status fetch failed; skipping tick"
            );
            sse_events::broadcast_degraded(state, true);
            return TickOutcome::Failed;
        }
    };
    sse_events::broadcast_degraded(state, false);

    let mut summary = TickSummary {
        reports: reports.len(),
        ..TickSummary::default()
    };

    let pending: Vec<PendingAlert> = {
        let mut tracker = state.tracker().lock().await;
        reports
            .into_iter()
            .filter_map(|report| {
                let evaluation = evaluate(&mut tracker, state.policy(), &report);
                summary.count(evaluation.decision);
                let kind = match evaluation.decision {
                    Decision::Progressed => AlertKind::Progressed,
                    _ => AlertKind::Spawned,
                };
                evaluation.message.map(|message| PendingAlert {
                    report,
                    previous: evaluation.previous,
                    kind,
                    message,
                })
            })
            .collect()
    };

    for alert in pending {
        sse_events::broadcast_progress_alert(
            state,
            ProgressAlertEvent {
                kind: alert.kind,
                partition: alert.report.partition,
                level: alert.report.level,
                previous: alert.previous,
                reported_at: alert.report.reported_at.unix_timestamp(),
                reporter_id: alert.report.reporter_id.clone(),
                message: alert.message.clone(),
            },
        );

        match state
            .sink()
            .send(state.alert_channel(), alert.message)
            .await
        {
            Ok(()) => summary.delivered += 1,
            Err(err) => warn!(
                partition = %alert.report.partition,
                level = %alert.report.level,
                error = &err as &(dyn std::error::Error + 'static),
                "failed to deliver progress alert"
            ),
        }
    }

    TickOutcome::Completed(summary)
}

/// Record `report`, decide, apply the confirmed-level side effect and render the alert.
pub fn evaluate(
    tracker: &mut DebounceTracker,
    policy: &AlertPolicy,
    report: &Report,
) -> Evaluation {
    let partition = report.partition;
    let previous = tracker.confirmed(partition);
    let verdict = tracker.record(partition, report.level);
    let decision = policy.decide(report, previous, verdict);

    if decision.confirms() {
        tracker.confirm(partition, report.level);
    }

    match decision {
        Decision::Progressed => info!(
            %partition,
            level = %report.level,
            %previous,
            reporter_id = report.reporter(),
            "progress confirmed"
        ),
        Decision::RolledBack { spawn_likely } => info!(
            %partition,
            level = %report.level,
            %previous,
            reporter_id = report.reporter(),
            spawn_likely,
            "progress rolled back"
        ),
        Decision::Suspicious => info!(
            %partition,
            level = %report.level,
            confirmed = %previous,
            reporter_id = report.reporter(),
            reported_at = %report.reported_at_display(),
            "ignoring suspicious report"
        ),
        Decision::NoAction => {}
    }

    Evaluation {
        decision,
        previous,
        message: policy.render(report, decision),
    }
}

impl TickSummary {
    fn count(&mut self, decision: Decision) {
        match decision {
            Decision::Progressed => self.progressed += 1,
            Decision::RolledBack { spawn_likely } => {
                self.rolled_back += 1;
                if spawn_likely {
                    self.spawned += 1;
                }
            }
            Decision::Suspicious => self.suspicious += 1,
            Decision::NoAction => {}
        }
    }
}
