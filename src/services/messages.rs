//! Chat message rendering for status replies and walk alerts.

use std::fmt::Write as _;

use crate::state::{
    partition::PartitionFilter,
    report::Report,
    walks::WalkEvent,
};

const STATUS_COURTESY: &str = "> Data courtesy of diablo2.io";
const WALK_COURTESY: &str = "> Data courtesy of d2runewizard.com";

/// Reply sent when the status snapshot cannot be fetched.
pub const API_ERROR_REPLY: &str = "API error, please try again later.";

/// Full status reply: one line per partition, then upcoming walks when there are any.
pub fn status_message(reports: &[Report], walks: &[WalkEvent]) -> String {
    let mut sorted: Vec<&Report> = reports.iter().collect();
    sorted.sort_by_key(|report| report.partition.display_order());

    let mut message = String::from("Current DClone Progress:\n");
    for report in sorted {
        let _ = writeln!(
            message,
            " - {} **{}** is `{}/6` <t:{}:R>",
            report.partition.emoji(),
            report.partition,
            report.level,
            report.reported_at.unix_timestamp(),
        );
    }
    message.push_str(STATUS_COURTESY);

    if !walks.is_empty() {
        message.push_str("\n\nPlanned Walks:\n");
        for walk in walks {
            let _ = writeln!(
                message,
                " - {} **{}** <t:{}:R> reported by `{}`{}",
                walk.emoji(),
                walk_label(walk),
                walk.starts_at.unix_timestamp(),
                walk.reported_by,
                if walk.confirmed { "" } else { " **[UNCONFIRMED]**" },
            );
        }
        message.push_str(WALK_COURTESY);
    }

    message
}

/// Walks listed in the status reply: those matching the filter, soonest first.
pub fn relevant_walks(walks: Vec<WalkEvent>, filter: &PartitionFilter) -> Vec<WalkEvent> {
    let mut walks: Vec<WalkEvent> = walks
        .into_iter()
        .filter(|walk| walk.matches(filter))
        .collect();
    walks.sort_by_key(|walk| walk.starts_at);
    walks
}

/// Alert for a walk about to start.
pub fn walk_alert(walk: &WalkEvent) -> String {
    format!(
        "{} Upcoming walk for **{}** starts at <t:{}:f> (reported by `{}`){}\n{WALK_COURTESY}",
        walk.emoji(),
        walk_label(walk),
        walk.starts_at.unix_timestamp(),
        walk.reported_by,
        if walk.confirmed { "" } else { " [UNCONFIRMED]" },
    )
}

fn walk_label(walk: &WalkEvent) -> String {
    format!(
        "{} {} {}",
        walk.region_label(),
        walk.ladder.label(),
        walk.core.label()
    )
}
