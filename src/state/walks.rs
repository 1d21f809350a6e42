//! Community-planned walks and the record of which ones were already announced.

use dashmap::DashSet;
use time::{Duration, OffsetDateTime};

use crate::state::partition::{Core, Ladder, PartitionFilter, Region};

/// How far ahead a planned walk is announced.
pub const WALK_LOOKAHEAD: Duration = Duration::minutes(60);

/// A walk announced on the secondary walk API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEvent {
    /// Identifier assigned by the walk API, used for dedup.
    pub id: String,
    /// `None` while the submitter has not decided on a region yet (`TBD`).
    pub region: Option<Region>,
    /// Ladder mode of the walk.
    pub ladder: Ladder,
    /// Hardcore or softcore.
    pub core: Core,
    /// Planned start.
    pub starts_at: OffsetDateTime,
    /// Display name of the submitter.
    pub reported_by: String,
    /// Whether the site confirmed the walk.
    pub confirmed: bool,
}

impl WalkEvent {
    /// Whether the walk is relevant for `filter`. Walks without a region always match on region.
    pub fn matches(&self, filter: &PartitionFilter) -> bool {
        let region = match (filter.region, self.region) {
            (Some(wanted), Some(region)) => wanted == region,
            _ => true,
        };
        region
            && filter.ladder.is_none_or(|ladder| ladder == self.ladder)
            && filter.core.is_none_or(|core| core == self.core)
    }

    /// Whether the walk starts no later than `now + window`. Walks already under way qualify.
    pub fn starts_within(&self, now: OffsetDateTime, window: Duration) -> bool {
        self.starts_at - now <= window
    }

    /// Region name, or `TBD`.
    pub fn region_label(&self) -> &'static str {
        self.region.map_or("TBD", Region::label)
    }

    /// Emoji triple for chat messages.
    pub fn emoji(&self) -> String {
        format!(
            "{} {} {}",
            self.region.map_or(":grey_question:", Region::emoji),
            self.ladder.emoji(),
            self.core.emoji()
        )
    }
}

/// Identifiers of walks already announced during this process lifetime.
#[derive(Debug, Default)]
pub struct AlertedWalkSet {
    ids: DashSet<String>,
}

impl AlertedWalkSet {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `id` as announced. Returns `false` when it already was.
    pub fn claim(&self, id: &str) -> bool {
        self.ids.insert(id.to_string())
    }

    /// Whether `id` was already announced.
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Number of announced walks.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether nothing was announced yet.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
