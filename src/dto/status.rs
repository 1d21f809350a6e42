//! Read-only projection of the debounce table.

use serde::Serialize;
use utoipa::ToSchema;

use crate::state::{
    partition::{Partition, PartitionFilter, ProgressLevel},
    tracker::DebounceTracker,
};

/// Tracked state of one partition.
#[derive(Debug, Serialize, ToSchema)]
pub struct PartitionStatus {
    /// Tracked partition.
    pub partition: Partition,
    /// Human-readable partition label.
    pub label: String,
    /// Whether the partition is part of the polled filter.
    pub tracked: bool,
    /// Last confirmed level.
    #[schema(value_type = u8, minimum = 1, maximum = 6)]
    pub confirmed: ProgressLevel,
    /// Held reports, oldest first.
    #[schema(value_type = Vec<u8>)]
    pub recent: Vec<ProgressLevel>,
}

/// Read-only view of the debounce table.
#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    /// Description of the polled partitions.
    pub filter: String,
    /// Lowest level announced as progress.
    #[schema(value_type = u8)]
    pub threshold: ProgressLevel,
    /// Stabilization count.
    pub reports: usize,
    /// Whether the most recent status poll failed.
    pub degraded: bool,
    /// Every partition, in chat display order.
    pub partitions: Vec<PartitionStatus>,
}

impl StatusResponse {
    /// Project the tracker, listing partitions in chat display order.
    pub fn from_tracker(
        tracker: &DebounceTracker,
        filter: &PartitionFilter,
        threshold: ProgressLevel,
        degraded: bool,
    ) -> Self {
        let mut partitions: Vec<PartitionStatus> = tracker
            .iter()
            .map(|(partition, state)| PartitionStatus {
                partition: *partition,
                label: partition.to_string(),
                tracked: filter.matches(partition),
                confirmed: state.confirmed(),
                recent: state.recent().collect(),
            })
            .collect();
        partitions.sort_by_key(|status| status.partition.display_order());

        Self {
            filter: filter.to_string(),
            threshold,
            reports: tracker.capacity(),
            degraded,
            partitions,
        }
    }
}
