//! Per-partition debounce of incoming progress reports.
//!
//! Each partition keeps a bounded FIFO of its most recent reports. A value is trusted
//! ("stable") once every entry held in the FIFO agrees. A freshly reset FIFO holding a
//! single entry is trivially stable, which biases the tracker toward the latest value
//! right after startup or a reset. That is a known trade-off of the seeding scheme.

use std::collections::VecDeque;
use std::num::NonZeroUsize;

use indexmap::IndexMap;

use crate::state::partition::{Partition, ProgressLevel};

/// Whether the recent reports of a partition agree with each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stabilization {
    /// All held reports carry the same level.
    Stable,
    /// At least two held reports disagree.
    Unstable,
}

impl Stabilization {
    /// Whether the held reports all agree.
    pub fn is_stable(self) -> bool {
        matches!(self, Stabilization::Stable)
    }
}

/// Tracked state for one partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionState {
    confirmed: ProgressLevel,
    recent: VecDeque<ProgressLevel>,
}

impl PartitionState {
    fn baseline(capacity: usize) -> Self {
        let mut recent = VecDeque::with_capacity(capacity);
        recent.push_back(ProgressLevel::BASELINE);
        Self {
            confirmed: ProgressLevel::BASELINE,
            recent,
        }
    }

    /// Last level the alert policy acted on.
    pub fn confirmed(&self) -> ProgressLevel {
        self.confirmed
    }

    /// Recent reports, oldest first.
    pub fn recent(&self) -> impl ExactSizeIterator<Item = ProgressLevel> + '_ {
        self.recent.iter().copied()
    }

    fn verdict(&self) -> Stabilization {
        let mut levels = self.recent.iter();
        match levels.next() {
            Some(first) if levels.all(|level| level == first) => Stabilization::Stable,
            Some(_) => Stabilization::Unstable,
            None => Stabilization::Stable,
        }
    }
}

/// Fixed table of the twelve partitions and their recent-report FIFOs.
#[derive(Debug, Clone)]
pub struct DebounceTracker {
    capacity: NonZeroUsize,
    partitions: IndexMap<Partition, PartitionState>,
}

impl DebounceTracker {
    /// Build a tracker whose FIFOs hold `capacity` reports, with every partition at baseline.
    pub fn new(capacity: NonZeroUsize) -> Self {
        let partitions = Partition::all()
            .map(|partition| (partition, PartitionState::baseline(capacity.get())))
            .collect();
        Self {
            capacity,
            partitions,
        }
    }

    /// Stabilization count `K`.
    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    /// Append `level` to the partition FIFO, evicting the oldest entries beyond capacity,
    /// and report whether the held entries now agree.
    pub fn record(&mut self, partition: Partition, level: ProgressLevel) -> Stabilization {
        let capacity = self.capacity.get();
        let state = self.state_mut(partition);
        state.recent.push_back(level);
        while state.recent.len() > capacity {
            state.recent.pop_front();
        }
        state.verdict()
    }

    /// Last confirmed level of `partition`.
    pub fn confirmed(&self, partition: Partition) -> ProgressLevel {
        self.partitions
            .get(&partition)
            .map(PartitionState::confirmed)
            .unwrap_or_default()
    }

    /// Store a level the alert policy has acted on.
    pub(crate) fn confirm(&mut self, partition: Partition, level: ProgressLevel) {
        self.state_mut(partition).confirmed = level;
    }

    /// Trust a startup snapshot: confirm `level` directly and fill the FIFO with it.
    pub fn seed(&mut self, partition: Partition, level: ProgressLevel) {
        let capacity = self.capacity.get();
        let state = self.state_mut(partition);
        state.confirmed = level;
        state.recent.clear();
        state.recent.extend(std::iter::repeat_n(level, capacity));
    }

    /// Borrow the state of one partition.
    pub fn get(&self, partition: Partition) -> Option<&PartitionState> {
        self.partitions.get(&partition)
    }

    /// Iterate over all partitions in table order.
    pub fn iter(&self) -> impl Iterator<Item = (&Partition, &PartitionState)> {
        self.partitions.iter()
    }

    fn state_mut(&mut self, partition: Partition) -> &mut PartitionState {
        let capacity = self.capacity.get();
        // The table is fully populated at construction; this only guards the invariant.
        self.partitions
            .entry(partition)
            .or_insert_with(|| PartitionState::baseline(capacity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::partition::{Core, Ladder, Region};

    fn level(value: u8) -> ProgressLevel {
        ProgressLevel::new(value).unwrap()
    }

    fn tracker(capacity: usize) -> DebounceTracker {
        DebounceTracker::new(NonZeroUsize::new(capacity).unwrap())
    }

    fn partition() -> Partition {
        Partition::new(Region::Americas, Ladder::NonLadder, Core::Softcore)
    }

    #[test]
    fn starts_every_partition_at_baseline() {
        let tracker = tracker(3);
        assert_eq!(tracker.iter().count(), Partition::COUNT);
        for (_, state) in tracker.iter() {
            assert_eq!(state.confirmed(), ProgressLevel::BASELINE);
            assert_eq!(
                state.recent().collect::<Vec<_>>(),
                vec![ProgressLevel::BASELINE]
            );
        }
    }

    #[test]
    fn k_identical_reports_become_stable_and_fifo_stays_bounded() {
        let mut tracker = tracker(3);
        tracker.seed(partition(), level(2));

        assert_eq!(
            tracker.record(partition(), level(4)),
            Stabilization::Unstable
        );
        assert_eq!(
            tracker.record(partition(), level(4)),
            Stabilization::Unstable
        );
        assert_eq!(tracker.record(partition(), level(4)), Stabilization::Stable);

        for _ in 0..10 {
            tracker.record(partition(), level(4));
            assert!(tracker.get(partition()).unwrap().recent().len() <= 3);
        }
    }

    #[test]
    fn single_disagreeing_report_is_unstable_until_flushed() {
        let mut tracker = tracker(3);
        tracker.seed(partition(), ProgressLevel::BASELINE);

        assert_eq!(
            tracker.record(partition(), level(6)),
            Stabilization::Unstable
        );
        assert_eq!(
            tracker.record(partition(), level(1)),
            Stabilization::Unstable
        );
        assert_eq!(
            tracker.record(partition(), level(1)),
            Stabilization::Unstable
        );
        assert_eq!(tracker.record(partition(), level(1)), Stabilization::Stable);
    }

    #[test]
    fn short_fifo_is_stable_when_entries_agree() {
        let mut tracker = tracker(3);
        assert_eq!(tracker.record(partition(), level(1)), Stabilization::Stable);
        assert_eq!(
            tracker.record(partition(), level(2)),
            Stabilization::Unstable
        );
    }

    #[test]
    fn record_never_touches_confirmed() {
        let mut tracker = tracker(2);
        tracker.record(partition(), level(5));
        tracker.record(partition(), level(5));
        assert_eq!(tracker.confirmed(partition()), ProgressLevel::BASELINE);

        tracker.confirm(partition(), level(5));
        assert_eq!(tracker.confirmed(partition()), level(5));
    }

    #[test]
    fn seed_fills_fifo_with_k_copies() {
        let mut tracker = tracker(4);
        tracker.seed(partition(), level(3));

        let state = tracker.get(partition()).unwrap();
        assert_eq!(state.confirmed(), level(3));
        assert_eq!(state.recent().collect::<Vec<_>>(), vec![level(3); 4]);
    }

    #[test]
    fn partitions_are_independent() {
        let mut tracker = tracker(2);
        let other = Partition::new(Region::Asia, Ladder::Ladder, Core::Hardcore);

        tracker.record(partition(), level(3));
        tracker.record(partition(), level(3));

        assert_eq!(
            tracker.get(other).unwrap().recent().collect::<Vec<_>>(),
            vec![ProgressLevel::BASELINE]
        );
    }
}
