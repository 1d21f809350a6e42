//! Ordered decision table turning a debounced report into an alert.

use crate::state::{
    partition::ProgressLevel,
    report::Report,
    tracker::Stabilization,
};

const STATUS_COURTESY: &str = "> Data courtesy of diablo2.io";
const SPAWN_BANNER: &str = ":japanese_ogre: :japanese_ogre: :japanese_ogre:";

/// Outcome of evaluating one report against the confirmed level of its partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Stable rise to or above the threshold. The report level becomes confirmed.
    Progressed,
    /// Stable drop below the confirmed level. The report level becomes confirmed.
    /// A drop to baseline is read as the boss having spawned.
    RolledBack {
        /// Whether the drop reached baseline.
        spawn_likely: bool,
    },
    /// The level differs from the confirmed one but cannot be trusted yet. Logged only.
    Suspicious,
    /// Nothing changed.
    NoAction,
}

impl Decision {
    /// Whether the caller must store the report level as the new confirmed level.
    pub fn confirms(self) -> bool {
        matches!(self, Decision::Progressed | Decision::RolledBack { .. })
    }

    /// Whether the decision produces a message for end users.
    pub fn is_announced(self) -> bool {
        matches!(
            self,
            Decision::Progressed
                | Decision::RolledBack {
                    spawn_likely: true
                }
        )
    }
}

/// Evaluate the decision table; the first matching row wins.
///
/// 1. stable, `level >= threshold` and `level > confirmed`: [`Decision::Progressed`]
/// 2. stable and `level < confirmed`: [`Decision::RolledBack`]
/// 3. `level != confirmed`: [`Decision::Suspicious`]
/// 4. otherwise [`Decision::NoAction`]
pub fn decide(
    level: ProgressLevel,
    confirmed: ProgressLevel,
    verdict: Stabilization,
    threshold: ProgressLevel,
) -> Decision {
    let stable = verdict.is_stable();
    if stable && level >= threshold && level > confirmed {
        Decision::Progressed
    } else if stable && level < confirmed {
        Decision::RolledBack {
            spawn_likely: level.is_baseline(),
        }
    } else if level != confirmed {
        Decision::Suspicious
    } else {
        Decision::NoAction
    }
}

/// Alerting rules shared by every partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertPolicy {
    threshold: ProgressLevel,
}

impl AlertPolicy {
    /// Policy announcing progress from `threshold` upwards.
    pub fn new(threshold: ProgressLevel) -> Self {
        Self { threshold }
    }

    /// Lowest level that is announced as progress.
    pub fn threshold(&self) -> ProgressLevel {
        self.threshold
    }

    /// Decide what `report` means given the confirmed level and the tracker verdict.
    pub fn decide(
        &self,
        report: &Report,
        confirmed: ProgressLevel,
        verdict: Stabilization,
    ) -> Decision {
        decide(report.level, confirmed, verdict, self.threshold)
    }

    /// Chat message for an announced decision, `None` for silent ones.
    pub fn render(&self, report: &Report, decision: Decision) -> Option<String> {
        let partition = &report.partition;
        match decision {
            Decision::Progressed => Some(format!(
                "[{level}/6] {emoji} **{partition}** DClone progressed (reporter_id: {reporter})\n{STATUS_COURTESY}",
                level = report.level,
                emoji = partition.emoji(),
                reporter = report.reporter(),
            )),
            Decision::RolledBack { spawn_likely: true } => Some(format!(
                "{SPAWN_BANNER} [{level}/6] **{partition}** DClone may have spawned (reporter_id: {reporter})\n{STATUS_COURTESY}",
                level = report.level,
                reporter = report.reporter(),
            )),
            Decision::RolledBack {
                spawn_likely: false,
            }
            | Decision::Suspicious
            | Decision::NoAction => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use time::OffsetDateTime;

    use super::*;
    use crate::state::partition::{Core, Ladder, Partition, Region};

    fn level(value: u8) -> ProgressLevel {
        ProgressLevel::new(value).unwrap()
    }

    fn report(value: u8) -> Report {
        Report::new(
            Partition::new(Region::Europe, Ladder::Ladder, Core::Softcore),
            level(value),
            OffsetDateTime::UNIX_EPOCH,
        )
        .with_reporter("abc123")
    }

    #[test]
    fn stable_rise_at_threshold_progresses() {
        let decision = decide(level(2), level(1), Stabilization::Stable, level(2));
        assert_eq!(decision, Decision::Progressed);
        assert!(decision.confirms());
        assert!(decision.is_announced());
    }

    #[test]
    fn rise_below_threshold_never_progresses() {
        let decision = decide(level(2), level(1), Stabilization::Stable, level(3));
        assert_eq!(decision, Decision::Suspicious);
        assert!(!decision.confirms());
    }

    #[test]
    fn unstable_rise_is_suspicious() {
        assert_eq!(
            decide(level(6), level(1), Stabilization::Unstable, level(2)),
            Decision::Suspicious
        );
    }

    #[test]
    fn stable_drop_to_baseline_is_a_likely_spawn() {
        let decision = decide(level(1), level(4), Stabilization::Stable, level(2));
        assert_eq!(decision, Decision::RolledBack { spawn_likely: true });
        assert!(decision.confirms());
        assert!(decision.is_announced());
    }

    #[test]
    fn stable_intermediate_drop_is_silent_correction() {
        let decision = decide(level(2), level(3), Stabilization::Stable, level(2));
        assert_eq!(decision, Decision::RolledBack { spawn_likely: false });
        assert!(decision.confirms());
        assert!(!decision.is_announced());
    }

    #[test]
    fn repeated_confirmed_level_is_no_action_regardless_of_verdict() {
        for verdict in [Stabilization::Stable, Stabilization::Unstable] {
            for value in 1..=6 {
                assert_eq!(
                    decide(level(value), level(value), verdict, level(2)),
                    Decision::NoAction
                );
            }
        }
    }

    #[test]
    fn renders_progress_and_spawn_messages_only() {
        let policy = AlertPolicy::new(level(2));

        let progressed = policy.render(&report(3), Decision::Progressed).unwrap();
        assert_eq!(
            progressed,
            "[3/6] :flag_eu: :ladder: :mage: **Europe Ladder Softcore** DClone progressed (reporter_id: abc123)\n> Data courtesy of diablo2.io"
        );

        let spawned = policy
            .render(&report(1), Decision::RolledBack { spawn_likely: true })
            .unwrap();
        assert!(spawned.starts_with(":japanese_ogre:"));
        assert!(spawned.contains("[1/6] **Europe Ladder Softcore** DClone may have spawned"));

        assert_eq!(
            policy.render(&report(2), Decision::RolledBack { spawn_likely: false }),
            None
        );
        assert_eq!(policy.render(&report(5), Decision::Suspicious), None);
        assert_eq!(policy.render(&report(1), Decision::NoAction), None);
    }
}
