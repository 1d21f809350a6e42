//! Progress reports.

use time::{OffsetDateTime, macros::format_description};

use crate::state::partition::{Partition, ProgressLevel};

/// A single progress report for one partition, consumed as soon as it is recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Partition the report is about.
    pub partition: Partition,
    /// Reported level.
    pub level: ProgressLevel,
    /// When the upstream received the report.
    pub reported_at: OffsetDateTime,
    /// Upstream reporter, when the API sends one.
    pub reporter_id: Option<String>,
}

impl Report {
    /// Report without a known reporter.
    pub fn new(partition: Partition, level: ProgressLevel, reported_at: OffsetDateTime) -> Self {
        Self {
            partition,
            level,
            reported_at,
            reporter_id: None,
        }
    }

    /// Attach the upstream reporter identifier.
    pub fn with_reporter(mut self, reporter_id: impl Into<String>) -> Self {
        self.reporter_id = Some(reporter_id.into());
        self
    }

    /// Reporter identifier for logs and messages.
    pub fn reporter(&self) -> &str {
        self.reporter_id.as_deref().unwrap_or("unknown")
    }

    /// `YYYY-MM-DD HH:MM:SS` rendering of [`Report::reported_at`] for log lines.
    pub fn reported_at_display(&self) -> String {
        self.reported_at
            .format(format_description!(
                "[year]-[month]-[day] [hour]:[minute]:[second]"
            ))
            .unwrap_or_else(|_| "invalid-timestamp".into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::partition::{Core, Ladder, Region};

    #[test]
    fn formats_report_timestamp_for_logs() {
        let report = Report::new(
            Partition::new(Region::Americas, Ladder::Ladder, Core::Softcore),
            ProgressLevel::BASELINE,
            OffsetDateTime::from_unix_timestamp(1_650_000_000).unwrap(),
        );
        assert_eq!(report.reported_at_display(), "2022-04-15 05:20:00");
        assert_eq!(report.reporter(), "unknown");
        assert_eq!(report.with_reporter("42").reporter(), "42");
    }
}
