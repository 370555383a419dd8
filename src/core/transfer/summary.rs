//! Transfer summary and reporting

use super::walker::WalkReport;
use crate::adapters::staging::StagingReport;
use crate::domain::{InstanceId, Outcome, TransferStats};
use std::time::Duration;

/// Summary of a transfer run
#[derive(Debug, Clone, Default)]
pub struct TransferSummary {
    /// Outcome counts
    pub stats: TransferStats,

    /// Number of source pages fetched
    pub pages: usize,

    /// Source instance ids of failed submissions that had one
    pub failed_ids: Vec<InstanceId>,

    /// Attachment staging counts, if staging ran
    pub staging: Option<StagingReport>,

    /// Duration of the run
    pub duration: Duration,

    /// Whether the run was interrupted by a shutdown signal
    pub interrupted: bool,
}

impl TransferSummary {
    /// Builds a summary from a walk
    pub fn from_walk(report: &WalkReport) -> Self {
        let stats = TransferStats::summarize(report.outcomes.iter().map(|o| o.outcome));
        let failed_ids = report
            .outcomes
            .iter()
            .filter(|o| o.outcome == Outcome::Failed)
            .filter_map(|o| o.instance_id.clone())
            .collect();

        Self {
            stats,
            pages: report.pages,
            failed_ids,
            staging: None,
            duration: Duration::ZERO,
            interrupted: report.interrupted,
        }
    }

    pub fn with_staging(mut self, staging: Option<StagingReport>) -> Self {
        self.staging = staging;
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// True if every submission reached the destination
    pub fn is_successful(&self) -> bool {
        self.stats.failed == 0
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            total = self.stats.total,
            created = self.stats.created,
            duplicate = self.stats.duplicate,
            failed = self.stats.failed,
            pages = self.pages,
            duration_secs = self.duration.as_secs(),
            success_rate = format!("{:.2}%", self.stats.success_rate()),
            interrupted = self.interrupted,
            "Transfer completed"
        );

        if self.stats.failed > self.failed_ids.len() {
            tracing::warn!(
                without_id = self.stats.failed - self.failed_ids.len(),
                "Some failed submissions had no instance id and cannot be replayed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SubmissionOutcome;

    fn outcome(id: Option<&str>, outcome: Outcome) -> SubmissionOutcome {
        SubmissionOutcome::new(id.map(|id| InstanceId::new(id).unwrap()), outcome)
    }

    #[test]
    fn test_from_walk() {
        let report = WalkReport {
            outcomes: vec![
                outcome(Some("a1"), Outcome::Created),
                outcome(Some("a2"), Outcome::Failed),
                outcome(None, Outcome::Failed),
                outcome(Some("a3"), Outcome::Duplicate),
            ],
            pages: 2,
            interrupted: false,
        };

        let summary = TransferSummary::from_walk(&report);
        assert_eq!(
            summary.stats,
            TransferStats {
                total: 4,
                created: 1,
                duplicate: 1,
                failed: 2
            }
        );
        assert_eq!(summary.failed_ids, vec![InstanceId::new("a2").unwrap()]);
        assert_eq!(summary.pages, 2);
        assert!(!summary.is_successful());
    }

    #[test]
    fn test_empty_walk_is_successful() {
        let summary = TransferSummary::from_walk(&WalkReport::default());
        assert_eq!(summary.stats.total, 0);
        assert!(summary.is_successful());
    }
}
