//! Submission outcomes and run statistics

use super::ids::InstanceId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Result of submitting one document to the destination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// The destination stored a new submission (HTTP 201)
    Created,
    /// The destination already had this instance id (HTTP 202)
    Duplicate,
    /// Anything else
    Failed,
}

impl Outcome {
    /// Classifies a raw ingestion response status
    ///
    /// # Examples
    ///
    /// ```
    /// use kobo_transfer::domain::Outcome;
    ///
    /// assert_eq!(Outcome::from_status(201), Outcome::Created);
    /// assert_eq!(Outcome::from_status(202), Outcome::Duplicate);
    /// assert_eq!(Outcome::from_status(500), Outcome::Failed);
    /// ```
    pub fn from_status(status: u16) -> Self {
        match status {
            201 => Outcome::Created,
            202 => Outcome::Duplicate,
            _ => Outcome::Failed,
        }
    }

    /// Console glyph for the outcome
    pub fn glyph(&self) -> &'static str {
        match self {
            Outcome::Created => "✅",
            Outcome::Duplicate => "⚠️ ",
            Outcome::Failed => "❌",
        }
    }

    /// Returns true for outcomes that leave the submission present at the destination
    pub fn is_transferred(&self) -> bool {
        !matches!(self, Outcome::Failed)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Created => write!(f, "created"),
            Outcome::Duplicate => write!(f, "duplicate"),
            Outcome::Failed => write!(f, "failed"),
        }
    }
}

/// Outcome of one submission together with its identifier
///
/// The identifier is absent when the source document carried no usable
/// `meta/instanceID`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionOutcome {
    /// Source instance identifier, if one could be read
    pub instance_id: Option<InstanceId>,
    /// Classified outcome
    pub outcome: Outcome,
}

impl SubmissionOutcome {
    /// Creates a new outcome record
    pub fn new(instance_id: Option<InstanceId>, outcome: Outcome) -> Self {
        Self {
            instance_id,
            outcome,
        }
    }
}

/// Aggregate counts for a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferStats {
    /// Number of submissions attempted
    pub total: usize,
    /// Submissions newly created at the destination
    pub created: usize,
    /// Submissions the destination already had
    pub duplicate: usize,
    /// Everything else
    pub failed: usize,
}

impl TransferStats {
    /// Reduces a sequence of outcomes into counts
    ///
    /// `failed` is derived as `total - created - duplicate`, so the counts always add up.
    ///
    /// # Examples
    ///
    /// ```
    /// use kobo_transfer::domain::{Outcome, TransferStats};
    ///
    /// let stats = TransferStats::summarize([Outcome::Created, Outcome::Duplicate, Outcome::Created]);
    /// assert_eq!((stats.total, stats.created, stats.duplicate, stats.failed), (3, 2, 1, 0));
    /// ```
    pub fn summarize<I>(outcomes: I) -> Self
    where
        I: IntoIterator<Item = Outcome>,
    {
        let mut total = 0;
        let mut created = 0;
        let mut duplicate = 0;
        for outcome in outcomes {
            total += 1;
            match outcome {
                Outcome::Created => created += 1,
                Outcome::Duplicate => duplicate += 1,
                Outcome::Failed => {}
            }
        }
        Self {
            total,
            created,
            duplicate,
            failed: total - created - duplicate,
        }
    }

    /// Share of submissions present at the destination after the run, as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        ((self.created + self.duplicate) as f64 / self.total as f64) * 100.0
    }
}

impl fmt::Display for TransferStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "🧮 {}\t✅ {}\t⚠️ {}\t❌ {}",
            self.total, self.created, self.duplicate, self.failed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(201, Outcome::Created ; "created")]
    #[test_case(202, Outcome::Duplicate ; "duplicate")]
    #[test_case(200, Outcome::Failed ; "plain ok is not created")]
    #[test_case(204, Outcome::Failed ; "no content")]
    #[test_case(400, Outcome::Failed ; "bad request")]
    #[test_case(401, Outcome::Failed ; "unauthorized")]
    #[test_case(409, Outcome::Failed ; "conflict")]
    #[test_case(500, Outcome::Failed ; "server error")]
    #[test_case(0, Outcome::Failed ; "zero")]
    fn test_outcome_from_status(status: u16, expected: Outcome) {
        assert_eq!(Outcome::from_status(status), expected);
    }

    #[test]
    fn test_every_status_maps_to_one_outcome() {
        for status in 0..=999u16 {
            let outcome = Outcome::from_status(status);
            let expected = match status {
                201 => Outcome::Created,
                202 => Outcome::Duplicate,
                _ => Outcome::Failed,
            };
            assert_eq!(outcome, expected, "status {status}");
        }
    }

    #[test]
    fn test_summarize_empty() {
        let stats = TransferStats::summarize(Vec::new());
        assert_eq!(stats, TransferStats::default());
        assert_eq!(stats.success_rate(), 100.0);
    }

    #[test]
    fn test_summarize_counts_add_up() {
        let outcomes = vec![
            Outcome::Created,
            Outcome::Failed,
            Outcome::Duplicate,
            Outcome::Failed,
            Outcome::Created,
        ];
        let stats = TransferStats::summarize(outcomes);
        assert_eq!(stats.total, 5);
        assert_eq!(stats.created, 2);
        assert_eq!(stats.duplicate, 1);
        assert_eq!(stats.failed, 2);
        assert_eq!(stats.total, stats.created + stats.duplicate + stats.failed);
        assert_eq!(stats.success_rate(), 60.0);
    }

    #[test]
    fn test_stats_display() {
        let stats = TransferStats::summarize([Outcome::Created, Outcome::Failed]);
        assert_eq!(stats.to_string(), "🧮 2\t✅ 1\t⚠️ 0\t❌ 1");
    }

    #[test]
    fn test_outcome_display_and_transferred() {
        assert_eq!(Outcome::Duplicate.to_string(), "duplicate");
        assert!(Outcome::Created.is_transferred());
        assert!(Outcome::Duplicate.is_transferred());
        assert!(!Outcome::Failed.is_transferred());
    }
}
