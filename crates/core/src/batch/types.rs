//! Types for the batch module.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::transform::TransformOutcome;

/// Where a run is in its lifecycle.
///
/// `Listing → Dispatching → Draining → Done`, or `Aborted` when listing fails.
/// There are no cycles and a runner never re-enters an earlier phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchPhase {
    /// Waiting for the first listing page.
    Listing,
    /// Pages are arriving and objects are being handed to workers.
    Dispatching,
    /// Listing is over; waiting for in-flight workers.
    Draining,
    /// Every dispatched object has an outcome.
    Done,
    /// Listing failed; in-flight workers were drained and the run stopped.
    Aborted,
}

impl BatchPhase {
    /// Whether the run has finished, successfully or not.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Aborted)
    }
}

/// One failed object in the summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemError {
    pub key: String,
    pub kind: String,
    pub message: String,
}

/// Aggregate result of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub converted: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Failures in the order they completed.
    pub errors: Vec<ItemError>,
    /// Source bytes read for converted objects.
    pub bytes_read: u64,
    /// Bytes written for converted objects.
    pub bytes_written: u64,
    /// Most objects ever held by workers at the same time.
    pub peak_in_flight: usize,
    /// Set when a shutdown signal stopped dispatch early.
    pub interrupted: bool,
}

impl BatchSummary {
    pub(crate) fn new(run_id: Uuid, started_at: DateTime<Utc>) -> Self {
        Self {
            run_id,
            started_at,
            finished_at: started_at,
            converted: 0,
            skipped: 0,
            failed: 0,
            errors: Vec::new(),
            bytes_read: 0,
            bytes_written: 0,
            peak_in_flight: 0,
            interrupted: false,
        }
    }

    /// Folds one outcome into the counts.
    pub(crate) fn record(&mut self, outcome: TransformOutcome) {
        match outcome {
            TransformOutcome::Converted {
                input_bytes,
                output_bytes,
                ..
            } => {
                self.converted += 1;
                self.bytes_read += input_bytes as u64;
                self.bytes_written += output_bytes as u64;
            }
            TransformOutcome::Skipped { .. } => self.skipped += 1,
            TransformOutcome::Failed { key, error } => {
                self.failed += 1;
                self.errors.push(ItemError {
                    key,
                    kind: error.kind().to_string(),
                    message: error.to_string(),
                });
            }
        }
    }

    /// Objects that reached an outcome.
    pub fn total(&self) -> usize {
        self.converted + self.skipped + self.failed
    }

    /// Whether no object failed.
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }

    /// Wall-clock duration of the run.
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// Errors that end a whole run.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    /// Listing failed. Carries what had been processed before the failure.
    #[error("Object store unavailable: {reason}")]
    StorageUnavailable {
        reason: String,
        partial: Box<BatchSummary>,
    },

    /// The outcome collector stopped unexpectedly.
    #[error("Outcome collector failed: {0}")]
    CollectorFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StorageError;
    use crate::transform::SkipReason;

    #[test]
    fn test_summary_record() {
        let mut summary = BatchSummary::new(Uuid::new_v4(), Utc::now());
        summary.record(TransformOutcome::Converted {
            key: "a.png".to_string(),
            new_key: "a.webp".to_string(),
            input_bytes: 1000,
            output_bytes: 300,
        });
        summary.record(TransformOutcome::Skipped {
            key: "b.webp".to_string(),
            reason: SkipReason::AlreadyTargetFormat,
        });
        summary.record(TransformOutcome::Failed {
            key: "c.jpg".to_string(),
            error: StorageError::read("c.jpg", "denied").into(),
        });

        assert_eq!(summary.converted, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.total(), 3);
        assert_eq!(summary.bytes_read, 1000);
        assert_eq!(summary.bytes_written, 300);
        assert!(!summary.is_clean());
        assert_eq!(summary.errors[0].key, "c.jpg");
        assert_eq!(summary.errors[0].kind, "read");
    }

    #[test]
    fn test_summary_serialization() {
        let summary = BatchSummary::new(Uuid::new_v4(), Utc::now());
        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"converted\":0"));
        assert!(json.contains("\"interrupted\":false"));
    }

    #[test]
    fn test_phase_terminal() {
        assert!(!BatchPhase::Listing.is_terminal());
        assert!(!BatchPhase::Draining.is_terminal());
        assert!(BatchPhase::Done.is_terminal());
        assert!(BatchPhase::Aborted.is_terminal());
    }
}
