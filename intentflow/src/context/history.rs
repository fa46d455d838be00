//! Stage execution history records.

use crate::core::StageStatus;
use crate::errors::ErrorKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The error captured in a failed stage record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageError {
    /// The failure classification.
    pub kind: ErrorKind,
    /// Human-readable detail.
    pub message: String,
}

impl StageError {
    /// Creates a new stage error.
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// One stage-execution record in a run's history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageRecord {
    /// The stage name.
    pub stage: String,
    /// The recorded status.
    pub status: StageStatus,
    /// When the dispatcher started (or declined to start) the stage.
    pub started_at: DateTime<Utc>,
    /// When the stage resolved.
    pub finished_at: DateTime<Utc>,
    /// The error, for failed records.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<StageError>,
    /// The skip reason, for skipped records.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_reason: Option<String>,
}

/// An in-progress stage record; finished by the dispatcher once the
/// stage resolves.
#[derive(Debug, Clone)]
pub struct OpenStageRecord {
    stage: String,
    started_at: DateTime<Utc>,
}

impl OpenStageRecord {
    /// Opens a record for a stage, stamping its start time.
    #[must_use]
    pub fn start(stage: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            started_at: Utc::now(),
        }
    }

    /// Closes the record with a success.
    #[must_use]
    pub fn succeeded(self) -> StageRecord {
        self.finish(StageStatus::Succeeded, None, None)
    }

    /// Closes the record with a failure.
    #[must_use]
    pub fn failed(self, error: StageError) -> StageRecord {
        self.finish(StageStatus::Failed, Some(error), None)
    }

    /// Closes the record with a skip.
    #[must_use]
    pub fn skipped(self, reason: impl Into<String>) -> StageRecord {
        self.finish(StageStatus::Skipped, None, Some(reason.into()))
    }

    /// Closes the record as cancelled before or during execution.
    #[must_use]
    pub fn cancelled(self, reason: impl Into<String>) -> StageRecord {
        self.finish(
            StageStatus::Cancelled,
            Some(StageError::new(ErrorKind::Cancelled, reason)),
            None,
        )
    }

    fn finish(
        self,
        status: StageStatus,
        error: Option<StageError>,
        skip_reason: Option<String>,
    ) -> StageRecord {
        StageRecord {
            stage: self.stage,
            status,
            started_at: self.started_at,
            finished_at: Utc::now(),
            error,
            skip_reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_succeeded() {
        let record = OpenStageRecord::start("clone-repository").succeeded();
        assert_eq!(record.stage, "clone-repository");
        assert_eq!(record.status, StageStatus::Succeeded);
        assert!(record.error.is_none());
        assert!(record.finished_at >= record.started_at);
    }

    #[test]
    fn test_record_failed_carries_error() {
        let record = OpenStageRecord::start("fetch-ticket")
            .failed(StageError::new(ErrorKind::ExternalFailure, "HTTP 503"));

        assert_eq!(record.status, StageStatus::Failed);
        let error = record.error.unwrap();
        assert_eq!(error.kind, ErrorKind::ExternalFailure);
        assert_eq!(error.message, "HTTP 503");
    }

    #[test]
    fn test_record_skipped() {
        let record = OpenStageRecord::start("verify-script").skipped("no script produced");
        assert_eq!(record.status, StageStatus::Skipped);
        assert_eq!(record.skip_reason.as_deref(), Some("no script produced"));
    }

    #[test]
    fn test_record_cancelled() {
        let record = OpenStageRecord::start("impact-analysis").cancelled("caller hung up");
        assert_eq!(record.status, StageStatus::Cancelled);
        assert_eq!(record.error.unwrap().kind, ErrorKind::Cancelled);
    }

    #[test]
    fn test_record_serialization() {
        let record = OpenStageRecord::start("analyze-code").succeeded();
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("succeeded"));
        assert!(!json.contains("error"));
    }
}
