//! Stage and run status enums.

use crate::errors::ErrorKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The recorded outcome of a single stage execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    /// Stage completed and its outputs were merged.
    Succeeded,
    /// Stage reported a failure (or one was detected on its behalf).
    Failed,
    /// Stage declined to run; the context was left untouched.
    Skipped,
    /// Stage never started because the run was cancelled.
    Cancelled,
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Succeeded => write!(f, "succeeded"),
            Self::Failed => write!(f, "failed"),
            Self::Skipped => write!(f, "skipped"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl StageStatus {
    /// Returns true if the status counts as forward progress.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Skipped)
    }
}

/// The overall status of one workflow run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunStatus {
    /// Every stage succeeded or was skipped.
    Completed,
    /// Recoverable failures occurred but the run reached the end.
    PartiallyCompleted,
    /// A fatal failure aborted the remaining stages.
    Failed {
        /// The stage that stopped the run.
        stage: String,
        /// The failure classification.
        kind: ErrorKind,
    },
    /// Cancellation stopped the run before completion.
    Cancelled,
}

impl RunStatus {
    /// Returns true if the run reached the end of its stage list.
    #[must_use]
    pub fn reached_end(&self) -> bool {
        matches!(self, Self::Completed | Self::PartiallyCompleted)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed => write!(f, "completed"),
            Self::PartiallyCompleted => write!(f, "partially_completed"),
            Self::Failed { stage, kind } => write!(f, "failed at '{stage}' ({kind})"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_status_display() {
        assert_eq!(StageStatus::Succeeded.to_string(), "succeeded");
        assert_eq!(StageStatus::Cancelled.to_string(), "cancelled");
    }

    #[test]
    fn test_stage_status_is_success() {
        assert!(StageStatus::Succeeded.is_success());
        assert!(StageStatus::Skipped.is_success());
        assert!(!StageStatus::Failed.is_success());
        assert!(!StageStatus::Cancelled.is_success());
    }

    #[test]
    fn test_run_status_reached_end() {
        assert!(RunStatus::Completed.reached_end());
        assert!(RunStatus::PartiallyCompleted.reached_end());
        assert!(!RunStatus::Cancelled.reached_end());
        assert!(!RunStatus::Failed {
            stage: "x".to_string(),
            kind: ErrorKind::Timeout,
        }
        .reached_end());
    }

    #[test]
    fn test_run_status_display() {
        let status = RunStatus::Failed {
            stage: "clone-repository".to_string(),
            kind: ErrorKind::ExternalFailure,
        };
        assert_eq!(
            status.to_string(),
            "failed at 'clone-repository' (external_failure)"
        );
    }

    #[test]
    fn test_run_status_serialize() {
        let json = serde_json::to_string(&RunStatus::Completed).unwrap();
        assert_eq!(json, r#"{"status":"completed"}"#);
    }
}
