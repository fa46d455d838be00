//! The structured response returned to the caller.

use super::RunStatus;
use crate::errors::ErrorKind;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The terminal status of one request as seen by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ResponseStatus {
    /// Every stage of the dispatched workflow made progress.
    Completed,
    /// The workflow finished with recoverable failures.
    PartiallyCompleted,
    /// The request failed before or during dispatch.
    Failed {
        /// The failure classification.
        kind: ErrorKind,
        /// The stage that stopped progress, when one did.
        #[serde(skip_serializing_if = "Option::is_none")]
        stage: Option<String>,
    },
    /// No workflow matched; the caller is asked to clarify.
    Unrecognized,
}

impl From<&RunStatus> for ResponseStatus {
    fn from(status: &RunStatus) -> Self {
        match status {
            RunStatus::Completed => Self::Completed,
            RunStatus::PartiallyCompleted => Self::PartiallyCompleted,
            RunStatus::Failed { stage, kind } => Self::Failed {
                kind: *kind,
                stage: Some(stage.clone()),
            },
            RunStatus::Cancelled => Self::Failed {
                kind: ErrorKind::Cancelled,
                stage: None,
            },
        }
    }
}

/// A user-facing response for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// The terminal status.
    pub status: ResponseStatus,
    /// The request identifier, when a context was created.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<Uuid>,
    /// The selected workflow category, when one was chosen.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// The primary artifact, when a stage produced one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact: Option<serde_json::Value>,
    /// Human-readable summary of what happened.
    pub summary: String,
}

impl Response {
    /// Creates a response for unparseable input.
    #[must_use]
    pub fn invalid_input(summary: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Failed {
                kind: ErrorKind::InvalidInput,
                stage: None,
            },
            request_id: None,
            category: None,
            artifact: None,
            summary: summary.into(),
        }
    }

    /// Creates a clarification response for unrecognized requests.
    #[must_use]
    pub fn unrecognized(summary: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Unrecognized,
            request_id: None,
            category: None,
            artifact: None,
            summary: summary.into(),
        }
    }

    /// Returns true if the request ran a workflow to completion.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == ResponseStatus::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_run_status() {
        let run = RunStatus::Failed {
            stage: "clone-repository".to_string(),
            kind: ErrorKind::ExternalFailure,
        };
        let status = ResponseStatus::from(&run);
        assert_eq!(
            status,
            ResponseStatus::Failed {
                kind: ErrorKind::ExternalFailure,
                stage: Some("clone-repository".to_string()),
            }
        );
    }

    #[test]
    fn test_status_from_cancelled() {
        let status = ResponseStatus::from(&RunStatus::Cancelled);
        assert_eq!(
            status,
            ResponseStatus::Failed {
                kind: ErrorKind::Cancelled,
                stage: None,
            }
        );
    }

    #[test]
    fn test_invalid_input_response() {
        let resp = Response::invalid_input("Request text was empty.");
        assert!(!resp.is_completed());
        assert!(resp.category.is_none());
        assert!(resp.artifact.is_none());
    }

    #[test]
    fn test_response_serialization_omits_empty_fields() {
        let resp = Response::unrecognized("No workflow matched.");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(!json.contains("request_id"));
        assert!(!json.contains("artifact"));
    }
}
