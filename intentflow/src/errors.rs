//! Error types for the intentflow engine.
//!
//! Stage-local failures are carried as an [`ErrorKind`] inside execution
//! history rather than propagated as Rust errors; the types here cover the
//! structural failures (malformed workflows, registry misuse, bad config)
//! that abort before or outside a run.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Classification of a stage-level or request-level failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The request text was empty or unparseable.
    InvalidInput,
    /// No registered workflow matched the request.
    Unrecognized,
    /// A stage's required input keys were absent from the context.
    MissingInput,
    /// A stage produced a key that collides with an existing entry it
    /// does not own.
    KeyConflict,
    /// A stage exceeded its configured maximum duration.
    Timeout,
    /// A collaborator reported an error during stage execution.
    ExternalFailure,
    /// The request was cancelled before or during the stage.
    Cancelled,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput => write!(f, "invalid_input"),
            Self::Unrecognized => write!(f, "unrecognized"),
            Self::MissingInput => write!(f, "missing_input"),
            Self::KeyConflict => write!(f, "key_conflict"),
            Self::Timeout => write!(f, "timeout"),
            Self::ExternalFailure => write!(f, "external_failure"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Error raised when a workflow definition fails registration-time
/// validation.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct WorkflowValidationError {
    /// The error message.
    pub message: String,
    /// The stages involved in the error.
    pub stages: Vec<String>,
}

impl WorkflowValidationError {
    /// Creates a new workflow validation error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stages: Vec::new(),
        }
    }

    /// Sets the stages involved.
    #[must_use]
    pub fn with_stages(mut self, stages: Vec<String>) -> Self {
        self.stages = stages;
        self
    }
}

/// Error raised when writing an existing key the writer does not own.
#[derive(Debug, Clone, Error)]
#[error("Key conflict: stage '{stage}' wrote '{key}' without declaring ownership")]
pub struct KeyConflictError {
    /// The stage attempting the write.
    pub stage: String,
    /// The conflicting key.
    pub key: String,
}

impl KeyConflictError {
    /// Creates a new key conflict error.
    #[must_use]
    pub fn new(stage: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            key: key.into(),
        }
    }
}

/// The top-level error type for intentflow operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A workflow definition failed validation.
    #[error("{0}")]
    Validation(#[from] WorkflowValidationError),

    /// An undeclared key overwrite occurred.
    #[error("{0}")]
    KeyConflict(#[from] KeyConflictError),

    /// A workflow category was registered twice.
    #[error("Duplicate workflow category: {0}")]
    DuplicateCategory(String),

    /// The catalog referenced a stage no provider supplies.
    #[error("No stage implementation registered for '{0}'")]
    MissingStage(String),

    /// Configuration could not be parsed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_display() {
        assert_eq!(ErrorKind::MissingInput.to_string(), "missing_input");
        assert_eq!(ErrorKind::Timeout.to_string(), "timeout");
        assert_eq!(ErrorKind::ExternalFailure.to_string(), "external_failure");
    }

    #[test]
    fn test_error_kind_serialize() {
        let json = serde_json::to_string(&ErrorKind::KeyConflict).unwrap();
        assert_eq!(json, r#""key_conflict""#);

        let kind: ErrorKind = serde_json::from_str(&json).unwrap();
        assert_eq!(kind, ErrorKind::KeyConflict);
    }

    #[test]
    fn test_validation_error() {
        let err = WorkflowValidationError::new("bad workflow")
            .with_stages(vec!["a".to_string(), "b".to_string()]);

        assert_eq!(err.to_string(), "bad workflow");
        assert_eq!(err.stages.len(), 2);
    }

    #[test]
    fn test_key_conflict_error() {
        let err = KeyConflictError::new("detect-changes", "repo_path");
        assert!(err.to_string().contains("detect-changes"));
        assert!(err.to_string().contains("repo_path"));
    }

    #[test]
    fn test_engine_error_from_validation() {
        let err: EngineError = WorkflowValidationError::new("oops").into();
        assert_eq!(err.to_string(), "oops");
    }
}
