//! Stage outcome type with factory methods.

use crate::errors::ErrorKind;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The result a stage hands back to the dispatcher.
///
/// A `StageOutcome` is immutable once created. Produced keys are merged
/// into the shared context by the dispatcher, never by the stage itself,
/// so key-ownership rules are enforced in one place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StageOutcome {
    /// The stage completed and produced zero or more context entries.
    Success {
        /// Keys and values to merge into the shared context.
        produced: HashMap<String, serde_json::Value>,
    },
    /// The stage failed.
    Failure {
        /// The failure classification.
        kind: ErrorKind,
        /// Human-readable detail.
        message: String,
    },
    /// The stage declined to run.
    Skipped {
        /// Why the stage was skipped.
        reason: String,
    },
}

impl StageOutcome {
    /// Creates a successful outcome with no produced entries.
    #[must_use]
    pub fn ok_empty() -> Self {
        Self::Success {
            produced: HashMap::new(),
        }
    }

    /// Creates a successful outcome with produced entries.
    #[must_use]
    pub fn ok(produced: HashMap<String, serde_json::Value>) -> Self {
        Self::Success { produced }
    }

    /// Creates a successful outcome producing a single entry.
    #[must_use]
    pub fn ok_value(key: impl Into<String>, value: serde_json::Value) -> Self {
        let mut produced = HashMap::new();
        produced.insert(key.into(), value);
        Self::Success { produced }
    }

    /// Creates a failure outcome.
    #[must_use]
    pub fn fail(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::Failure {
            kind,
            message: message.into(),
        }
    }

    /// Creates a collaborator-reported failure.
    #[must_use]
    pub fn external(message: impl Into<String>) -> Self {
        Self::fail(ErrorKind::ExternalFailure, message)
    }

    /// Creates a skip outcome with a reason.
    #[must_use]
    pub fn skip(reason: impl Into<String>) -> Self {
        Self::Skipped {
            reason: reason.into(),
        }
    }

    /// Returns true if the outcome is a success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Returns true if the outcome is a failure.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure { .. })
    }

    /// Returns the produced entries, if any.
    #[must_use]
    pub fn produced(&self) -> Option<&HashMap<String, serde_json::Value>> {
        match self {
            Self::Success { produced } => Some(produced),
            _ => None,
        }
    }

    /// Returns the failure kind, if this is a failure.
    #[must_use]
    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Failure { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}
