//! Stage specifications and failure policy.

use crate::stage::Stage;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

/// Whether a stage failure aborts the run or lets it continue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Abort the remaining stages; the run is `Failed`.
    Fatal,
    /// Log and continue; downstream stages decide whether missing keys
    /// stop them.
    Recoverable,
}

/// Specification for a single stage in a workflow.
///
/// Declares the data contract the dispatcher enforces: required input
/// keys, produced output keys, and the keys this stage owns and may
/// legally overwrite.
#[derive(Debug, Clone)]
pub struct StageSpec {
    /// The unique stage name within its workflow.
    pub name: String,
    /// The stage implementation.
    pub runner: Arc<dyn Stage>,
    /// Keys that must exist in the context before this stage runs.
    pub requires: Vec<String>,
    /// Keys this stage is expected to produce.
    pub produces: Vec<String>,
    /// Existing keys this stage declares ownership of and may overwrite.
    pub overwrites: HashSet<String>,
    /// Explicit failure policy; `None` means derive the default at
    /// registration time.
    pub on_failure: Option<FailurePolicy>,
    /// Maximum execution duration; `None` uses the dispatcher default.
    pub timeout: Option<Duration>,
}

impl StageSpec {
    /// Creates a new stage specification.
    #[must_use]
    pub fn new(name: impl Into<String>, runner: Arc<dyn Stage>) -> Self {
        Self {
            name: name.into(),
            runner,
            requires: Vec::new(),
            produces: Vec::new(),
            overwrites: HashSet::new(),
            on_failure: None,
            timeout: None,
        }
    }

    /// Sets the required input keys.
    #[must_use]
    pub fn requires(mut self, keys: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.requires = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the produced output keys.
    #[must_use]
    pub fn produces(mut self, keys: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.produces = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Declares keys this stage owns and may overwrite.
    #[must_use]
    pub fn overwrites(mut self, keys: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.overwrites = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Marks failures of this stage as fatal.
    #[must_use]
    pub fn fatal(mut self) -> Self {
        self.on_failure = Some(FailurePolicy::Fatal);
        self
    }

    /// Marks failures of this stage as recoverable.
    #[must_use]
    pub fn recoverable(mut self) -> Self {
        self.on_failure = Some(FailurePolicy::Recoverable);
        self
    }

    /// Sets the per-stage timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Returns true if the stage may write the given key over an
    /// existing entry.
    #[must_use]
    pub fn owns(&self, key: &str) -> bool {
        self.overwrites.contains(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::NoOpStage;

    fn noop(name: &str) -> Arc<dyn Stage> {
        Arc::new(NoOpStage::new(name))
    }

    #[test]
    fn test_spec_builder() {
        let spec = StageSpec::new("detect-changes", noop("detect-changes"))
            .requires(["repo_path"])
            .produces(["changed_files"])
            .with_timeout(Duration::from_secs(30))
            .fatal();

        assert_eq!(spec.name, "detect-changes");
        assert_eq!(spec.requires, vec!["repo_path".to_string()]);
        assert_eq!(spec.produces, vec!["changed_files".to_string()]);
        assert_eq!(spec.on_failure, Some(FailurePolicy::Fatal));
        assert_eq!(spec.timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_spec_ownership() {
        let spec = StageSpec::new("refine", noop("refine"))
            .produces(["test_code"])
            .overwrites(["test_code"]);

        assert!(spec.owns("test_code"));
        assert!(!spec.owns("other_key"));
    }

    #[test]
    fn test_failure_policy_serialize() {
        let json = serde_json::to_string(&FailurePolicy::Recoverable).unwrap();
        assert_eq!(json, r#""recoverable""#);
    }
}
