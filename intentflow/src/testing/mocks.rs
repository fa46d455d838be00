//! Mock stages for testing.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::time::Duration;

use crate::context::SharedContext;
use crate::core::StageOutcome;
use crate::errors::ErrorKind;
use crate::stage::Stage;

/// A mock stage that records calls and returns a configurable outcome.
#[derive(Debug)]
pub struct MockStage {
    name: String,
    outcome: Mutex<StageOutcome>,
    call_count: Mutex<usize>,
    seen_keys: Mutex<Vec<Vec<String>>>,
}

impl MockStage {
    /// Creates a new mock stage with an empty success outcome.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            outcome: Mutex::new(StageOutcome::ok_empty()),
            call_count: Mutex::new(0),
            seen_keys: Mutex::new(Vec::new()),
        }
    }

    /// Sets the outcome to return.
    pub fn set_outcome(&self, outcome: StageOutcome) {
        *self.outcome.lock() = outcome;
    }

    /// Returns the number of times the stage was called.
    #[must_use]
    pub fn call_count(&self) -> usize {
        *self.call_count.lock()
    }

    /// Returns the context keys visible at each call.
    #[must_use]
    pub fn seen_keys(&self) -> Vec<Vec<String>> {
        self.seen_keys.lock().clone()
    }

    /// Resets call tracking.
    pub fn reset(&self) {
        *self.call_count.lock() = 0;
        self.seen_keys.lock().clear();
    }
}

#[async_trait]
impl Stage for MockStage {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, ctx: &SharedContext) -> StageOutcome {
        *self.call_count.lock() += 1;
        self.seen_keys.lock().push(ctx.entries.keys());
        self.outcome.lock().clone()
    }
}

/// A stage that succeeds and produces a single entry.
#[derive(Debug)]
pub struct ProducerStage {
    name: String,
    key: String,
    value: serde_json::Value,
    call_count: Mutex<usize>,
}

impl ProducerStage {
    /// Creates a new producer stage.
    #[must_use]
    pub fn new(name: impl Into<String>, key: impl Into<String>, value: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            key: key.into(),
            value,
            call_count: Mutex::new(0),
        }
    }

    /// Returns the number of times the stage was called.
    #[must_use]
    pub fn call_count(&self) -> usize {
        *self.call_count.lock()
    }
}

#[async_trait]
impl Stage for ProducerStage {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, _ctx: &SharedContext) -> StageOutcome {
        *self.call_count.lock() += 1;
        StageOutcome::ok_value(self.key.clone(), self.value.clone())
    }
}

/// A stage that always fails with a fixed error kind.
#[derive(Debug)]
pub struct FailingStage {
    name: String,
    kind: ErrorKind,
    message: String,
}

impl FailingStage {
    /// Creates a new failing stage.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            message: message.into(),
        }
    }

    /// Creates a failing stage reporting an external collaborator error.
    #[must_use]
    pub fn external(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(name, ErrorKind::ExternalFailure, message)
    }
}

#[async_trait]
impl Stage for FailingStage {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, _ctx: &SharedContext) -> StageOutcome {
        StageOutcome::fail(self.kind, self.message.clone())
    }
}

/// A stage that takes time to execute.
#[derive(Debug)]
pub struct SlowStage {
    name: String,
    delay: Duration,
    entry: Option<(String, serde_json::Value)>,
}

impl SlowStage {
    /// Creates a new slow stage.
    #[must_use]
    pub fn new(name: impl Into<String>, delay: Duration) -> Self {
        Self {
            name: name.into(),
            delay,
            entry: None,
        }
    }

    /// Creates a slow stage with delay in milliseconds.
    #[must_use]
    pub fn with_delay_ms(name: impl Into<String>, ms: u64) -> Self {
        Self::new(name, Duration::from_millis(ms))
    }

    /// Creates a slow stage that produces an entry once the delay
    /// elapses.
    #[must_use]
    pub fn producing(
        name: impl Into<String>,
        ms: u64,
        key: impl Into<String>,
        value: serde_json::Value,
    ) -> Self {
        Self {
            name: name.into(),
            delay: Duration::from_millis(ms),
            entry: Some((key.into(), value)),
        }
    }
}

#[async_trait]
impl Stage for SlowStage {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, _ctx: &SharedContext) -> StageOutcome {
        tokio::time::sleep(self.delay).await;
        match &self.entry {
            Some((key, value)) => StageOutcome::ok_value(key.clone(), value.clone()),
            None => StageOutcome::ok_empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[tokio::test]
    async fn test_mock_stage_records_calls() {
        let stage = MockStage::new("mock");
        let ctx = SharedContext::new("test", HashMap::new());

        assert!(stage.execute(&ctx).await.is_success());
        assert!(stage.execute(&ctx).await.is_success());
        assert_eq!(stage.call_count(), 2);

        stage.reset();
        assert_eq!(stage.call_count(), 0);
    }

    #[tokio::test]
    async fn test_mock_stage_configurable_outcome() {
        let stage = MockStage::new("mock");
        stage.set_outcome(StageOutcome::fail(ErrorKind::ExternalFailure, "boom"));

        let ctx = SharedContext::new("test", HashMap::new());
        let outcome = stage.execute(&ctx).await;
        assert_eq!(outcome.error_kind(), Some(ErrorKind::ExternalFailure));
    }

    #[tokio::test]
    async fn test_failing_stage() {
        let stage = FailingStage::external("fetch-ticket", "HTTP 503");
        let ctx = SharedContext::new("issue-test-generation", HashMap::new());

        let outcome = stage.execute(&ctx).await;
        assert!(outcome.is_failure());
        assert_eq!(outcome.error_kind(), Some(ErrorKind::ExternalFailure));
    }
}
