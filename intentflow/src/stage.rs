//! The stage capability interface.
//!
//! A stage is one unit of delegated work inside a workflow: cloning a
//! repository, fetching a ticket, extracting a document, invoking a code
//! generator. Concrete implementations live with their collaborators; the
//! engine depends only on this contract.

use crate::context::SharedContext;
use crate::core::StageOutcome;
use async_trait::async_trait;
use std::fmt::Debug;

/// Trait for workflow stages.
///
/// Stages read the shared context and report produced entries through
/// their outcome; the dispatcher merges outputs and enforces key
/// ownership, so stages never write to the context directly.
#[async_trait]
pub trait Stage: Send + Sync + Debug {
    /// Returns the name of the stage.
    fn name(&self) -> &str;

    /// Executes the stage against the shared context.
    ///
    /// May block on external I/O or suspend awaiting a collaborator; the
    /// dispatcher bounds the call with a timeout. A long-running stage
    /// should poll [`SharedContext::is_cancelled`] where it can.
    async fn execute(&self, ctx: &SharedContext) -> StageOutcome;
}

/// A stage backed by a synchronous closure.
pub struct FnStage<F>
where
    F: Fn(&SharedContext) -> StageOutcome + Send + Sync,
{
    name: String,
    func: F,
}

impl<F> FnStage<F>
where
    F: Fn(&SharedContext) -> StageOutcome + Send + Sync,
{
    /// Creates a new function-based stage.
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<F> Debug for FnStage<F>
where
    F: Fn(&SharedContext) -> StageOutcome + Send + Sync,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnStage").field("name", &self.name).finish()
    }
}

#[async_trait]
impl<F> Stage for FnStage<F>
where
    F: Fn(&SharedContext) -> StageOutcome + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, ctx: &SharedContext) -> StageOutcome {
        (self.func)(ctx)
    }
}

/// A no-op stage that succeeds without producing entries.
#[derive(Debug, Clone)]
pub struct NoOpStage {
    name: String,
}

impl NoOpStage {
    /// Creates a new no-op stage.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl Stage for NoOpStage {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, _ctx: &SharedContext) -> StageOutcome {
        StageOutcome::ok_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[tokio::test]
    async fn test_fn_stage() {
        let stage = FnStage::new("echo", |ctx: &SharedContext| {
            let url = ctx.entries.get("repository_url").unwrap_or_default();
            StageOutcome::ok_value("echoed", url)
        });

        assert_eq!(stage.name(), "echo");

        let mut initial = HashMap::new();
        initial.insert("repository_url".to_string(), serde_json::json!("https://x"));
        let ctx = SharedContext::new("git-analysis", initial);

        let outcome = stage.execute(&ctx).await;
        assert_eq!(
            outcome.produced().unwrap().get("echoed"),
            Some(&serde_json::json!("https://x"))
        );
    }

    #[tokio::test]
    async fn test_noop_stage() {
        let stage = NoOpStage::new("noop");
        let ctx = SharedContext::new("test-generation", HashMap::new());

        let outcome = stage.execute(&ctx).await;
        assert!(outcome.is_success());
    }
}
