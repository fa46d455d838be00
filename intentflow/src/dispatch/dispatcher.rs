//! Sequential workflow execution with failure policy enforcement.

use crate::context::{OpenStageRecord, SharedContext, StageError};
use crate::core::{RunStatus, StageOutcome};
use crate::errors::ErrorKind;
use crate::events::{EventSink, NoOpEventSink};
use crate::observability::SpanTimer;
use crate::workflow::{FailurePolicy, StageSpec, WorkflowDefinition};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// The outcome of one dispatched workflow run.
#[derive(Debug)]
pub struct DispatchReport {
    /// The final shared context, possibly partially populated.
    pub context: Arc<SharedContext>,
    /// The overall run status.
    pub status: RunStatus,
}

/// Executes a workflow definition's stages against one shared context.
///
/// Stages run strictly sequentially; each may suspend on external I/O,
/// and the dispatcher does not advance until the current stage resolves
/// through success, failure, timeout, or cancellation.
#[derive(Clone)]
pub struct WorkflowDispatcher {
    default_timeout: Duration,
    event_sink: Arc<dyn EventSink>,
}

impl Default for WorkflowDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkflowDispatcher {
    /// The stage timeout used when neither the spec nor the config sets
    /// one.
    pub const DEFAULT_STAGE_TIMEOUT: Duration = Duration::from_secs(60);

    /// Creates a dispatcher with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            default_timeout: Self::DEFAULT_STAGE_TIMEOUT,
            event_sink: Arc::new(NoOpEventSink),
        }
    }

    /// Sets the default per-stage timeout.
    #[must_use]
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Sets the event sink attached to each run's context.
    #[must_use]
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.event_sink = sink;
        self
    }

    /// Creates a fresh context for the definition's category and runs
    /// the workflow against it.
    pub async fn run(
        &self,
        definition: &WorkflowDefinition,
        initial_inputs: HashMap<String, serde_json::Value>,
    ) -> DispatchReport {
        let ctx = Arc::new(
            SharedContext::new(definition.category(), initial_inputs)
                .with_event_sink(self.event_sink.clone()),
        );
        self.run_context(definition, ctx).await
    }

    /// Runs the workflow against a caller-provided context.
    ///
    /// The caller may keep a clone of the `Arc` to request cancellation
    /// while the run is in flight.
    pub async fn run_context(
        &self,
        definition: &WorkflowDefinition,
        ctx: Arc<SharedContext>,
    ) -> DispatchReport {
        let mut recoverable_failures = false;

        for (index, spec) in definition.stages().iter().enumerate() {
            // No stage starts after cancellation is observed.
            if ctx.is_cancelled() {
                let reason = ctx.cancel_reason().unwrap_or_default();
                ctx.record(OpenStageRecord::start(spec.name.clone()).cancelled(reason.clone()));
                ctx.emit_event(
                    "stage.cancelled",
                    serde_json::json!({"stage": &spec.name, "reason": reason}),
                );
                return DispatchReport {
                    context: ctx,
                    status: RunStatus::Cancelled,
                };
            }

            let policy = definition.policy(index);
            let record = OpenStageRecord::start(spec.name.clone());

            // Precondition: required keys must already be present.
            let missing: Vec<&String> = spec
                .requires
                .iter()
                .filter(|key| !ctx.entries.contains_key(key))
                .collect();
            if !missing.is_empty() {
                let message = format!(
                    "missing required input keys: {}",
                    missing
                        .iter()
                        .map(|key| key.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                );
                let error = StageError::new(ErrorKind::MissingInput, message.clone());
                ctx.record(record.failed(error));
                ctx.emit_event(
                    "stage.failed",
                    serde_json::json!({"stage": &spec.name, "error": message}),
                );

                if policy == FailurePolicy::Fatal {
                    return DispatchReport {
                        context: ctx,
                        status: RunStatus::Failed {
                            stage: spec.name.clone(),
                            kind: ErrorKind::MissingInput,
                        },
                    };
                }
                warn!(stage = %spec.name, "recoverable failure: missing inputs");
                recoverable_failures = true;
                continue;
            }

            debug!(stage = %spec.name, category = %definition.category(), "stage starting");
            ctx.emit_event("stage.started", serde_json::json!({"stage": &spec.name}));

            let timer = SpanTimer::start(spec.name.clone());
            let outcome = self.execute_bounded(spec, &ctx).await;
            debug!(stage = %spec.name, elapsed_ms = timer.finish(), "stage resolved");

            // A cancellation that arrived while the stage ran discards
            // its output; the external call was allowed to finish.
            if ctx.is_cancelled() {
                let reason = ctx.cancel_reason().unwrap_or_default();
                ctx.record(record.cancelled(reason.clone()));
                ctx.emit_event(
                    "stage.cancelled",
                    serde_json::json!({"stage": &spec.name, "reason": reason}),
                );
                return DispatchReport {
                    context: ctx,
                    status: RunStatus::Cancelled,
                };
            }

            let failure = match outcome {
                StageOutcome::Success { produced } => {
                    match merge_produced(spec, &ctx, produced) {
                        Ok(()) => {
                            ctx.record(record.succeeded());
                            ctx.emit_event(
                                "stage.completed",
                                serde_json::json!({"stage": &spec.name}),
                            );
                            continue;
                        }
                        Err(message) => {
                            let error = StageError::new(ErrorKind::KeyConflict, message.clone());
                            ctx.record(record.failed(error));
                            ctx.emit_event(
                                "stage.failed",
                                serde_json::json!({"stage": &spec.name, "error": message}),
                            );
                            ErrorKind::KeyConflict
                        }
                    }
                }
                StageOutcome::Skipped { reason } => {
                    ctx.record(record.skipped(reason.clone()));
                    ctx.emit_event(
                        "stage.skipped",
                        serde_json::json!({"stage": &spec.name, "reason": reason}),
                    );
                    continue;
                }
                StageOutcome::Failure { kind, message } => {
                    ctx.record(record.failed(StageError::new(kind, message.clone())));
                    ctx.emit_event(
                        "stage.failed",
                        serde_json::json!({"stage": &spec.name, "error": message}),
                    );
                    kind
                }
            };

            if policy == FailurePolicy::Fatal {
                return DispatchReport {
                    context: ctx,
                    status: RunStatus::Failed {
                        stage: spec.name.clone(),
                        kind: failure,
                    },
                };
            }
            warn!(stage = %spec.name, kind = %failure, "recoverable failure: continuing");
            recoverable_failures = true;
        }

        let status = if recoverable_failures {
            RunStatus::PartiallyCompleted
        } else {
            RunStatus::Completed
        };
        DispatchReport {
            context: ctx,
            status,
        }
    }

    /// Executes a stage under its timeout.
    async fn execute_bounded(&self, spec: &StageSpec, ctx: &SharedContext) -> StageOutcome {
        let limit = spec.timeout.unwrap_or(self.default_timeout);
        match tokio::time::timeout(limit, spec.runner.execute(ctx)).await {
            Ok(outcome) => outcome,
            Err(_) => StageOutcome::fail(
                ErrorKind::Timeout,
                format!("stage exceeded {}s limit", limit.as_secs_f64()),
            ),
        }
    }
}

/// Merges a stage's produced entries, enforcing key ownership.
///
/// Conflicts are detected across all produced keys before anything is
/// written, so a conflicting stage leaves the context untouched.
fn merge_produced(
    spec: &StageSpec,
    ctx: &SharedContext,
    produced: HashMap<String, serde_json::Value>,
) -> Result<(), String> {
    for key in produced.keys() {
        if ctx.entries.contains_key(key) && !spec.owns(key) {
            return Err(format!(
                "stage '{}' produced key '{key}' which already exists and is not declared as owned",
                spec.name
            ));
        }
    }
    for (key, value) in produced {
        if spec.owns(&key) {
            ctx.entries.set_owned(key, value);
        } else {
            // Conflict-free by the check above; a racing write within one
            // run cannot happen because stages are sequential.
            let _ = ctx.entries.set(&spec.name, key, value);
        }
    }
    Ok(())
}
