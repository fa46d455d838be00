//! Workflow definitions, validation, and the process-wide registry.
//!
//! A workflow is an ordered list of stages plus routing metadata for one
//! request category. Definitions are validated at registration time so
//! malformed workflows fail before any request is processed.

mod definition;
mod registry;
mod spec;

pub use definition::{Trigger, WorkflowBuilder, WorkflowDefinition};
pub use registry::WorkflowRegistry;
pub use spec::{FailurePolicy, StageSpec};
