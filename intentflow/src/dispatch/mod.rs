//! Workflow dispatch: sequential stage execution, failure policies,
//! timeouts, and cancellation.

mod dispatcher;

pub use dispatcher::{DispatchReport, WorkflowDispatcher};
