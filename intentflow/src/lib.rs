//! # Intentflow
//!
//! A request router and workflow dispatcher with shared-context
//! orchestration.
//!
//! Intentflow takes free-form natural-language requests and:
//!
//! - **Classifies** them against per-workflow trigger tables
//! - **Dispatches** the matched workflow's stages strictly sequentially,
//!   threading a shared context with key-ownership enforcement
//! - **Tolerates partial failure** via per-stage fatal/recoverable
//!   policies, timeouts, and cancellation
//! - **Summarizes** every run into a structured response
//!
//! Stage bodies (cloning repositories, fetching tickets, extracting
//! documents, generating code) are external collaborators injected
//! behind the [`stage::Stage`] trait.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use intentflow::prelude::*;
//! use std::sync::Arc;
//!
//! let provider = MapStageProvider::new();
//! // ... register collaborator stages ...
//!
//! let config = EngineConfig::default();
//! let registry = Arc::new(builtin_registry(&provider, &config)?);
//! let orchestrator = Orchestrator::new(registry, &config)?;
//!
//! let response = orchestrator.handle("analyze the git repo at https://...").await;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod catalog;
pub mod classify;
pub mod config;
pub mod context;
pub mod core;
pub mod dispatch;
pub mod errors;
pub mod events;
pub mod observability;
pub mod orchestrator;
pub mod stage;
pub mod summarize;
pub mod testing;
pub mod workflow;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::catalog::{builtin_registry, MapStageProvider, StageProvider};
    pub use crate::classify::{
        ClassificationResult, Classifier, TriggerClassifier,
    };
    pub use crate::config::EngineConfig;
    pub use crate::context::{EntryBag, SharedContext, StageRecord};
    pub use crate::core::{
        Response, ResponseStatus, RunStatus, StageOutcome, StageStatus,
    };
    pub use crate::dispatch::{DispatchReport, WorkflowDispatcher};
    pub use crate::errors::{EngineError, ErrorKind};
    pub use crate::events::{EventSink, LoggingEventSink, NoOpEventSink};
    pub use crate::orchestrator::{InputExtractor, Orchestrator, RegexInputExtractor};
    pub use crate::stage::{FnStage, NoOpStage, Stage};
    pub use crate::summarize::{CategoryTemplate, ResultSummarizer};
    pub use crate::workflow::{
        FailurePolicy, StageSpec, Trigger, WorkflowBuilder, WorkflowDefinition,
        WorkflowRegistry,
    };
}
