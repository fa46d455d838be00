//! Shared-context management for workflow runs.
//!
//! This module provides:
//! - The thread-safe entry bag with key-ownership enforcement
//! - Stage-execution history records
//! - The per-request `SharedContext` threaded through all stages

mod entries;
mod history;
mod shared;

pub use entries::EntryBag;
pub use history::{OpenStageRecord, StageError, StageRecord};
pub use shared::SharedContext;
