//! Core domain model types for intentflow.
//!
//! This module contains the types shared across the engine:
//! - Stage and run status enums
//! - The stage outcome type with factory methods
//! - The structured response returned to callers

mod outcome;
mod response;
mod status;

pub use outcome::StageOutcome;
pub use response::{Response, ResponseStatus};
pub use status::{RunStatus, StageStatus};
