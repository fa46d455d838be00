//! Deterministic run summaries rendered from final entries and history.

mod summarizer;

pub use summarizer::{CategoryTemplate, ResultSummarizer};
