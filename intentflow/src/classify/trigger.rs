//! Trigger-table classifier over the workflow registry.

use super::{Candidate, ClassificationResult, Classifier};
use crate::workflow::WorkflowRegistry;
use std::sync::Arc;

/// How many near-miss candidates an `Unrecognized` result carries.
const MAX_CANDIDATES: usize = 3;

/// A pure, deterministic classifier driven by the registry's trigger
/// tables.
///
/// Each workflow is scored by summing the weights of its matching
/// triggers against the normalized input. The highest score at or above
/// `min_score` wins; ties break by registration order, so identical input
/// against an identical registry always yields the identical result.
#[derive(Debug, Clone)]
pub struct TriggerClassifier {
    registry: Arc<WorkflowRegistry>,
    min_score: u32,
}

impl TriggerClassifier {
    /// Creates a classifier over a registry with the given minimum
    /// winning score.
    #[must_use]
    pub fn new(registry: Arc<WorkflowRegistry>, min_score: u32) -> Self {
        Self {
            registry,
            min_score: min_score.max(1),
        }
    }

    /// Returns the minimum winning score.
    #[must_use]
    pub fn min_score(&self) -> u32 {
        self.min_score
    }
}

impl Classifier for TriggerClassifier {
    fn classify(&self, text: &str) -> ClassificationResult {
        let normalized = super::normalize(text);
        if normalized.is_empty() {
            return ClassificationResult::Invalid;
        }

        let mut scored: Vec<(usize, &str, u32)> = self
            .registry
            .definitions()
            .iter()
            .enumerate()
            .map(|(order, def)| (order, def.category(), def.score(&normalized)))
            .collect();

        // Highest score first; registration order breaks ties.
        scored.sort_by(|a, b| b.2.cmp(&a.2).then(a.0.cmp(&b.0)));

        match scored.first() {
            Some(&(_, category, score)) if score >= self.min_score => {
                ClassificationResult::Matched {
                    category: category.to_string(),
                    score,
                }
            }
            _ => {
                let candidates = scored
                    .into_iter()
                    .filter(|&(_, _, score)| score > 0)
                    .take(MAX_CANDIDATES)
                    .map(|(_, category, score)| Candidate {
                        category: category.to_string(),
                        score,
                    })
                    .collect();
                ClassificationResult::Unrecognized { candidates }
            }
        }
    }
}
