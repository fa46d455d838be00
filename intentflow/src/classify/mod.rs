//! Request classification.
//!
//! Maps raw request text to a workflow category by scoring each
//! registered workflow's trigger table against normalized input. The
//! default [`TriggerClassifier`] is a pure function over text and the
//! registry; a model-backed intent classifier can be plugged in behind
//! the same [`Classifier`] trait.

mod trigger;

pub use trigger::TriggerClassifier;

/// A near-miss candidate surfaced with `Unrecognized` results.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Candidate {
    /// The candidate workflow category.
    pub category: String,
    /// The aggregate trigger score it reached.
    pub score: u32,
}

/// The result of classifying one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassificationResult {
    /// A workflow cleared the threshold.
    Matched {
        /// The winning category.
        category: String,
        /// The winning aggregate score.
        score: u32,
    },
    /// No workflow cleared the threshold; the best near-misses are
    /// carried for diagnostics rather than silently defaulting.
    Unrecognized {
        /// Best-scoring candidates, highest first, possibly empty.
        candidates: Vec<Candidate>,
    },
    /// The input was empty or whitespace-only.
    Invalid,
}

impl ClassificationResult {
    /// Returns the matched category, if any.
    #[must_use]
    pub fn category(&self) -> Option<&str> {
        match self {
            Self::Matched { category, .. } => Some(category),
            _ => None,
        }
    }
}

/// Trait for request classifiers.
pub trait Classifier: Send + Sync {
    /// Classifies raw request text.
    fn classify(&self, text: &str) -> ClassificationResult;
}

/// Normalizes request text for trigger matching: lowercased with
/// whitespace runs collapsed to single spaces.
#[must_use]
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_collapses_whitespace() {
        assert_eq!(
            normalize("  Analyze   Git\n\tRepository  "),
            "analyze git repository"
        );
    }

    #[test]
    fn test_normalize_empty() {
        assert_eq!(normalize("   \n\t "), "");
    }

    #[test]
    fn test_result_category_accessor() {
        let matched = ClassificationResult::Matched {
            category: "git-analysis".to_string(),
            score: 3,
        };
        assert_eq!(matched.category(), Some("git-analysis"));

        let unrecognized = ClassificationResult::Unrecognized {
            candidates: Vec::new(),
        };
        assert_eq!(unrecognized.category(), None);
    }
}
