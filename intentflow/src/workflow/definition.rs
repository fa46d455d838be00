//! Workflow definitions with registration-time validation.

use super::{FailurePolicy, StageSpec};
use crate::errors::WorkflowValidationError;
use regex::Regex;
use std::collections::HashSet;

/// A classification trigger: a keyword or regex pattern with a weight.
#[derive(Debug, Clone)]
pub enum Trigger {
    /// Matches when the normalized text contains the word.
    Keyword {
        /// The lowercased keyword.
        word: String,
        /// Score contributed by a match.
        weight: u32,
    },
    /// Matches when the regex matches the normalized text.
    Pattern {
        /// The compiled pattern.
        regex: Regex,
        /// Score contributed by a match.
        weight: u32,
    },
}

impl Trigger {
    /// Creates a keyword trigger with weight 1.
    #[must_use]
    pub fn keyword(word: impl Into<String>) -> Self {
        Self::Keyword {
            word: word.into().to_lowercase(),
            weight: 1,
        }
    }

    /// Creates a regex trigger with weight 1.
    ///
    /// # Errors
    ///
    /// Returns the regex compilation error for invalid patterns.
    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self::Pattern {
            regex: Regex::new(pattern)?,
            weight: 1,
        })
    }

    /// Sets the weight contributed by a match.
    #[must_use]
    pub fn with_weight(mut self, new_weight: u32) -> Self {
        match &mut self {
            Self::Keyword { weight, .. } | Self::Pattern { weight, .. } => *weight = new_weight,
        }
        self
    }

    /// Returns the score this trigger contributes for the normalized
    /// text, or zero when it does not match.
    #[must_use]
    pub fn score(&self, normalized: &str) -> u32 {
        match self {
            Self::Keyword { word, weight } => {
                if normalized.contains(word.as_str()) {
                    *weight
                } else {
                    0
                }
            }
            Self::Pattern { regex, weight } => {
                if regex.is_match(normalized) {
                    *weight
                } else {
                    0
                }
            }
        }
    }
}

/// An ordered list of stages plus routing metadata for one request
/// category.
///
/// Built through [`WorkflowDefinition::builder`], which validates the
/// key-flow contract and resolves each stage's failure policy before any
/// request is processed.
#[derive(Debug, Clone)]
pub struct WorkflowDefinition {
    category: String,
    triggers: Vec<Trigger>,
    initial_inputs: HashSet<String>,
    stages: Vec<StageSpec>,
    policies: Vec<FailurePolicy>,
}

impl WorkflowDefinition {
    /// Starts building a workflow for a category.
    #[must_use]
    pub fn builder(category: impl Into<String>) -> WorkflowBuilder {
        WorkflowBuilder {
            category: category.into(),
            triggers: Vec::new(),
            initial_inputs: HashSet::new(),
            stages: Vec::new(),
        }
    }

    /// Returns the workflow category.
    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Returns the classification triggers.
    #[must_use]
    pub fn triggers(&self) -> &[Trigger] {
        &self.triggers
    }

    /// Returns the keys the orchestrator seeds before dispatch.
    #[must_use]
    pub fn initial_inputs(&self) -> &HashSet<String> {
        &self.initial_inputs
    }

    /// Returns the ordered stage specifications.
    #[must_use]
    pub fn stages(&self) -> &[StageSpec] {
        &self.stages
    }

    /// Returns the resolved failure policy for the stage at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range; policies are resolved for every
    /// stage at build time.
    #[must_use]
    pub fn policy(&self, index: usize) -> FailurePolicy {
        self.policies[index]
    }

    /// Scores this workflow's triggers against normalized request text.
    #[must_use]
    pub fn score(&self, normalized: &str) -> u32 {
        self.triggers.iter().map(|t| t.score(normalized)).sum()
    }
}

/// Builder for [`WorkflowDefinition`] with fail-fast validation.
#[derive(Debug)]
pub struct WorkflowBuilder {
    category: String,
    triggers: Vec<Trigger>,
    initial_inputs: HashSet<String>,
    stages: Vec<StageSpec>,
}

impl WorkflowBuilder {
    /// Returns the category being built.
    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Adds a classification trigger.
    #[must_use]
    pub fn trigger(mut self, trigger: Trigger) -> Self {
        self.triggers.push(trigger);
        self
    }

    /// Adds keyword triggers, one per word.
    #[must_use]
    pub fn keywords(mut self, words: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.triggers
            .extend(words.into_iter().map(|w| Trigger::keyword(w)));
        self
    }

    /// Declares a key the orchestrator seeds before dispatch.
    #[must_use]
    pub fn initial_input(mut self, key: impl Into<String>) -> Self {
        self.initial_inputs.insert(key.into());
        self
    }

    /// Appends a stage.
    #[must_use]
    pub fn stage(mut self, spec: StageSpec) -> Self {
        self.stages.push(spec);
        self
    }

    /// Rewrites every staged spec, for applying configured overrides.
    #[must_use]
    pub fn map_stages(mut self, f: impl FnMut(StageSpec) -> StageSpec) -> Self {
        self.stages = self.stages.into_iter().map(f).collect();
        self
    }

    /// Validates and builds the workflow definition.
    ///
    /// Checks, in order: at least one stage; unique stage names; every
    /// stage's required keys are satisfiable from the initial inputs and
    /// earlier stages' produced keys. Then resolves each stage's failure
    /// policy: explicit policy wins, otherwise a stage is fatal exactly
    /// when it is the sole producer of a key some later stage requires.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowValidationError` describing the first violation.
    pub fn build(self) -> Result<WorkflowDefinition, WorkflowValidationError> {
        if self.stages.is_empty() {
            return Err(WorkflowValidationError::new(format!(
                "Workflow '{}' has no stages",
                self.category
            )));
        }

        let mut seen = HashSet::new();
        for spec in &self.stages {
            if !seen.insert(spec.name.clone()) {
                return Err(WorkflowValidationError::new(format!(
                    "Workflow '{}' declares stage '{}' more than once",
                    self.category, spec.name
                ))
                .with_stages(vec![spec.name.clone()]));
            }
        }

        // Key-flow check: requires(i) ⊆ initial ∪ produces(0..i).
        let mut available: HashSet<String> = self.initial_inputs.clone();
        for spec in &self.stages {
            for key in &spec.requires {
                if !available.contains(key) {
                    return Err(WorkflowValidationError::new(format!(
                        "Stage '{}' requires key '{}' which no earlier stage produces \
                         and is not a declared initial input",
                        spec.name, key
                    ))
                    .with_stages(vec![spec.name.clone()]));
                }
            }
            available.extend(spec.produces.iter().cloned());
        }

        let policies = resolve_policies(&self.stages, &self.initial_inputs);

        Ok(WorkflowDefinition {
            category: self.category,
            triggers: self.triggers,
            initial_inputs: self.initial_inputs,
            stages: self.stages,
            policies,
        })
    }
}

/// Resolves each stage's failure policy.
///
/// A stage without an explicit policy defaults to `Fatal` when it is the
/// sole producer of a key a later stage requires; keys also seeded as
/// initial inputs or produced by another stage do not make it fatal.
fn resolve_policies(stages: &[StageSpec], initial_inputs: &HashSet<String>) -> Vec<FailurePolicy> {
    stages
        .iter()
        .enumerate()
        .map(|(i, spec)| {
            if let Some(policy) = spec.on_failure {
                return policy;
            }

            let sole_producer_of_needed_key = spec.produces.iter().any(|key| {
                let consumed_later = stages[i + 1..]
                    .iter()
                    .any(|later| later.requires.contains(key));
                if !consumed_later {
                    return false;
                }
                let other_producer = initial_inputs.contains(key)
                    || stages
                        .iter()
                        .enumerate()
                        .any(|(j, other)| j != i && other.produces.contains(key));
                !other_producer
            });

            if sole_producer_of_needed_key {
                FailurePolicy::Fatal
            } else {
                FailurePolicy::Recoverable
            }
        })
        .collect()
}
