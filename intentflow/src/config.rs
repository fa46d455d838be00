//! Engine configuration loaded once at startup.

use crate::errors::EngineError;
use crate::workflow::FailurePolicy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

/// Configuration for the request engine.
///
/// Loaded from JSON once at startup and immutable afterwards. Category
/// entries override or extend the builtin catalog's routing metadata;
/// stage overrides tune timeouts and failure policies without touching
/// the stage implementations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Minimum aggregate trigger score a workflow needs to win
    /// classification.
    #[serde(default = "default_min_score")]
    pub min_score: u32,
    /// Default per-stage timeout in seconds.
    #[serde(default = "default_stage_timeout")]
    pub default_stage_timeout_secs: u64,
    /// Per-category configuration, keyed by workflow category.
    #[serde(default)]
    pub categories: HashMap<String, CategoryConfig>,
}

fn default_min_score() -> u32 {
    1
}

fn default_stage_timeout() -> u64 {
    60
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_score: default_min_score(),
            default_stage_timeout_secs: default_stage_timeout(),
            categories: HashMap::new(),
        }
    }
}

impl EngineConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a configuration from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Config` for malformed JSON.
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        serde_json::from_str(json).map_err(|e| EngineError::Config(e.to_string()))
    }

    /// Loads a configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Io` if the file cannot be read, or
    /// `EngineError::Config` for malformed JSON.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Returns the default stage timeout as a duration.
    #[must_use]
    pub fn default_stage_timeout(&self) -> Duration {
        Duration::from_secs(self.default_stage_timeout_secs)
    }

    /// Returns the configuration for a category, if present.
    #[must_use]
    pub fn category(&self, category: &str) -> Option<&CategoryConfig> {
        self.categories.get(category)
    }

    /// Returns the override for one stage of one category, if present.
    #[must_use]
    pub fn stage_override(&self, category: &str, stage: &str) -> Option<&StageOverride> {
        self.category(category).and_then(|c| c.stages.get(stage))
    }
}

/// Per-category routing and stage tuning.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryConfig {
    /// Extra keyword triggers for this category, weight 1 each.
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Extra regex pattern triggers for this category.
    #[serde(default)]
    pub patterns: Vec<WeightedPattern>,
    /// Per-stage overrides, keyed by stage name.
    #[serde(default)]
    pub stages: HashMap<String, StageOverride>,
}

/// A regex trigger with an explicit weight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightedPattern {
    /// The regex source.
    pub pattern: String,
    /// Score contributed by a match.
    #[serde(default = "default_pattern_weight")]
    pub weight: u32,
}

fn default_pattern_weight() -> u32 {
    1
}

/// Tuning knobs for one stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StageOverride {
    /// Overrides the stage timeout, in seconds.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// Overrides the stage failure policy.
    #[serde(default)]
    pub on_failure: Option<FailurePolicy>,
}

impl StageOverride {
    /// Returns the timeout override as a duration.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.min_score, 1);
        assert_eq!(config.default_stage_timeout(), Duration::from_secs(60));
        assert!(config.categories.is_empty());
    }

    #[test]
    fn test_from_json_full() {
        let json = r#"{
            "min_score": 2,
            "default_stage_timeout_secs": 120,
            "categories": {
                "git-analysis": {
                    "keywords": ["bitbucket"],
                    "patterns": [{"pattern": "https?://\\S+\\.git", "weight": 3}],
                    "stages": {
                        "clone-repository": {"timeout_secs": 300, "on_failure": "fatal"}
                    }
                }
            }
        }"#;

        let config = EngineConfig::from_json(json).unwrap();
        assert_eq!(config.min_score, 2);

        let category = config.category("git-analysis").unwrap();
        assert_eq!(category.keywords, vec!["bitbucket".to_string()]);
        assert_eq!(category.patterns[0].weight, 3);

        let stage = config.stage_override("git-analysis", "clone-repository").unwrap();
        assert_eq!(stage.timeout(), Some(Duration::from_secs(300)));
        assert_eq!(stage.on_failure, Some(FailurePolicy::Fatal));
    }

    #[test]
    fn test_from_json_fields_default() {
        let config = EngineConfig::from_json("{}").unwrap();
        assert_eq!(config.min_score, 1);
        assert_eq!(config.default_stage_timeout_secs, 60);
    }

    #[test]
    fn test_from_json_malformed() {
        let err = EngineConfig::from_json("{not json").unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }
}
