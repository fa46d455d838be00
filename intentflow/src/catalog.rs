//! The builtin workflow catalog.
//!
//! Five workflows cover the categories the engine routes out of the box.
//! Stage implementations are collaborators supplied through a
//! [`StageProvider`]; the catalog contributes only routing metadata and
//! the data contract between stages. A provider missing any referenced
//! stage fails catalog construction before a single request is served.

use crate::config::EngineConfig;
use crate::errors::EngineError;
use crate::stage::Stage;
use crate::workflow::{StageSpec, Trigger, WorkflowBuilder, WorkflowDefinition, WorkflowRegistry};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// The context key every workflow receives carrying the raw request
/// text.
pub const REQUEST_TEXT_KEY: &str = "request_text";

/// Supplies stage implementations by name.
pub trait StageProvider: Send + Sync {
    /// Returns the stage registered under `name`, if any.
    fn stage(&self, name: &str) -> Option<Arc<dyn Stage>>;
}

/// A [`StageProvider`] backed by a name-to-stage map.
#[derive(Default)]
pub struct MapStageProvider {
    stages: RwLock<HashMap<String, Arc<dyn Stage>>>,
}

impl MapStageProvider {
    /// Creates an empty provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a stage under its own name, replacing any previous
    /// registration.
    pub fn insert(&self, stage: Arc<dyn Stage>) {
        self.stages
            .write()
            .insert(stage.name().to_string(), stage);
    }
}

impl StageProvider for MapStageProvider {
    fn stage(&self, name: &str) -> Option<Arc<dyn Stage>> {
        self.stages.read().get(name).cloned()
    }
}

impl std::fmt::Debug for MapStageProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapStageProvider")
            .field("stages", &self.stages.read().len())
            .finish()
    }
}

/// Builds the builtin registry, wiring provider stages into the five
/// catalog workflows and applying configuration overrides.
///
/// Registration order here is the classification tie-break order.
///
/// # Errors
///
/// Returns `EngineError::MissingStage` when the provider lacks a
/// referenced stage, `EngineError::Validation` if an override breaks a
/// workflow's data contract, or `EngineError::Config` for an invalid
/// configured pattern.
pub fn builtin_registry(
    provider: &dyn StageProvider,
    config: &EngineConfig,
) -> Result<WorkflowRegistry, EngineError> {
    let mut registry = WorkflowRegistry::new();
    registry.register(git_analysis(provider, config)?)?;
    registry.register(issue_test_generation(provider, config)?)?;
    registry.register(document_processing(provider, config)?)?;
    registry.register(script_generation(provider, config)?)?;
    registry.register(test_generation(provider, config)?)?;
    Ok(registry)
}

fn git_analysis(
    provider: &dyn StageProvider,
    config: &EngineConfig,
) -> Result<WorkflowDefinition, EngineError> {
    let builder = WorkflowDefinition::builder("git-analysis")
        .keywords(["git", "repository", "repo", "github", "gitlab"])
        .keywords(["analyze", "changes", "diff", "commit"])
        .initial_input(REQUEST_TEXT_KEY)
        .initial_input("repository_url")
        .stage(
            spec(provider, "clone-repository")?
                .requires(["repository_url"])
                .produces(["repo_path"]),
        )
        .stage(
            spec(provider, "detect-changes")?
                .requires(["repo_path"])
                .produces(["changed_files"]),
        )
        .stage(
            spec(provider, "impact-analysis")?
                .requires(["changed_files"])
                .produces(["impact_report"]),
        );
    finish(builder, config)
}

fn issue_test_generation(
    provider: &dyn StageProvider,
    config: &EngineConfig,
) -> Result<WorkflowDefinition, EngineError> {
    let builder = WorkflowDefinition::builder("issue-test-generation")
        .keywords(["jira", "ticket", "issue", "story"])
        .keywords(["test", "case", "scenario"])
        .initial_input(REQUEST_TEXT_KEY)
        .initial_input("ticket_id")
        .stage(
            spec(provider, "fetch-ticket")?
                .requires(["ticket_id"])
                .produces(["ticket"]),
        )
        .stage(
            spec(provider, "extract-requirements")?
                .requires(["ticket"])
                .produces(["requirements"]),
        )
        .stage(
            spec(provider, "design-test-cases")?
                .requires(["requirements"])
                .produces(["test_cases"]),
        )
        .stage(
            spec(provider, "implement-tests")?
                .requires(["test_cases"])
                .produces(["test_code"]),
        );
    finish(builder, config)
}

fn document_processing(
    provider: &dyn StageProvider,
    config: &EngineConfig,
) -> Result<WorkflowDefinition, EngineError> {
    let builder = WorkflowDefinition::builder("document-processing")
        .keywords(["pdf", "document", "file"])
        .initial_input(REQUEST_TEXT_KEY)
        .initial_input("document_path")
        .stage(
            spec(provider, "extract-content")?
                .requires(["document_path"])
                .produces(["document_text"]),
        )
        .stage(
            spec(provider, "analyze-document")?
                .requires(["document_text"])
                .produces(["analysis_report"]),
        );
    finish(builder, config)
}

fn script_generation(
    provider: &dyn StageProvider,
    config: &EngineConfig,
) -> Result<WorkflowDefinition, EngineError> {
    let builder = WorkflowDefinition::builder("script-generation")
        .keywords(["script", "automation", "generate"])
        .initial_input(REQUEST_TEXT_KEY)
        .stage(
            spec(provider, "gather-requirements")?
                .requires([REQUEST_TEXT_KEY])
                .produces(["script_requirements"]),
        )
        .stage(
            spec(provider, "generate-script")?
                .requires(["script_requirements"])
                .produces(["script_code"]),
        )
        .stage(
            spec(provider, "verify-script")?
                .requires(["script_code"])
                .produces(["verification_report"]),
        );
    finish(builder, config)
}

fn test_generation(
    provider: &dyn StageProvider,
    config: &EngineConfig,
) -> Result<WorkflowDefinition, EngineError> {
    let builder = WorkflowDefinition::builder("test-generation")
        .keywords(["test", "unittest", "pytest", "coverage"])
        .initial_input(REQUEST_TEXT_KEY)
        .stage(
            spec(provider, "analyze-code")?
                .requires([REQUEST_TEXT_KEY])
                .produces(["code_analysis"]),
        )
        .stage(
            spec(provider, "design-test-cases")?
                .requires(["code_analysis"])
                .produces(["test_cases"]),
        )
        .stage(
            spec(provider, "implement-tests")?
                .requires(["test_cases"])
                .produces(["test_code"]),
        );
    finish(builder, config)
}

fn spec(provider: &dyn StageProvider, name: &str) -> Result<StageSpec, EngineError> {
    let runner = provider
        .stage(name)
        .ok_or_else(|| EngineError::MissingStage(name.to_string()))?;
    Ok(StageSpec::new(name, runner))
}

/// Applies configured triggers and stage overrides, then validates.
fn finish(
    mut builder: WorkflowBuilder,
    config: &EngineConfig,
) -> Result<WorkflowDefinition, EngineError> {
    if let Some(category_config) = config.category(builder.category()) {
        builder = builder.keywords(category_config.keywords.iter().cloned());
        for weighted in &category_config.patterns {
            let trigger = Trigger::pattern(&weighted.pattern)
                .map_err(|e| EngineError::Config(e.to_string()))?
                .with_weight(weighted.weight);
            builder = builder.trigger(trigger);
        }
        builder = builder.map_stages(|mut stage_spec| {
            if let Some(stage_override) = category_config.stages.get(&stage_spec.name) {
                if let Some(timeout) = stage_override.timeout() {
                    stage_spec.timeout = Some(timeout);
                }
                if let Some(policy) = stage_override.on_failure {
                    stage_spec.on_failure = Some(policy);
                }
            }
            stage_spec
        });
    }
    Ok(builder.build()?)
}
