//! The top-level request orchestrator.
//!
//! One `handle` call takes free-form text all the way to a [`Response`]:
//! classify, extract initial inputs, dispatch the matched workflow, and
//! summarize. The orchestrator holds only `Arc`-shared read-only state,
//! so one instance serves sequential and concurrent requests alike.

use crate::classify::{Candidate, ClassificationResult, Classifier, TriggerClassifier};
use crate::config::EngineConfig;
use crate::core::Response;
use crate::dispatch::WorkflowDispatcher;
use crate::errors::EngineError;
use crate::events::EventSink;
use crate::summarize::ResultSummarizer;
use crate::workflow::WorkflowRegistry;
use regex::Regex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Extracts category-specific initial inputs from raw request text.
///
/// Pluggable so a structured front end (a form, an API payload) can seed
/// the context directly instead of re-parsing prose.
pub trait InputExtractor: Send + Sync {
    /// Returns the initial entries to seed before dispatch.
    fn extract(&self, category: &str, text: &str) -> HashMap<String, serde_json::Value>;
}

/// The default extractor: regex passes over the raw text for URLs,
/// ticket identifiers, and document paths, plus the text itself under
/// `request_text`.
///
/// Extraction ignores the category; a key a workflow does not require is
/// harmless extra context.
#[derive(Debug)]
pub struct RegexInputExtractor {
    url: Regex,
    ticket: Regex,
    document: Regex,
}

impl RegexInputExtractor {
    /// Creates the default extractor.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Config` if a built-in pattern fails to
    /// compile.
    pub fn new() -> Result<Self, EngineError> {
        Ok(Self {
            url: compile(r"https?://[^\s)>\]]+")?,
            ticket: compile(r"\b[A-Z][A-Z0-9]+-\d+\b")?,
            document: compile(r"[\w./~-]+\.(?:pdf|docx?|txt|md|csv)\b")?,
        })
    }
}

fn compile(pattern: &str) -> Result<Regex, EngineError> {
    Regex::new(pattern).map_err(|e| EngineError::Config(e.to_string()))
}

impl InputExtractor for RegexInputExtractor {
    fn extract(&self, _category: &str, text: &str) -> HashMap<String, serde_json::Value> {
        let mut inputs = HashMap::new();
        inputs.insert(
            crate::catalog::REQUEST_TEXT_KEY.to_string(),
            serde_json::json!(text),
        );

        if let Some(found) = self.url.find(text) {
            inputs.insert(
                "repository_url".to_string(),
                serde_json::json!(found.as_str()),
            );
        }
        if let Some(found) = self.ticket.find(text) {
            inputs.insert("ticket_id".to_string(), serde_json::json!(found.as_str()));
        }
        if let Some(found) = self.document.find(text) {
            inputs.insert(
                "document_path".to_string(),
                serde_json::json!(found.as_str()),
            );
        }
        inputs
    }
}

/// Routes requests to workflows and renders their results.
#[derive(Clone)]
pub struct Orchestrator {
    registry: Arc<WorkflowRegistry>,
    classifier: Arc<dyn Classifier>,
    extractor: Arc<dyn InputExtractor>,
    summarizer: Arc<ResultSummarizer>,
    dispatcher: WorkflowDispatcher,
}

impl Orchestrator {
    /// Creates an orchestrator over a registry with trigger
    /// classification, regex input extraction, and the builtin
    /// summarizer templates.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Config` if the default extractor cannot be
    /// built.
    pub fn new(registry: Arc<WorkflowRegistry>, config: &EngineConfig) -> Result<Self, EngineError> {
        Ok(Self {
            classifier: Arc::new(TriggerClassifier::new(registry.clone(), config.min_score)),
            extractor: Arc::new(RegexInputExtractor::new()?),
            summarizer: Arc::new(ResultSummarizer::for_builtin_catalog()),
            dispatcher: WorkflowDispatcher::new()
                .with_default_timeout(config.default_stage_timeout()),
            registry,
        })
    }

    /// Replaces the classifier.
    #[must_use]
    pub fn with_classifier(mut self, classifier: Arc<dyn Classifier>) -> Self {
        self.classifier = classifier;
        self
    }

    /// Replaces the input extractor.
    #[must_use]
    pub fn with_extractor(mut self, extractor: Arc<dyn InputExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Replaces the summarizer.
    #[must_use]
    pub fn with_summarizer(mut self, summarizer: ResultSummarizer) -> Self {
        self.summarizer = Arc::new(summarizer);
        self
    }

    /// Attaches an event sink to every dispatched run.
    #[must_use]
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.dispatcher = self.dispatcher.with_event_sink(sink);
        self
    }

    /// Handles one request end to end. Always returns a response; errors
    /// surface in its status and summary.
    pub async fn handle(&self, text: &str) -> Response {
        match self.classifier.classify(text) {
            ClassificationResult::Invalid => {
                debug!("rejecting empty request");
                Response::invalid_input("Request text was empty or unparseable.")
            }
            ClassificationResult::Unrecognized { candidates } => {
                debug!(candidates = candidates.len(), "no workflow matched");
                Response::unrecognized(clarification(&candidates))
            }
            ClassificationResult::Matched { category, score } => {
                info!(%category, score, "request classified");
                self.dispatch(&category, text).await
            }
        }
    }

    /// Handles a batch of requests concurrently, one independent context
    /// each. Responses come back in input order.
    pub async fn handle_many(&self, texts: &[&str]) -> Vec<Response> {
        futures::future::join_all(texts.iter().map(|text| self.handle(text))).await
    }

    async fn dispatch(&self, category: &str, text: &str) -> Response {
        // A custom classifier may name a category the registry lacks.
        let Some(definition) = self.registry.get(category) else {
            return Response::unrecognized(format!(
                "No workflow is registered under category '{category}'."
            ));
        };
        let definition = definition.clone();

        let initial = self.extractor.extract(category, text);
        let report = self.dispatcher.run(&definition, initial).await;
        self.summarizer.summarize(&report.context, &report.status)
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("workflows", &self.registry.len())
            .finish()
    }
}

fn clarification(candidates: &[Candidate]) -> String {
    if candidates.is_empty() {
        return "No workflow matched the request. \
                Try mentioning a repository, ticket, document, script, or tests."
            .to_string();
    }
    let names: Vec<&str> = candidates.iter().map(|c| c.category.as_str()).collect();
    format!(
        "No workflow matched the request confidently. Closest matches: {}.",
        names.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{builtin_registry, MapStageProvider};
    use crate::context::SharedContext;
    use crate::core::{ResponseStatus, StageOutcome};
    use crate::errors::ErrorKind;
    use crate::stage::{FnStage, NoOpStage, Stage};
    use crate::testing::FailingStage;

    fn provider_with_noops() -> MapStageProvider {
        let provider = MapStageProvider::new();
        for name in [
            "clone-repository",
            "detect-changes",
            "impact-analysis",
            "fetch-ticket",
            "extract-requirements",
            "design-test-cases",
            "implement-tests",
            "extract-content",
            "analyze-document",
            "gather-requirements",
            "generate-script",
            "verify-script",
            "analyze-code",
        ] {
            provider.insert(Arc::new(NoOpStage::new(name)));
        }
        provider
    }

    fn orchestrator_with(provider: &MapStageProvider) -> Orchestrator {
        let config = EngineConfig::default();
        let registry = Arc::new(builtin_registry(provider, &config).unwrap());
        Orchestrator::new(registry, &config).unwrap()
    }

    fn producing(name: &str, key: &str, value: serde_json::Value) -> Arc<dyn Stage> {
        let key = key.to_string();
        Arc::new(FnStage::new(name, move |_ctx: &SharedContext| {
            StageOutcome::ok_value(key.clone(), value.clone())
        }))
    }

    #[tokio::test]
    async fn test_handle_empty_input() {
        let response = orchestrator_with(&provider_with_noops()).handle("   ").await;
        assert_eq!(
            response.status,
            ResponseStatus::Failed {
                kind: ErrorKind::InvalidInput,
                stage: None,
            }
        );
    }

    #[tokio::test]
    async fn test_handle_unrecognized_hello() {
        let response = orchestrator_with(&provider_with_noops()).handle("hello").await;
        assert_eq!(response.status, ResponseStatus::Unrecognized);
        assert!(response.category.is_none());
        assert!(response.summary.contains("No workflow matched"));
    }

    #[tokio::test]
    async fn test_handle_git_request_end_to_end() {
        let provider = provider_with_noops();
        provider.insert(producing(
            "clone-repository",
            "repo_path",
            serde_json::json!("/tmp/demo"),
        ));
        provider.insert(producing(
            "detect-changes",
            "changed_files",
            serde_json::json!(["src/lib.rs"]),
        ));
        provider.insert(producing(
            "impact-analysis",
            "impact_report",
            serde_json::json!({"risk": "low"}),
        ));

        let response = orchestrator_with(&provider)
            .handle("analyze the git repository at https://github.com/acme/demo")
            .await;

        assert_eq!(response.status, ResponseStatus::Completed);
        assert_eq!(response.category.as_deref(), Some("git-analysis"));
        assert_eq!(response.artifact, Some(serde_json::json!({"risk": "low"})));
        assert!(response.request_id.is_some());
    }

    #[tokio::test]
    async fn test_handle_git_clone_failure_no_artifact() {
        let provider = provider_with_noops();
        provider.insert(Arc::new(FailingStage::external(
            "clone-repository",
            "authentication failed",
        )));

        let response = orchestrator_with(&provider)
            .handle("check the git repo at https://github.com/acme/demo")
            .await;

        assert_eq!(
            response.status,
            ResponseStatus::Failed {
                kind: ErrorKind::ExternalFailure,
                stage: Some("clone-repository".to_string()),
            }
        );
        assert!(response.artifact.is_none());
        assert!(response.summary.contains("clone-repository"));
    }

    #[tokio::test]
    async fn test_extractor_seeds_ticket_id() {
        let extractor = RegexInputExtractor::new().unwrap();
        let inputs = extractor.extract(
            "issue-test-generation",
            "generate tests for jira ticket PROJ-1234",
        );

        assert_eq!(inputs["ticket_id"], serde_json::json!("PROJ-1234"));
        assert!(inputs.contains_key("request_text"));
    }

    #[tokio::test]
    async fn test_extractor_seeds_document_path() {
        let extractor = RegexInputExtractor::new().unwrap();
        let inputs = extractor.extract("document-processing", "summarize reports/q3-audit.pdf");

        assert_eq!(
            inputs["document_path"],
            serde_json::json!("reports/q3-audit.pdf")
        );
    }

    #[tokio::test]
    async fn test_replay_same_request_same_response() {
        let provider = provider_with_noops();
        provider.insert(producing(
            "analyze-code",
            "code_analysis",
            serde_json::json!({"functions": 4}),
        ));
        provider.insert(producing(
            "design-test-cases",
            "test_cases",
            serde_json::json!(["happy path"]),
        ));
        provider.insert(producing(
            "implement-tests",
            "test_code",
            serde_json::json!("fn test_happy_path() {}"),
        ));

        let orchestrator = orchestrator_with(&provider);
        let text = "write unittest coverage for the parser";
        let first = orchestrator.handle(text).await;
        let second = orchestrator.handle(text).await;

        // Identical apart from the per-request identifier.
        assert_eq!(first.status, second.status);
        assert_eq!(first.category, second.category);
        assert_eq!(first.artifact, second.artifact);
        assert_eq!(first.summary, second.summary);
        assert_ne!(first.request_id, second.request_id);
    }

    #[tokio::test]
    async fn test_handle_many_preserves_order() {
        let orchestrator = orchestrator_with(&provider_with_noops());
        let responses = orchestrator
            .handle_many(&["hello", "process the file notes.txt"])
            .await;

        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0].status, ResponseStatus::Unrecognized);
        assert_eq!(
            responses[1].category.as_deref(),
            Some("document-processing")
        );
    }
}
