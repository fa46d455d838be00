//! Rendering of run results into user-facing responses.

use crate::context::{SharedContext, StageRecord};
use crate::core::{Response, ResponseStatus, RunStatus, StageStatus};
use std::collections::HashMap;
use std::fmt::Write as _;

/// Per-category presentation: a headline and the entry key holding the
/// run's primary artifact.
#[derive(Debug, Clone)]
pub struct CategoryTemplate {
    /// Headline describing what the workflow does.
    pub headline: String,
    /// The entry key whose value is surfaced as the response artifact.
    pub artifact_key: Option<String>,
}

impl CategoryTemplate {
    /// Creates a template with a headline and an artifact key.
    #[must_use]
    pub fn new(headline: impl Into<String>, artifact_key: impl Into<String>) -> Self {
        Self {
            headline: headline.into(),
            artifact_key: Some(artifact_key.into()),
        }
    }

    /// Creates a template with no primary artifact.
    #[must_use]
    pub fn headline_only(headline: impl Into<String>) -> Self {
        Self {
            headline: headline.into(),
            artifact_key: None,
        }
    }
}

/// Renders final context state and history into a [`Response`].
///
/// Rendering is a pure function of its inputs: the same entries, history,
/// and run status always produce the same summary text. Failed runs still
/// report what completed before the stop.
#[derive(Debug, Clone, Default)]
pub struct ResultSummarizer {
    templates: HashMap<String, CategoryTemplate>,
}

impl ResultSummarizer {
    /// Creates a summarizer with no category templates; categories
    /// without a template get a generic headline and no artifact.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) the template for a category.
    #[must_use]
    pub fn with_template(mut self, category: impl Into<String>, template: CategoryTemplate) -> Self {
        self.templates.insert(category.into(), template);
        self
    }

    /// Creates a summarizer preloaded with the builtin catalog's
    /// templates.
    #[must_use]
    pub fn for_builtin_catalog() -> Self {
        Self::new()
            .with_template(
                "git-analysis",
                CategoryTemplate::new("Git repository analysis", "impact_report"),
            )
            .with_template(
                "issue-test-generation",
                CategoryTemplate::new("Test generation from tracked issue", "test_code"),
            )
            .with_template(
                "document-processing",
                CategoryTemplate::new("Document processing", "analysis_report"),
            )
            .with_template(
                "script-generation",
                CategoryTemplate::new("Script generation", "script_code"),
            )
            .with_template(
                "test-generation",
                CategoryTemplate::new("Test generation", "test_code"),
            )
    }

    /// Renders the response for a finished run.
    #[must_use]
    pub fn summarize(&self, ctx: &SharedContext, status: &RunStatus) -> Response {
        let template = self.templates.get(ctx.category());
        let history = ctx.history();

        let artifact = template
            .and_then(|t| t.artifact_key.as_deref())
            .and_then(|key| ctx.entries.get(key));

        Response {
            status: ResponseStatus::from(status),
            request_id: Some(ctx.request_id()),
            category: Some(ctx.category().to_string()),
            artifact,
            summary: self.render_text(ctx.category(), template, &history, status),
        }
    }

    fn render_text(
        &self,
        category: &str,
        template: Option<&CategoryTemplate>,
        history: &[StageRecord],
        status: &RunStatus,
    ) -> String {
        let headline = template.map_or_else(
            || format!("Workflow '{category}'"),
            |t| t.headline.clone(),
        );

        let mut text = match status {
            RunStatus::Completed => format!("{headline}: completed."),
            RunStatus::PartiallyCompleted => {
                format!("{headline}: completed with recoverable failures.")
            }
            RunStatus::Failed { stage, kind } => {
                format!("{headline}: stopped at stage '{stage}' ({kind}).")
            }
            RunStatus::Cancelled => format!("{headline}: cancelled."),
        };

        let succeeded = history
            .iter()
            .filter(|r| r.status == StageStatus::Succeeded)
            .count();
        let _ = write!(text, " Stages: {succeeded}/{} succeeded.", history.len());

        for record in history {
            let _ = write!(text, "\n  - {}: {}", record.stage, record.status);
            if let Some(error) = &record.error {
                let _ = write!(text, " ({}: {})", error.kind, error.message);
            }
            if let Some(reason) = &record.skip_reason {
                let _ = write!(text, " ({reason})");
            }
        }

        text
    }
}
