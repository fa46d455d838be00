//! The process-wide workflow registry.

use super::WorkflowDefinition;
use crate::errors::EngineError;
use std::sync::Arc;

/// An ordered, read-only collection of workflow definitions.
///
/// Registration order is the classification tie-break order. The registry
/// is built once at startup and shared behind an `Arc`; concurrent reads
/// need no locking because nothing mutates after construction.
#[derive(Debug, Default)]
pub struct WorkflowRegistry {
    definitions: Vec<Arc<WorkflowDefinition>>,
}

impl WorkflowRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a workflow definition.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::DuplicateCategory` if the category is
    /// already registered.
    pub fn register(&mut self, definition: WorkflowDefinition) -> Result<(), EngineError> {
        if self.get(definition.category()).is_some() {
            return Err(EngineError::DuplicateCategory(
                definition.category().to_string(),
            ));
        }
        self.definitions.push(Arc::new(definition));
        Ok(())
    }

    /// Returns the definition for a category, if registered.
    #[must_use]
    pub fn get(&self, category: &str) -> Option<&Arc<WorkflowDefinition>> {
        self.definitions
            .iter()
            .find(|d| d.category() == category)
    }

    /// Returns the definitions in registration order.
    #[must_use]
    pub fn definitions(&self) -> &[Arc<WorkflowDefinition>] {
        &self.definitions
    }

    /// Returns the number of registered workflows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::NoOpStage;
    use crate::workflow::StageSpec;
    use std::sync::Arc;

    fn simple_workflow(category: &str) -> WorkflowDefinition {
        WorkflowDefinition::builder(category)
            .keywords([category])
            .stage(StageSpec::new("only", Arc::new(NoOpStage::new("only"))))
            .build()
            .unwrap()
    }

    #[test]
    fn test_register_and_get() {
        let mut registry = WorkflowRegistry::new();
        registry.register(simple_workflow("git-analysis")).unwrap();
        registry.register(simple_workflow("document-processing")).unwrap();

        assert_eq!(registry.len(), 2);
        assert!(registry.get("git-analysis").is_some());
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_duplicate_category_rejected() {
        let mut registry = WorkflowRegistry::new();
        registry.register(simple_workflow("git-analysis")).unwrap();

        let err = registry.register(simple_workflow("git-analysis")).unwrap_err();
        assert!(matches!(err, EngineError::DuplicateCategory(c) if c == "git-analysis"));
    }

    #[test]
    fn test_registration_order_preserved() {
        let mut registry = WorkflowRegistry::new();
        registry.register(simple_workflow("b-category")).unwrap();
        registry.register(simple_workflow("a-category")).unwrap();

        let order: Vec<_> = registry
            .definitions()
            .iter()
            .map(|d| d.category().to_string())
            .collect();
        assert_eq!(order, vec!["b-category".to_string(), "a-category".to_string()]);
    }
}
