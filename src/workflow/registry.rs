//! Explicit registry of workflow definitions.

use super::{WorkflowDefinition, WorkflowError, WorkflowId};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Workflow definitions keyed by identifier.
///
/// The registry always contains the built-in `default` workflow. Additional
/// definitions are registered by application startup code.
#[derive(Debug, Clone)]
pub struct WorkflowRegistry {
    definitions: BTreeMap<WorkflowId, Arc<WorkflowDefinition>>,
}

impl WorkflowRegistry {
    /// Creates a registry holding only the built-in workflow.
    #[must_use]
    pub fn new() -> Self {
        let default_workflow = WorkflowDefinition::default_workflow();
        let mut definitions = BTreeMap::new();
        definitions.insert(default_workflow.id().clone(), Arc::new(default_workflow));
        Self { definitions }
    }

    /// Registers a workflow definition.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::AlreadyRegistered`] when the identifier is
    /// taken.
    pub fn register(&mut self, definition: WorkflowDefinition) -> Result<(), WorkflowError> {
        let id = definition.id().clone();
        if self.definitions.contains_key(&id) {
            return Err(WorkflowError::AlreadyRegistered(id.to_string()));
        }
        self.definitions.insert(id, Arc::new(definition));
        Ok(())
    }

    /// Resolves a workflow by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::UnknownWorkflow`] when nothing is registered
    /// under the identifier.
    pub fn resolve(&self, id: &WorkflowId) -> Result<Arc<WorkflowDefinition>, WorkflowError> {
        self.definitions
            .get(id)
            .cloned()
            .ok_or_else(|| WorkflowError::UnknownWorkflow(id.to_string()))
    }

    /// Returns the registered identifiers in sorted order.
    #[must_use]
    pub fn ids(&self) -> Vec<WorkflowId> {
        self.definitions.keys().cloned().collect()
    }
}

impl Default for WorkflowRegistry {
    fn default() -> Self {
        Self::new()
    }
}
