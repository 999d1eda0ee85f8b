//! Error types for workflow definitions and registry lookups.

use thiserror::Error;

/// Errors returned while building or resolving workflow definitions.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WorkflowError {
    /// The workflow identifier is empty after trimming.
    #[error("workflow identifier must not be empty")]
    EmptyWorkflowId,

    /// No workflow is registered under the identifier.
    #[error("unknown workflow: {0}")]
    UnknownWorkflow(String),

    /// A workflow with the identifier is already registered.
    #[error("workflow already registered: {0}")]
    AlreadyRegistered(String),

    /// The definition has no status flagged as initial.
    #[error("workflow '{0}' defines no initial status")]
    MissingInitialStatus(String),

    /// The definition lists the same name twice in one dimension.
    #[error("workflow '{workflow}' repeats {dimension} '{name}'")]
    DuplicateEntry {
        /// Workflow identifier.
        workflow: String,
        /// Dimension holding the duplicate (component, status, ...).
        dimension: &'static str,
        /// Repeated name.
        name: String,
    },
}
