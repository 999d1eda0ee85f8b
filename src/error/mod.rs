//! Crate-level error taxonomy.
//!
//! Each layer owns its error enum. [`ProjectorError`] gathers the service
//! errors for callers that drive several services, such as the operator
//! binary.

use crate::config::ConfigError;
use crate::project::domain::{ForkError, ProjectId, ProjectState};
use crate::project::services::{ProjectServiceError, ProjectSetupError};
use crate::tracker::services::{TaskServiceError, WorkflowServiceError};
use thiserror::Error;

/// Errors surfaced by the projector library.
#[derive(Debug, Error)]
pub enum ProjectorError {
    /// A project configuration record already exists.
    #[error("configuration already exists for project {0}")]
    ConfigAlreadyExists(ProjectId),
    /// A fork request was rejected.
    #[error(transparent)]
    Fork(#[from] ForkError),
    /// The project is not in a state that supports the operation.
    #[error("project {project} is {state}; operation unsupported")]
    Unsupported {
        /// Affected project.
        project: ProjectId,
        /// State the project is in.
        state: ProjectState,
    },
    /// Configuration loading failed.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A project lifecycle operation failed.
    #[error(transparent)]
    Project(#[from] ProjectServiceError),
    /// Project setup failed.
    #[error(transparent)]
    Setup(#[from] ProjectSetupError),
    /// A task operation failed.
    #[error(transparent)]
    Task(#[from] TaskServiceError),
    /// A workflow operation failed.
    #[error(transparent)]
    Workflow(#[from] WorkflowServiceError),
}

/// Result type for crate-level operations.
pub type ProjectorResult<T> = Result<T, ProjectorError>;
