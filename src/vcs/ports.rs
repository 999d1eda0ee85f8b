//! Port contract for creating project repositories.

use super::domain::{RepositoryRef, VcsAlias};
use crate::project::domain::ProjectId;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for VCS backend operations.
pub type VcsResult<T> = Result<T, VcsError>;

/// Repository provisioning contract.
#[async_trait]
pub trait VcsBackend: Send + Sync {
    /// Creates an empty repository for the project.
    ///
    /// # Errors
    ///
    /// Returns [`VcsError::AlreadyExists`] when a repository is already
    /// present for the project.
    async fn create_repository(
        &self,
        project: ProjectId,
        alias: VcsAlias,
    ) -> VcsResult<RepositoryRef>;

    /// Clones `source` into a new repository owned by `project`.
    ///
    /// # Errors
    ///
    /// Returns [`VcsError::AlreadyExists`] when the destination exists or
    /// [`VcsError::SourceMissing`] when `source` cannot be found.
    async fn fork_repository(
        &self,
        source: &RepositoryRef,
        project: ProjectId,
    ) -> VcsResult<RepositoryRef>;
}

/// Errors returned by VCS backends.
#[derive(Debug, Clone, Error)]
pub enum VcsError {
    /// A repository already exists at the destination.
    #[error("repository already exists at {0}")]
    AlreadyExists(String),

    /// The source repository of a fork does not exist.
    #[error("source repository not found: {0}")]
    SourceMissing(RepositoryRef),

    /// The backend command exited unsuccessfully.
    #[error("{command} failed: {stderr}")]
    CommandFailed {
        /// Command line that was executed.
        command: String,
        /// Captured standard error.
        stderr: String,
    },

    /// I/O or backend failure.
    #[error("vcs backend error: {0}")]
    Backend(Arc<dyn std::error::Error + Send + Sync>),
}

impl VcsError {
    /// Wraps a backend error.
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Arc::new(err))
    }
}
