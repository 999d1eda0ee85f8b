//! Storage port for the activity log.

use super::domain::Action;
use crate::project::domain::ProjectId;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for action repository operations.
pub type ActionRepositoryResult<T> = Result<T, ActionRepositoryError>;

/// Append-only persistence contract for actions.
#[async_trait]
pub trait ActionRepository: Send + Sync {
    /// Appends an action.
    async fn record(&self, action: &Action) -> ActionRepositoryResult<()>;

    /// Lists a project's actions, oldest first.
    async fn list_for_project(&self, project: ProjectId) -> ActionRepositoryResult<Vec<Action>>;

    /// Lists the newest public actions across all projects.
    async fn list_public(&self, limit: usize) -> ActionRepositoryResult<Vec<Action>>;
}

/// Errors returned by action repositories.
#[derive(Debug, Clone, Error)]
pub enum ActionRepositoryError {
    /// Persistence layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl ActionRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
