//! In-memory activity log.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use crate::activity::{
    domain::Action,
    ports::{ActionRepository, ActionRepositoryError, ActionRepositoryResult},
};
use crate::project::domain::ProjectId;

/// Thread-safe in-memory action log.
#[derive(Debug, Clone, Default)]
pub struct InMemoryActionRepository {
    actions: Arc<RwLock<Vec<Action>>>,
}

impl InMemoryActionRepository {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned(err: impl std::fmt::Display) -> ActionRepositoryError {
    ActionRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl ActionRepository for InMemoryActionRepository {
    async fn record(&self, action: &Action) -> ActionRepositoryResult<()> {
        self.actions.write().map_err(poisoned)?.push(action.clone());
        Ok(())
    }

    async fn list_for_project(&self, project: ProjectId) -> ActionRepositoryResult<Vec<Action>> {
        Ok(self
            .actions
            .read()
            .map_err(poisoned)?
            .iter()
            .filter(|action| action.project_id() == project)
            .cloned()
            .collect())
    }

    async fn list_public(&self, limit: usize) -> ActionRepositoryResult<Vec<Action>> {
        Ok(self
            .actions
            .read()
            .map_err(poisoned)?
            .iter()
            .rev()
            .filter(|action| action.is_public())
            .take(limit)
            .cloned()
            .collect())
    }
}
