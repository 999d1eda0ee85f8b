//! In-memory VCS backend recording provisioned repositories.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::project::domain::ProjectId;
use crate::vcs::{
    domain::{RepositoryRef, VcsAlias},
    ports::{VcsBackend, VcsError, VcsResult},
};

/// Thread-safe in-memory VCS backend.
#[derive(Debug, Clone, Default)]
pub struct InMemoryVcsBackend {
    repositories: Arc<RwLock<HashMap<ProjectId, RepositoryRef>>>,
}

impl InMemoryVcsBackend {
    /// Creates an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the repository provisioned for a project, if any.
    #[must_use]
    pub fn repository_of(&self, project: ProjectId) -> Option<RepositoryRef> {
        self.repositories
            .read()
            .ok()
            .and_then(|repositories| repositories.get(&project).cloned())
    }

    fn insert(&self, project: ProjectId, alias: VcsAlias) -> VcsResult<RepositoryRef> {
        let mut repositories = self
            .repositories
            .write()
            .map_err(|err| VcsError::backend(std::io::Error::other(err.to_string())))?;
        let location = format!("memory://{}/{project}", alias.as_str());
        if repositories.contains_key(&project) {
            return Err(VcsError::AlreadyExists(location));
        }
        let repository = RepositoryRef::new(alias, location);
        repositories.insert(project, repository.clone());
        Ok(repository)
    }
}

#[async_trait]
impl VcsBackend for InMemoryVcsBackend {
    async fn create_repository(
        &self,
        project: ProjectId,
        alias: VcsAlias,
    ) -> VcsResult<RepositoryRef> {
        self.insert(project, alias)
    }

    async fn fork_repository(
        &self,
        source: &RepositoryRef,
        project: ProjectId,
    ) -> VcsResult<RepositoryRef> {
        let source_exists = self
            .repositories
            .read()
            .map_err(|err| VcsError::backend(std::io::Error::other(err.to_string())))?
            .values()
            .any(|repository| repository == source);
        if !source_exists {
            return Err(VcsError::SourceMissing(source.clone()));
        }
        self.insert(project, source.alias())
    }
}
