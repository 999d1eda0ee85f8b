//! Repository port for projects, memberships, teams and configuration.

use crate::accounts::{GroupId, UserId};
use crate::project::domain::{
    Membership, Project, ProjectConfig, ProjectId, ProjectName, ProjectSlug, Team,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for project repository operations.
pub type ProjectRepositoryResult<T> = Result<T, ProjectRepositoryError>;

/// Project persistence contract.
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Stores a new project.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectRepositoryError::DuplicateProject`] when the id exists
    /// or [`ProjectRepositoryError::DuplicateName`] when the author already
    /// owns a project with the same name.
    async fn store(&self, project: &Project) -> ProjectRepositoryResult<()>;

    /// Persists changes to an existing project (state, error text,
    /// repository, timestamps).
    ///
    /// # Errors
    ///
    /// Returns [`ProjectRepositoryError::NotFound`] when the project does not
    /// exist.
    async fn update(&self, project: &Project) -> ProjectRepositoryResult<()>;

    /// Finds a project by identifier.
    async fn find_by_id(&self, id: ProjectId) -> ProjectRepositoryResult<Option<Project>>;

    /// Finds a project by author and slug.
    async fn find_by_author_and_slug(
        &self,
        author: UserId,
        slug: &ProjectSlug,
    ) -> ProjectRepositoryResult<Option<Project>>;

    /// Returns every project sharing the given tree root, root included.
    async fn list_tree(&self, root: ProjectId) -> ProjectRepositoryResult<Vec<Project>>;

    /// Returns the most recently created public projects, newest first.
    async fn list_latest_public(&self, limit: usize) -> ProjectRepositoryResult<Vec<Project>>;

    /// Creates a membership unless it exists. Returns `true` when created.
    async fn add_membership(&self, membership: &Membership) -> ProjectRepositoryResult<bool>;

    /// Removes a membership. Returns `true` when one was removed.
    async fn remove_membership(
        &self,
        project: ProjectId,
        user: UserId,
    ) -> ProjectRepositoryResult<bool>;

    /// Returns the memberships of a project ordered by join time.
    async fn list_memberships(&self, project: ProjectId)
    -> ProjectRepositoryResult<Vec<Membership>>;

    /// Adds a team unless it exists. Returns `true` when created.
    async fn add_team(&self, team: &Team) -> ProjectRepositoryResult<bool>;

    /// Removes a team. Returns `true` when one was removed.
    async fn remove_team(&self, project: ProjectId, group: GroupId)
    -> ProjectRepositoryResult<bool>;

    /// Returns the teams of a project ordered by creation time.
    async fn list_teams(&self, project: ProjectId) -> ProjectRepositoryResult<Vec<Team>>;

    /// Stores the configuration of a project.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectRepositoryError::ConfigAlreadyExists`] when the
    /// project already has one.
    async fn store_config(&self, config: &ProjectConfig) -> ProjectRepositoryResult<()>;

    /// Finds the configuration of a project.
    async fn find_config(&self, project: ProjectId)
    -> ProjectRepositoryResult<Option<ProjectConfig>>;
}

/// Errors returned by project repository implementations.
#[derive(Debug, Clone, Error)]
pub enum ProjectRepositoryError {
    /// A project with the same identifier already exists.
    #[error("duplicate project identifier: {0}")]
    DuplicateProject(ProjectId),

    /// The author already owns a project with this name.
    #[error("author {author} already owns a project named '{name}'")]
    DuplicateName {
        /// Owning user.
        author: UserId,
        /// Conflicting name.
        name: ProjectName,
    },

    /// The project was not found.
    #[error("project not found: {0}")]
    NotFound(ProjectId),

    /// The project already has a configuration record.
    #[error("configuration already exists for project {0}")]
    ConfigAlreadyExists(ProjectId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl ProjectRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
