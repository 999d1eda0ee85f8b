//! Project setup: drives a project through its checkpoint ladder.

use crate::accounts::UserDirectory;
use crate::config::TrackerSettings;
use crate::permission::{PermissionError, PermissionRepository, PermissionService};
use crate::project::domain::{
    Membership, Project, ProjectConfig, ProjectDomainError, ProjectId, ProjectState,
};
use crate::project::ports::{ProjectRepository, ProjectRepositoryError};
use crate::tracker::ports::WorkflowRepository;
use crate::tracker::services::{WorkflowServiceError, materialize_workflow};
use crate::vcs::{RepositoryRef, VcsAlias, VcsBackend, VcsError};
use crate::workflow::{WorkflowError, WorkflowId, WorkflowRegistry};
use async_trait::async_trait;
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info};

/// Errors raised while setting a project up.
#[derive(Debug, Error)]
pub enum ProjectSetupError {
    /// The project does not exist.
    #[error("project not found: {0}")]
    ProjectNotFound(ProjectId),
    /// A state change or repository attachment was rejected.
    #[error(transparent)]
    Domain(#[from] ProjectDomainError),
    /// Project storage failed.
    #[error(transparent)]
    Repository(#[from] ProjectRepositoryError),
    /// Granting author permissions failed.
    #[error(transparent)]
    Permission(#[from] PermissionError),
    /// The requested workflow is not registered.
    #[error(transparent)]
    Workflow(#[from] WorkflowError),
    /// Materializing the workflow failed.
    #[error(transparent)]
    Tracker(#[from] WorkflowServiceError),
    /// Creating the backing repository failed.
    #[error(transparent)]
    Vcs(#[from] VcsError),
}

/// Result type for setup operations.
pub type ProjectSetupResult<T> = Result<T, ProjectSetupError>;

/// What setup should provision for a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupRequest {
    /// Repository flavour, or `None` to skip repository creation.
    pub vcs: Option<VcsAlias>,
    /// Workflow to materialize.
    pub workflow: WorkflowId,
}

impl SetupRequest {
    /// Creates a request for the given workflow without a repository.
    #[must_use]
    pub const fn new(workflow: WorkflowId) -> Self {
        Self {
            vcs: None,
            workflow,
        }
    }

    /// Requests a repository of the given flavour.
    #[must_use]
    pub const fn with_vcs(mut self, alias: VcsAlias) -> Self {
        self.vcs = Some(alias);
        self
    }
}

/// Runs setup for a project, inline or in the background.
#[async_trait]
pub trait ProjectSetup: Send + Sync {
    /// Starts setup for `project`.
    ///
    /// Inline runners return the project as left by setup. Background
    /// runners return `None` once the work has been scheduled.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectSetupError`] when an inline setup fails.
    async fn run(
        &self,
        project: ProjectId,
        request: SetupRequest,
    ) -> ProjectSetupResult<Option<Project>>;
}

/// Collaborators shared by setup runs.
pub struct SetupDependencies<P, W, R, D, V, C>
where
    P: ProjectRepository,
    W: WorkflowRepository,
    R: PermissionRepository,
    D: UserDirectory,
    V: VcsBackend,
    C: Clock + Send + Sync,
{
    /// Project storage.
    pub projects: Arc<P>,
    /// Workflow storage.
    pub workflow: Arc<W>,
    /// Grant management.
    pub permissions: Arc<PermissionService<R, D>>,
    /// Repository provisioning.
    pub vcs: Arc<V>,
    /// Known workflow definitions.
    pub registry: Arc<WorkflowRegistry>,
    /// Time source.
    pub clock: Arc<C>,
}

/// Drives projects from `Pending` to `Ready`.
pub struct ProjectSetupService<P, W, R, D, V, C>
where
    P: ProjectRepository,
    W: WorkflowRepository,
    R: PermissionRepository,
    D: UserDirectory,
    V: VcsBackend,
    C: Clock + Send + Sync,
{
    deps: SetupDependencies<P, W, R, D, V, C>,
    tracker: TrackerSettings,
    create_repositories: bool,
}

impl<P, W, R, D, V, C> ProjectSetupService<P, W, R, D, V, C>
where
    P: ProjectRepository,
    W: WorkflowRepository,
    R: PermissionRepository,
    D: UserDirectory,
    V: VcsBackend,
    C: Clock + Send + Sync,
{
    /// Creates a setup service with default tracker settings and repository
    /// creation enabled.
    #[must_use]
    pub fn new(deps: SetupDependencies<P, W, R, D, V, C>) -> Self {
        Self {
            deps,
            tracker: TrackerSettings::default(),
            create_repositories: true,
        }
    }

    /// Sets the values written into new project configurations.
    #[must_use]
    pub const fn with_tracker_settings(mut self, tracker: TrackerSettings) -> Self {
        self.tracker = tracker;
        self
    }

    /// Enables or disables repository creation.
    #[must_use]
    pub const fn with_repository_creation(mut self, enabled: bool) -> Self {
        self.create_repositories = enabled;
        self
    }

    /// Runs every setup step for `project`.
    ///
    /// A project in `Error` is reset to `Pending` first. Steps already
    /// recorded by an earlier run are repeated without lowering the state.
    /// On failure the project is moved to `Error` with a description of the
    /// failure, persisted, and the error is returned.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectSetupError`] describing the failed step.
    pub async fn setup(
        &self,
        project_id: ProjectId,
        request: &SetupRequest,
    ) -> ProjectSetupResult<Project> {
        let mut project = self
            .deps
            .projects
            .find_by_id(project_id)
            .await?
            .ok_or(ProjectSetupError::ProjectNotFound(project_id))?;

        if project.state() == ProjectState::Error {
            info!(project = %project_id, "retrying failed project setup");
            project.reset_for_retry(&*self.deps.clock);
            self.deps.projects.update(&project).await?;
        }

        match self.run_steps(&mut project, request).await {
            Ok(()) => {
                info!(project = %project_id, "project setup finished");
                Ok(project)
            }
            Err(err) => {
                project.fail(err.to_string(), &*self.deps.clock);
                if let Err(persist_err) = self.deps.projects.update(&project).await {
                    error!(
                        project = %project_id,
                        error = %persist_err,
                        "failed to record project setup failure"
                    );
                }
                error!(project = %project_id, error = %err, "project setup failed");
                Err(err)
            }
        }
    }

    async fn run_steps(
        &self,
        project: &mut Project,
        request: &SetupRequest,
    ) -> ProjectSetupResult<()> {
        let id = project.id();
        self.advance(project, ProjectState::Created).await?;

        let membership = Membership::new(id, project.author(), &*self.deps.clock);
        self.deps.projects.add_membership(&membership).await?;
        self.advance(project, ProjectState::MembershipsCreated)
            .await?;

        self.deps
            .permissions
            .grant_author(id, project.author())
            .await?;
        self.advance(project, ProjectState::AuthorPermissionsCreated)
            .await?;

        let definition = self.deps.registry.resolve(&request.workflow)?;
        materialize_workflow(&*self.deps.workflow, id, &definition).await?;
        self.advance(project, ProjectState::WorkflowCreated).await?;

        self.ensure_config(id).await?;
        self.advance(project, ProjectState::ConfigCreated).await?;

        if let Some(alias) = request.vcs {
            self.ensure_repository(project, alias).await?;
        }

        self.advance(project, ProjectState::Ready).await
    }

    async fn ensure_config(&self, project: ProjectId) -> ProjectSetupResult<()> {
        if self.deps.projects.find_config(project).await?.is_some() {
            return Ok(());
        }
        let config = ProjectConfig::new(
            project,
            self.tracker.changesets_paginate_by,
            self.tracker.milestone_deadline_delta_days,
        );
        match self.deps.projects.store_config(&config).await {
            Ok(()) | Err(ProjectRepositoryError::ConfigAlreadyExists(_)) => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    async fn ensure_repository(
        &self,
        project: &mut Project,
        alias: VcsAlias,
    ) -> ProjectSetupResult<()> {
        if !self.create_repositories {
            debug!(project = %project.id(), "repository creation disabled");
            return Ok(());
        }
        if project.state() >= ProjectState::RepositoryCreated {
            return Ok(());
        }
        if project.repository().is_some() {
            return Err(ProjectDomainError::RepositoryAlreadyExists(project.id()).into());
        }

        let repository = match self.parent_repository(project).await? {
            Some(source) => self.deps.vcs.fork_repository(&source, project.id()).await?,
            None => self.deps.vcs.create_repository(project.id(), alias).await?,
        };
        info!(
            project = %project.id(),
            location = repository.location(),
            "created project repository"
        );
        project.attach_repository(repository, &*self.deps.clock)?;
        self.advance(project, ProjectState::RepositoryCreated).await
    }

    async fn parent_repository(
        &self,
        project: &Project,
    ) -> ProjectSetupResult<Option<RepositoryRef>> {
        let Some(parent) = project.parent() else {
            return Ok(None);
        };
        Ok(self
            .deps
            .projects
            .find_by_id(parent)
            .await?
            .and_then(|stored| stored.repository().cloned()))
    }

    async fn advance(&self, project: &mut Project, state: ProjectState) -> ProjectSetupResult<()> {
        project.checkpoint(state, &*self.deps.clock)?;
        self.deps.projects.update(project).await?;
        debug!(project = %project.id(), state = %project.state(), "setup checkpoint");
        Ok(())
    }
}

#[async_trait]
impl<P, W, R, D, V, C> ProjectSetup for ProjectSetupService<P, W, R, D, V, C>
where
    P: ProjectRepository,
    W: WorkflowRepository,
    R: PermissionRepository,
    D: UserDirectory,
    V: VcsBackend,
    C: Clock + Send + Sync,
{
    async fn run(
        &self,
        project: ProjectId,
        request: SetupRequest,
    ) -> ProjectSetupResult<Option<Project>> {
        self.setup(project, &request).await.map(Some)
    }
}
