//! Project creation, forking and membership management.

use super::setup::{ProjectSetup, ProjectSetupError, SetupRequest};
use crate::accounts::{GroupId, Principal, UserDirectory, UserId};
use crate::activity::{EventBus, FeedChannel, FeedError, ProjectEvent, render_project_feed};
use crate::config::{ProjectSettings, SetupSettings};
use crate::permission::{
    Authorizer, Grantee, PermissionError, PermissionRepository, PermissionService,
    ProjectPermission,
};
use crate::project::domain::{
    ForkError, Membership, NewProject, Project, ProjectConfig, ProjectDomainError, ProjectId,
    ProjectName, ProjectSlug, Team, Visibility, ensure_can_fork, ensure_fork_principal,
};
use crate::project::ports::{ProjectRepository, ProjectRepositoryError};
use crate::vcs::{RepositoryRef, VcsAlias};
use crate::workflow::WorkflowId;
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Service-level errors for project lifecycle operations.
#[derive(Debug, Error)]
pub enum ProjectServiceError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] ProjectDomainError),
    /// The fork request was rejected.
    #[error(transparent)]
    Fork(#[from] ForkError),
    /// Project storage failed.
    #[error(transparent)]
    Repository(#[from] ProjectRepositoryError),
    /// Authorization or grant storage failed.
    #[error(transparent)]
    Permission(#[from] PermissionError),
    /// Inline setup failed; the project is left in `Error`.
    #[error(transparent)]
    Setup(#[from] ProjectSetupError),
    /// Feed rendering failed.
    #[error(transparent)]
    Feed(#[from] FeedError),
    /// The operation needs an active, authenticated user.
    #[error("an active user is required")]
    LoginRequired,
    /// The project does not exist.
    #[error("project not found: {0}")]
    ProjectNotFound(ProjectId),
    /// No project with this slug belongs to the author.
    #[error("project '{slug}' not found for user {author}")]
    SlugNotFound {
        /// Owning user searched.
        author: UserId,
        /// Slug searched.
        slug: ProjectSlug,
    },
    /// The author's membership cannot be removed.
    #[error("the author of project {0} cannot be removed")]
    AuthorMembership(ProjectId),
}

/// Result type for project lifecycle operations.
pub type ProjectServiceResult<T> = Result<T, ProjectServiceError>;

/// Request payload for creating a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateProjectRequest {
    name: String,
    description: String,
    category: Option<String>,
    visibility: Visibility,
    vcs: Option<VcsAlias>,
    workflow: Option<WorkflowId>,
}

impl CreateProjectRequest {
    /// Creates a public project request with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            category: None,
            visibility: Visibility::Public,
            vcs: None,
            workflow: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the category.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Makes the project private.
    #[must_use]
    pub const fn private(mut self) -> Self {
        self.visibility = Visibility::Private;
        self
    }

    /// Selects the repository flavour instead of the configured default.
    #[must_use]
    pub const fn with_vcs(mut self, alias: VcsAlias) -> Self {
        self.vcs = Some(alias);
        self
    }

    /// Selects the workflow instead of the configured default.
    #[must_use]
    pub fn with_workflow(mut self, workflow: WorkflowId) -> Self {
        self.workflow = Some(workflow);
        self
    }
}

/// Project lifecycle service.
pub struct ProjectService<P, R, D, S, C>
where
    P: ProjectRepository,
    R: PermissionRepository,
    D: UserDirectory,
    S: ProjectSetup,
    C: Clock + Send + Sync,
{
    projects: Arc<P>,
    permissions: Arc<PermissionService<R, D>>,
    setup: Arc<S>,
    events: Arc<EventBus>,
    clock: Arc<C>,
    settings: ProjectSettings,
    default_vcs: Option<VcsAlias>,
    default_workflow: WorkflowId,
}

impl<P, R, D, S, C> ProjectService<P, R, D, S, C>
where
    P: ProjectRepository,
    R: PermissionRepository,
    D: UserDirectory,
    S: ProjectSetup,
    C: Clock + Send + Sync,
{
    /// Creates a project service using default settings.
    #[must_use]
    pub fn new(
        projects: Arc<P>,
        permissions: Arc<PermissionService<R, D>>,
        setup: Arc<S>,
        events: Arc<EventBus>,
        clock: Arc<C>,
    ) -> Self {
        let defaults = SetupSettings::default();
        Self {
            projects,
            permissions,
            setup,
            events,
            clock,
            settings: ProjectSettings::default(),
            default_vcs: Some(defaults.default_vcs),
            default_workflow: defaults.default_workflow_id(),
        }
    }

    /// Applies banned names and the feed size.
    #[must_use]
    pub fn with_project_settings(mut self, settings: ProjectSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Applies the default repository flavour and workflow.
    ///
    /// When repository creation is disabled no flavour is requested.
    #[must_use]
    pub fn with_setup_defaults(mut self, setup: &SetupSettings) -> Self {
        self.default_vcs = setup.create_repositories.then_some(setup.default_vcs);
        self.default_workflow = setup.default_workflow_id();
        self
    }

    /// Creates a project owned by the principal and runs setup.
    ///
    /// With inline setup the returned project is `Ready`; with background
    /// setup it is returned as stored, still `Pending`.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectServiceError::LoginRequired`] for anonymous or
    /// inactive principals, a domain error for empty or banned names,
    /// [`ProjectRepositoryError::DuplicateName`] when the author already
    /// owns a project with this name, and [`ProjectServiceError::Setup`]
    /// when inline setup fails.
    pub async fn create_project(
        &self,
        principal: &Principal,
        request: CreateProjectRequest,
    ) -> ProjectServiceResult<Project> {
        let author = active_user(principal)?;
        let name = ProjectName::new(request.name)?;
        name.ensure_allowed(&self.settings.banned_names)?;
        self.ensure_unique_name(author, &name).await?;

        let project = Project::new(
            NewProject {
                name,
                description: request.description,
                category: request.category,
                visibility: request.visibility,
                author,
            },
            &*self.clock,
        );
        self.projects.store(&project).await?;
        info!(
            project = %project.id(),
            author = %author,
            name = project.name().as_str(),
            "created project"
        );
        self.events
            .publish(&ProjectEvent::ProjectCreated {
                project: project.clone(),
                actor: author,
            })
            .await;

        let setup = SetupRequest {
            vcs: request.vcs.or(self.default_vcs),
            workflow: request
                .workflow
                .unwrap_or_else(|| self.default_workflow.clone()),
        };
        Ok(self.setup.run(project.id(), setup).await?.unwrap_or(project))
    }

    /// Forks `original` for the principal and runs setup on the fork.
    ///
    /// Anonymous and inactive principals are rejected before visibility is
    /// checked, so they get a fork error even for private projects.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectServiceError::Fork`] when the fork rules reject the
    /// principal, [`PermissionError::PermissionDenied`] when the principal
    /// cannot view the original, and [`ProjectServiceError::Setup`] when
    /// inline setup fails.
    pub async fn fork_project(
        &self,
        principal: &Principal,
        original_id: ProjectId,
        force_private: bool,
    ) -> ProjectServiceResult<Project> {
        ensure_fork_principal(principal)?;
        let original = self.load(original_id).await?;
        self.permissions
            .ensure_permission(principal, &original, ProjectPermission::ViewProject)
            .await?;
        let tree = self.projects.list_tree(original.root()).await?;
        let user = ensure_can_fork(&original, principal, &tree)?;

        let fork = Project::fork_of(&original, user.id(), force_private, &*self.clock);
        self.projects.store(&fork).await?;
        info!(
            project = %fork.id(),
            original = %original.id(),
            author = %user.id(),
            "forked project"
        );
        self.events
            .publish(&ProjectEvent::ProjectForked {
                original: original.clone(),
                fork: fork.clone(),
                actor: user.id(),
            })
            .await;

        let setup = SetupRequest {
            vcs: original
                .repository()
                .map(RepositoryRef::alias)
                .or(self.default_vcs),
            workflow: self.default_workflow.clone(),
        };
        Ok(self.setup.run(fork.id(), setup).await?.unwrap_or(fork))
    }

    /// Loads a project the principal may view.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectServiceError::ProjectNotFound`] or
    /// [`PermissionError::PermissionDenied`].
    pub async fn get(&self, principal: &Principal, id: ProjectId) -> ProjectServiceResult<Project> {
        let project = self.load(id).await?;
        self.permissions
            .ensure_permission(principal, &project, ProjectPermission::ViewProject)
            .await?;
        Ok(project)
    }

    /// Loads a project by its author and slug.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectServiceError::SlugNotFound`] or
    /// [`PermissionError::PermissionDenied`].
    pub async fn find_by_slug(
        &self,
        principal: &Principal,
        author: UserId,
        slug: &str,
    ) -> ProjectServiceResult<Project> {
        let parsed = ProjectSlug::parse(slug);
        let project = self
            .projects
            .find_by_author_and_slug(author, &parsed)
            .await?
            .ok_or(ProjectServiceError::SlugNotFound {
                author,
                slug: parsed,
            })?;
        self.permissions
            .ensure_permission(principal, &project, ProjectPermission::ViewProject)
            .await?;
        Ok(project)
    }

    /// Returns the most recently created public projects.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectServiceError::Repository`] when storage fails.
    pub async fn latest_public(&self, limit: usize) -> ProjectServiceResult<Vec<Project>> {
        Ok(self.projects.list_latest_public(limit).await?)
    }

    /// Renders the RSS feed of the latest public projects.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectServiceError::Feed`] when rendering fails.
    pub async fn feed(&self, channel: &FeedChannel) -> ProjectServiceResult<String> {
        let projects = self.latest_public(self.settings.feed_limit).await?;
        Ok(render_project_feed(channel, &projects)?)
    }

    /// Returns the stored configuration of a project.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError::PermissionDenied`] when the principal cannot
    /// view the project.
    pub async fn config(
        &self,
        principal: &Principal,
        project_id: ProjectId,
    ) -> ProjectServiceResult<Option<ProjectConfig>> {
        let project = self.get(principal, project_id).await?;
        Ok(self.projects.find_config(project.id()).await?)
    }

    /// Adds `user` as a member and grants the default member permissions.
    /// Returns `false` when the user already was a member.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError::PermissionDenied`] unless the principal
    /// holds [`ProjectPermission::AddMember`].
    pub async fn add_member(
        &self,
        principal: &Principal,
        project_id: ProjectId,
        user: UserId,
    ) -> ProjectServiceResult<bool> {
        let project = self
            .authorized(principal, project_id, ProjectPermission::AddMember)
            .await?;
        let actor = active_user(principal)?;
        let membership = Membership::new(project.id(), user, &*self.clock);
        if !self.projects.add_membership(&membership).await? {
            return Ok(false);
        }
        self.permissions.grant_member(project.id(), user).await?;
        info!(project = %project.id(), user = %user, "added project member");
        self.events
            .publish(&ProjectEvent::MemberAdded {
                project,
                user,
                actor,
            })
            .await;
        Ok(true)
    }

    /// Removes a member and revokes everything they were granted.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectServiceError::AuthorMembership`] for the author and
    /// [`PermissionError::PermissionDenied`] unless the principal holds
    /// [`ProjectPermission::DeleteMember`].
    pub async fn remove_member(
        &self,
        principal: &Principal,
        project_id: ProjectId,
        user: UserId,
    ) -> ProjectServiceResult<bool> {
        let project = self
            .authorized(principal, project_id, ProjectPermission::DeleteMember)
            .await?;
        if project.author() == user {
            return Err(ProjectServiceError::AuthorMembership(project.id()));
        }
        let removed = self.projects.remove_membership(project.id(), user).await?;
        self.permissions
            .revoke_all(project.id(), Grantee::User(user))
            .await?;
        Ok(removed)
    }

    /// Adds `group` as a team and grants it the default member permissions.
    /// Returns `false` when the group already was a team.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError::PermissionDenied`] unless the principal
    /// holds [`ProjectPermission::AddTeam`].
    pub async fn add_team(
        &self,
        principal: &Principal,
        project_id: ProjectId,
        group: GroupId,
    ) -> ProjectServiceResult<bool> {
        let project = self
            .authorized(principal, project_id, ProjectPermission::AddTeam)
            .await?;
        let actor = active_user(principal)?;
        let team = Team::new(project.id(), group, &*self.clock);
        if !self.projects.add_team(&team).await? {
            return Ok(false);
        }
        self.permissions.grant_team(project.id(), group).await?;
        info!(project = %project.id(), group = %group, "added project team");
        self.events
            .publish(&ProjectEvent::TeamAdded {
                project,
                group,
                actor,
            })
            .await;
        Ok(true)
    }

    /// Removes a team and revokes the group's grants.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError::PermissionDenied`] unless the principal
    /// holds [`ProjectPermission::DeleteTeam`].
    pub async fn remove_team(
        &self,
        principal: &Principal,
        project_id: ProjectId,
        group: GroupId,
    ) -> ProjectServiceResult<bool> {
        let project = self
            .authorized(principal, project_id, ProjectPermission::DeleteTeam)
            .await?;
        let removed = self.projects.remove_team(project.id(), group).await?;
        self.permissions
            .revoke_all(project.id(), Grantee::Group(group))
            .await?;
        Ok(removed)
    }

    /// Lists the members of a project.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError::PermissionDenied`] when the principal cannot
    /// view the project.
    pub async fn members(
        &self,
        principal: &Principal,
        project_id: ProjectId,
    ) -> ProjectServiceResult<Vec<Membership>> {
        let project = self.get(principal, project_id).await?;
        Ok(self.projects.list_memberships(project.id()).await?)
    }

    /// Lists the teams of a project.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError::PermissionDenied`] when the principal cannot
    /// view the project.
    pub async fn teams(
        &self,
        principal: &Principal,
        project_id: ProjectId,
    ) -> ProjectServiceResult<Vec<Team>> {
        let project = self.get(principal, project_id).await?;
        Ok(self.projects.list_teams(project.id()).await?)
    }

    async fn ensure_unique_name(
        &self,
        author: UserId,
        name: &ProjectName,
    ) -> ProjectServiceResult<()> {
        let existing = self
            .projects
            .find_by_author_and_slug(author, &name.slug())
            .await?;
        if existing.is_some() {
            return Err(ProjectRepositoryError::DuplicateName {
                author,
                name: name.clone(),
            }
            .into());
        }
        Ok(())
    }

    async fn load(&self, id: ProjectId) -> ProjectServiceResult<Project> {
        self.projects
            .find_by_id(id)
            .await?
            .ok_or(ProjectServiceError::ProjectNotFound(id))
    }

    async fn authorized(
        &self,
        principal: &Principal,
        id: ProjectId,
        permission: ProjectPermission,
    ) -> ProjectServiceResult<Project> {
        let project = self.load(id).await?;
        self.permissions
            .ensure_permission(principal, &project, permission)
            .await?;
        Ok(project)
    }
}

fn active_user(principal: &Principal) -> ProjectServiceResult<UserId> {
    principal
        .user()
        .filter(|user| user.is_active())
        .map(|user| user.id())
        .ok_or(ProjectServiceError::LoginRequired)
}
