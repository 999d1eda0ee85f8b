//! Project aggregate root.

use super::{
    ParseVisibilityError, ProjectDomainError, ProjectId, ProjectName, ProjectSlug, ProjectState,
};
use crate::accounts::UserId;
use crate::vcs::RepositoryRef;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Who may see a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Visible to everyone, including anonymous visitors.
    Public,
    /// Visible to principals holding the view permission.
    Private,
}

impl Visibility {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
        }
    }
}

impl TryFrom<&str> for Visibility {
    type Error = ParseVisibilityError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "public" => Ok(Self::Public),
            "private" => Ok(Self::Private),
            _ => Err(ParseVisibilityError(value.to_owned())),
        }
    }
}

/// Validated input for a new root project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProject {
    /// Display name.
    pub name: ProjectName,
    /// Free-text description.
    pub description: String,
    /// Optional category label.
    pub category: Option<String>,
    /// Visibility.
    pub visibility: Visibility,
    /// Owning user.
    pub author: UserId,
}

/// Project aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    id: ProjectId,
    name: ProjectName,
    slug: ProjectSlug,
    description: String,
    category: Option<String>,
    visibility: Visibility,
    author: UserId,
    parent: Option<ProjectId>,
    root: ProjectId,
    fork_url: Option<String>,
    repository: Option<RepositoryRef>,
    state: ProjectState,
    error_text: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedProjectData {
    /// Persisted identifier.
    pub id: ProjectId,
    /// Persisted name.
    pub name: ProjectName,
    /// Persisted description.
    pub description: String,
    /// Persisted category.
    pub category: Option<String>,
    /// Persisted visibility.
    pub visibility: Visibility,
    /// Persisted author.
    pub author: UserId,
    /// Persisted fork parent.
    pub parent: Option<ProjectId>,
    /// Persisted tree root.
    pub root: ProjectId,
    /// Persisted fork source URL.
    pub fork_url: Option<String>,
    /// Persisted repository reference.
    pub repository: Option<RepositoryRef>,
    /// Persisted setup state.
    pub state: ProjectState,
    /// Persisted setup failure description.
    pub error_text: Option<String>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Creates a pending root project.
    #[must_use]
    pub fn new(input: NewProject, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        let id = ProjectId::new();
        let slug = input.name.slug();
        Self {
            id,
            name: input.name,
            slug,
            description: input.description,
            category: input.category,
            visibility: input.visibility,
            author: input.author,
            parent: None,
            root: id,
            fork_url: None,
            repository: None,
            state: ProjectState::Pending,
            error_text: None,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Creates a pending fork of `parent` owned by `author`.
    ///
    /// The fork keeps the parent's name, description and category, shares
    /// its tree root and records the parent repository as its fork source.
    /// It is private when the parent is private or `force_private` is set.
    #[must_use]
    pub fn fork_of(
        parent: &Self,
        author: UserId,
        force_private: bool,
        clock: &impl Clock,
    ) -> Self {
        let timestamp = clock.utc();
        let visibility = if force_private {
            Visibility::Private
        } else {
            parent.visibility
        };
        Self {
            id: ProjectId::new(),
            name: parent.name.clone(),
            slug: parent.slug.clone(),
            description: parent.description.clone(),
            category: parent.category.clone(),
            visibility,
            author,
            parent: Some(parent.id),
            root: parent.root,
            fork_url: parent
                .repository
                .as_ref()
                .map(|repository| repository.location().to_owned()),
            repository: None,
            state: ProjectState::Pending,
            error_text: None,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a project from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedProjectData) -> Self {
        let slug = data.name.slug();
        Self {
            id: data.id,
            name: data.name,
            slug,
            description: data.description,
            category: data.category,
            visibility: data.visibility,
            author: data.author,
            parent: data.parent,
            root: data.root,
            fork_url: data.fork_url,
            repository: data.repository,
            state: data.state,
            error_text: data.error_text,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the project identifier.
    #[must_use]
    pub const fn id(&self) -> ProjectId {
        self.id
    }

    /// Returns the display name.
    #[must_use]
    pub const fn name(&self) -> &ProjectName {
        &self.name
    }

    /// Returns the URL slug.
    #[must_use]
    pub const fn slug(&self) -> &ProjectSlug {
        &self.slug
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the category, if any.
    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// Returns the visibility.
    #[must_use]
    pub const fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Returns `true` for public projects.
    #[must_use]
    pub const fn is_public(&self) -> bool {
        matches!(self.visibility, Visibility::Public)
    }

    /// Returns the owning user.
    #[must_use]
    pub const fn author(&self) -> UserId {
        self.author
    }

    /// Returns the fork parent, if any.
    #[must_use]
    pub const fn parent(&self) -> Option<ProjectId> {
        self.parent
    }

    /// Returns the root of the fork tree. Root projects return their own id.
    #[must_use]
    pub const fn root(&self) -> ProjectId {
        self.root
    }

    /// Returns `true` when the project is a fork.
    #[must_use]
    pub const fn is_fork(&self) -> bool {
        self.parent.is_some()
    }

    /// Returns the repository location the fork was cloned from.
    #[must_use]
    pub fn fork_url(&self) -> Option<&str> {
        self.fork_url.as_deref()
    }

    /// Returns the backing repository, if created.
    #[must_use]
    pub const fn repository(&self) -> Option<&RepositoryRef> {
        self.repository.as_ref()
    }

    /// Returns the setup state.
    #[must_use]
    pub const fn state(&self) -> ProjectState {
        self.state
    }

    /// Returns `true` once setup has finished.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.state == ProjectState::Ready
    }

    /// Returns the recorded setup failure, if any.
    #[must_use]
    pub fn error_text(&self) -> Option<&str> {
        self.error_text.as_deref()
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest modification timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Records that setup reached `state`.
    ///
    /// Checkpoints at or below the current state are accepted without
    /// change, so re-running setup never lowers the state.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectDomainError::InvalidStateTransition`] when the
    /// project is in `Error` or `state` is `Error` (use [`Self::fail`]).
    pub fn checkpoint(
        &mut self,
        state: ProjectState,
        clock: &impl Clock,
    ) -> Result<(), ProjectDomainError> {
        if self.state == ProjectState::Error || state == ProjectState::Error {
            return Err(ProjectDomainError::InvalidStateTransition {
                from: self.state,
                to: state,
            });
        }
        if self.state.can_advance_to(state) {
            self.state = state;
            self.touch(clock);
        }
        Ok(())
    }

    /// Moves the project to `Error` and records why.
    pub fn fail(&mut self, error_text: impl Into<String>, clock: &impl Clock) {
        self.state = ProjectState::Error;
        self.error_text = Some(error_text.into());
        self.touch(clock);
    }

    /// Returns a failed project to `Pending` so setup can be re-run.
    ///
    /// Projects outside `Error` are left untouched.
    pub fn reset_for_retry(&mut self, clock: &impl Clock) {
        if self.state == ProjectState::Error {
            self.state = ProjectState::Pending;
            self.error_text = None;
            self.touch(clock);
        }
    }

    /// Associates the backing repository.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectDomainError::RepositoryAlreadyExists`] when a
    /// repository is already set.
    pub fn attach_repository(
        &mut self,
        repository: RepositoryRef,
        clock: &impl Clock,
    ) -> Result<(), ProjectDomainError> {
        if self.repository.is_some() {
            return Err(ProjectDomainError::RepositoryAlreadyExists(self.id));
        }
        self.repository = Some(repository);
        self.touch(clock);
        Ok(())
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
