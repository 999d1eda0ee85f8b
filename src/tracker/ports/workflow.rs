//! Repository port for per-project workflow entities.

use crate::project::domain::ProjectId;
use crate::tracker::domain::{
    Component, Label, LabelKind, Milestone, MilestoneId, Status, StatusId, Transition,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for workflow repository operations.
pub type WorkflowRepositoryResult<T> = Result<T, WorkflowRepositoryError>;

/// Persistence contract for statuses, transitions, components, labels and
/// milestones.
///
/// Name lookups compare case-insensitively after trimming.
#[async_trait]
pub trait WorkflowRepository: Send + Sync {
    /// Stores a new status.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowRepositoryError::DuplicateName`] when the project
    /// already has a status with the name.
    async fn insert_status(&self, status: &Status) -> WorkflowRepositoryResult<()>;

    /// Finds a status by identifier.
    async fn find_status(&self, id: StatusId) -> WorkflowRepositoryResult<Option<Status>>;

    /// Finds a status by project and name.
    async fn find_status_by_name(
        &self,
        project: ProjectId,
        name: &str,
    ) -> WorkflowRepositoryResult<Option<Status>>;

    /// Returns the statuses of a project ordered by `order`, then name.
    async fn list_statuses(&self, project: ProjectId) -> WorkflowRepositoryResult<Vec<Status>>;

    /// Deletes a status together with its incoming and outgoing
    /// transitions. Returns `true` when a status was removed.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowRepositoryError::StatusInUse`] when stored tasks
    /// still reference the status.
    async fn delete_status(&self, id: StatusId) -> WorkflowRepositoryResult<bool>;

    /// Creates a transition unless it exists. Returns `true` when created.
    async fn insert_transition(&self, transition: Transition) -> WorkflowRepositoryResult<bool>;

    /// Deletes a transition. Returns `true` when one was removed.
    async fn delete_transition(&self, transition: Transition) -> WorkflowRepositoryResult<bool>;

    /// Returns `true` when the transition exists.
    async fn transition_exists(&self, transition: Transition) -> WorkflowRepositoryResult<bool>;

    /// Returns every transition whose source belongs to the project.
    async fn list_transitions(
        &self,
        project: ProjectId,
    ) -> WorkflowRepositoryResult<Vec<Transition>>;

    /// Stores a new component.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowRepositoryError::DuplicateName`] on a name clash.
    async fn insert_component(&self, component: &Component) -> WorkflowRepositoryResult<()>;

    /// Finds a component by project and name.
    async fn find_component_by_name(
        &self,
        project: ProjectId,
        name: &str,
    ) -> WorkflowRepositoryResult<Option<Component>>;

    /// Returns the components of a project ordered by name.
    async fn list_components(
        &self,
        project: ProjectId,
    ) -> WorkflowRepositoryResult<Vec<Component>>;

    /// Stores a new task type or priority.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowRepositoryError::DuplicateName`] on a name clash
    /// within the label kind.
    async fn insert_label(&self, label: &Label) -> WorkflowRepositoryResult<()>;

    /// Finds a label by project, kind and name.
    async fn find_label_by_name(
        &self,
        project: ProjectId,
        kind: LabelKind,
        name: &str,
    ) -> WorkflowRepositoryResult<Option<Label>>;

    /// Returns the labels of one kind ordered by `order`, then name.
    async fn list_labels(
        &self,
        project: ProjectId,
        kind: LabelKind,
    ) -> WorkflowRepositoryResult<Vec<Label>>;

    /// Stores a new milestone.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowRepositoryError::DuplicateName`] on a name clash.
    async fn insert_milestone(&self, milestone: &Milestone) -> WorkflowRepositoryResult<()>;

    /// Persists changes to a milestone.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowRepositoryError::MilestoneNotFound`] when missing.
    async fn update_milestone(&self, milestone: &Milestone) -> WorkflowRepositoryResult<()>;

    /// Finds a milestone by identifier.
    async fn find_milestone(&self, id: MilestoneId)
    -> WorkflowRepositoryResult<Option<Milestone>>;

    /// Returns the milestones of a project ordered by deadline.
    async fn list_milestones(
        &self,
        project: ProjectId,
    ) -> WorkflowRepositoryResult<Vec<Milestone>>;
}

/// Errors returned by workflow repository implementations.
#[derive(Debug, Clone, Error)]
pub enum WorkflowRepositoryError {
    /// An entity with the same name already exists in the project.
    #[error("{entity} '{name}' already exists in project {project}")]
    DuplicateName {
        /// Entity kind.
        entity: &'static str,
        /// Owning project.
        project: ProjectId,
        /// Conflicting name.
        name: String,
    },

    /// The milestone was not found.
    #[error("milestone not found: {0}")]
    MilestoneNotFound(MilestoneId),

    /// Tasks still reference the status.
    #[error("status {0} is still used by tasks")]
    StatusInUse(StatusId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl WorkflowRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
