//! Repository port for tasks, revisions and watchers.

use crate::accounts::UserId;
use crate::project::domain::ProjectId;
use crate::tracker::domain::{StatusId, Task, TaskDraft, TaskNumber, TaskPk, TaskRevision};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Task persistence contract.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Numbers and stores a new task together with its revision-0 snapshot.
    ///
    /// The number is one more than the highest number in the project, or 1
    /// for the first task, and is assigned atomically with the insert.
    async fn create(&self, draft: TaskDraft) -> TaskRepositoryResult<Task>;

    /// Persists an edited task and its new revision snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not exist
    /// and [`TaskRepositoryError::RevisionConflict`] when the stored revision
    /// is not exactly one below `revision.revision`.
    async fn save_revision(&self, task: &Task, revision: &TaskRevision)
    -> TaskRepositoryResult<()>;

    /// Finds a task by primary key.
    async fn find_by_pk(&self, pk: TaskPk) -> TaskRepositoryResult<Option<Task>>;

    /// Finds a task by project and per-project number.
    async fn find_by_number(
        &self,
        project: ProjectId,
        number: TaskNumber,
    ) -> TaskRepositoryResult<Option<Task>>;

    /// Returns the tasks of a project ordered by number.
    async fn list_for_project(&self, project: ProjectId) -> TaskRepositoryResult<Vec<Task>>;

    /// Counts the tasks currently in `status`.
    async fn count_in_status(&self, status: StatusId) -> TaskRepositoryResult<usize>;

    /// Returns the revisions of a task ordered by revision number.
    async fn list_revisions(&self, pk: TaskPk) -> TaskRepositoryResult<Vec<TaskRevision>>;

    /// Adds a watcher unless present. Returns `true` when added.
    async fn add_watcher(&self, pk: TaskPk, user: UserId) -> TaskRepositoryResult<bool>;

    /// Removes a watcher. Returns `true` when removed.
    async fn remove_watcher(&self, pk: TaskPk, user: UserId) -> TaskRepositoryResult<bool>;

    /// Returns the explicit watchers of a task.
    async fn list_watchers(&self, pk: TaskPk) -> TaskRepositoryResult<Vec<UserId>>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskPk),

    /// The stored revision does not precede the one being saved.
    #[error("task {task} was modified concurrently: expected stored revision {expected}, found {found}")]
    RevisionConflict {
        /// Task primary key.
        task: TaskPk,
        /// Revision the caller edited.
        expected: u32,
        /// Revision currently stored.
        found: u32,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
