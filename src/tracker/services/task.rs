//! Service layer for task creation, editing and history.

use crate::accounts::{Principal, UserId};
use crate::activity::{EventBus, ProjectEvent};
use crate::permission::{Authorizer, PermissionError, ProjectPermission};
use crate::project::domain::{Project, ProjectId, ProjectState};
use crate::project::ports::{ProjectRepository, ProjectRepositoryError};
use crate::tracker::{
    domain::{
        Changeset, ComponentId, LabelId, LabelKind, MilestoneId, StatusId, Task, TaskDraft,
        TaskFields, TaskNumber, TaskPk, TaskReport, TaskRevision, TrackerDomainError, Transition,
    },
    ports::{TaskRepository, TaskRepositoryError, WorkflowRepository, WorkflowRepositoryError},
};
use chrono::NaiveDate;
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

/// Request payload for opening a task.
///
/// Unset status, component, priority and type fall back to the project's
/// first initial status and first entry of each list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    project: ProjectId,
    summary: String,
    description: String,
    status: Option<StatusId>,
    component: Option<ComponentId>,
    priority: Option<LabelId>,
    task_type: Option<LabelId>,
    deadline: Option<NaiveDate>,
    milestone: Option<MilestoneId>,
    owner: Option<UserId>,
}

impl CreateTaskRequest {
    /// Creates a request with the required fields.
    #[must_use]
    pub fn new(project: ProjectId, summary: impl Into<String>) -> Self {
        Self {
            project,
            summary: summary.into(),
            description: String::new(),
            status: None,
            component: None,
            priority: None,
            task_type: None,
            deadline: None,
            milestone: None,
            owner: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the starting status.
    #[must_use]
    pub const fn with_status(mut self, status: StatusId) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the component.
    #[must_use]
    pub const fn with_component(mut self, component: ComponentId) -> Self {
        self.component = Some(component);
        self
    }

    /// Sets the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: LabelId) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Sets the task type.
    #[must_use]
    pub const fn with_task_type(mut self, task_type: LabelId) -> Self {
        self.task_type = Some(task_type);
        self
    }

    /// Sets the deadline.
    #[must_use]
    pub const fn with_deadline(mut self, deadline: NaiveDate) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Sets the milestone.
    #[must_use]
    pub const fn with_milestone(mut self, milestone: MilestoneId) -> Self {
        self.milestone = Some(milestone);
        self
    }

    /// Sets the owner.
    #[must_use]
    pub const fn with_owner(mut self, owner: UserId) -> Self {
        self.owner = Some(owner);
        self
    }
}

/// Outcome of a successful edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskEdit {
    /// Task after the edit.
    pub task: Task,
    /// Snapshot stored for the edit.
    pub revision: TaskRevision,
    /// Fields changed by the edit.
    pub changes: Changeset,
}

/// Service-level errors for task operations.
#[derive(Debug, Error)]
pub enum TaskServiceError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TrackerDomainError),
    /// Task storage failed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),
    /// Workflow storage failed.
    #[error(transparent)]
    Workflow(#[from] WorkflowRepositoryError),
    /// Project storage failed.
    #[error(transparent)]
    Projects(#[from] ProjectRepositoryError),
    /// Authorization failed.
    #[error(transparent)]
    Permission(#[from] PermissionError),
    /// An anonymous or inactive principal tried to write.
    #[error("an active user is required")]
    LoginRequired,
    /// The project does not exist.
    #[error("project not found: {0}")]
    ProjectNotFound(ProjectId),
    /// The project has not finished setup.
    #[error("project {project} is not ready (state {state})")]
    ProjectNotReady {
        /// Project in question.
        project: ProjectId,
        /// Its current state.
        state: ProjectState,
    },
    /// No task with that number exists in the project.
    #[error("task {number} not found in project {project}")]
    TaskNotFound {
        /// Project searched.
        project: ProjectId,
        /// Missing number.
        number: TaskNumber,
    },
    /// The task has no stored row.
    #[error("task not found: {0}")]
    UnknownTask(TaskPk),
    /// The revision does not exist.
    #[error("task {task} has no revision {revision}")]
    RevisionNotFound {
        /// Task searched.
        task: TaskPk,
        /// Missing revision.
        revision: u32,
    },
    /// A referenced entity belongs to another project or does not exist.
    #[error("{entity} {id} does not belong to project {project}")]
    ForeignReference {
        /// Entity kind.
        entity: &'static str,
        /// Referenced identifier.
        id: Uuid,
        /// Project of the task.
        project: ProjectId,
    },
}

/// Result type for task service operations.
pub type TaskServiceResult<T> = Result<T, TaskServiceError>;

/// Task orchestration service.
#[derive(Clone)]
pub struct TaskService<T, W, P, A, C>
where
    T: TaskRepository,
    W: WorkflowRepository,
    P: ProjectRepository,
    A: Authorizer,
    C: Clock + Send + Sync,
{
    tasks: Arc<T>,
    workflow: Arc<W>,
    projects: Arc<P>,
    authorizer: Arc<A>,
    events: Arc<EventBus>,
    clock: Arc<C>,
}

impl<T, W, P, A, C> TaskService<T, W, P, A, C>
where
    T: TaskRepository,
    W: WorkflowRepository,
    P: ProjectRepository,
    A: Authorizer,
    C: Clock + Send + Sync,
{
    /// Creates a task service.
    #[must_use]
    pub const fn new(
        tasks: Arc<T>,
        workflow: Arc<W>,
        projects: Arc<P>,
        authorizer: Arc<A>,
        events: Arc<EventBus>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            tasks,
            workflow,
            projects,
            authorizer,
            events,
            clock,
        }
    }

    /// Opens a task with the next number in the project.
    ///
    /// The author starts watching the new task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::ProjectNotReady`] before setup completes,
    /// a permission error, or validation errors for the fields.
    pub async fn create_task(
        &self,
        principal: &Principal,
        request: CreateTaskRequest,
    ) -> TaskServiceResult<Task> {
        let author = active_user(principal)?;
        let project = self
            .authorized_project(principal, request.project, ProjectPermission::AddTask)
            .await?;
        if !project.is_ready() {
            return Err(TaskServiceError::ProjectNotReady {
                project: project.id(),
                state: project.state(),
            });
        }

        let fields = self.resolve_fields(&project, request).await?;
        let draft = TaskDraft::new(project.id(), fields, author, &*self.clock)?;
        let task = self.tasks.create(draft).await?;
        self.tasks.add_watcher(task.pk(), author).await?;
        info!(
            project = %project.id(),
            task = %task.number(),
            author = %author,
            "created task"
        );

        self.events
            .publish(&ProjectEvent::TaskCreated {
                project,
                task: task.clone(),
                actor: author,
            })
            .await;
        Ok(task)
    }

    /// Applies an edit as the next revision.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerDomainError::NoChangesMade`] for an empty edit
    /// without comment, [`TrackerDomainError::IllegalStatusChange`] when no
    /// transition allows the status change, and
    /// [`TaskRepositoryError::RevisionConflict`] when the task was edited
    /// concurrently.
    pub async fn edit_task(
        &self,
        principal: &Principal,
        project: ProjectId,
        number: TaskNumber,
        proposed: TaskFields,
        comment: Option<String>,
    ) -> TaskServiceResult<TaskEdit> {
        let editor = active_user(principal)?;
        let project = self
            .authorized_project(principal, project, ProjectPermission::ChangeTask)
            .await?;
        let mut task = self.task_by_number(project.id(), number).await?;

        let (fields, changes) = task.clean(proposed, comment.as_deref())?;
        self.ensure_references(project.id(), &fields).await?;
        if Task::changes_status(&changes) {
            let transition = Transition::new(task.fields().status, fields.status);
            if !self.workflow.transition_exists(transition).await? {
                return Err(TrackerDomainError::IllegalStatusChange {
                    from: transition.source,
                    to: transition.destination,
                }
                .into());
            }
        }

        let revision = task.apply_edit(fields, comment, editor, &*self.clock);
        self.tasks.save_revision(&task, &revision).await?;
        info!(
            project = %project.id(),
            task = %task.number(),
            revision = revision.revision,
            changed = changes.len(),
            "edited task"
        );

        self.events
            .publish(&ProjectEvent::TaskChanged {
                project,
                task: task.clone(),
                revision: revision.clone(),
                changes: changes.clone(),
                actor: editor,
            })
            .await;
        Ok(TaskEdit {
            task,
            revision,
            changes,
        })
    }

    /// Compares `task` against the row currently stored for it.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::UnknownTask`] when no row is stored.
    pub async fn diff_with_persisted(&self, task: &Task) -> TaskServiceResult<Changeset> {
        let stored = self
            .tasks
            .find_by_pk(task.pk())
            .await?
            .ok_or(TaskServiceError::UnknownTask(task.pk()))?;
        Ok(task.diff(&stored))
    }

    /// Looks up a task by number.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::TaskNotFound`] or a permission error.
    pub async fn find_task(
        &self,
        principal: &Principal,
        project: ProjectId,
        number: TaskNumber,
    ) -> TaskServiceResult<Task> {
        let project = self
            .authorized_project(principal, project, ProjectPermission::ViewTasks)
            .await?;
        self.task_by_number(project.id(), number).await
    }

    /// Lists a project's tasks in number order.
    ///
    /// # Errors
    ///
    /// Returns a permission or storage error.
    pub async fn list_tasks(
        &self,
        principal: &Principal,
        project: ProjectId,
    ) -> TaskServiceResult<Vec<Task>> {
        let project = self
            .authorized_project(principal, project, ProjectPermission::ViewTasks)
            .await?;
        Ok(self.tasks.list_for_project(project.id()).await?)
    }

    /// Returns a task's revision history, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::TaskNotFound`] or a permission error.
    pub async fn revisions(
        &self,
        principal: &Principal,
        project: ProjectId,
        number: TaskNumber,
    ) -> TaskServiceResult<Vec<TaskRevision>> {
        let task = self.find_task(principal, project, number).await?;
        Ok(self.tasks.list_revisions(task.pk()).await?)
    }

    /// Compares two stored revisions of a task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::RevisionNotFound`] when either revision
    /// is missing.
    pub async fn diff_revisions(
        &self,
        principal: &Principal,
        project: ProjectId,
        number: TaskNumber,
        old: u32,
        new: u32,
    ) -> TaskServiceResult<Changeset> {
        let task = self.find_task(principal, project, number).await?;
        let history = self.tasks.list_revisions(task.pk()).await?;
        let pick = |revision: u32| {
            history
                .iter()
                .find(|candidate| candidate.revision == revision)
                .ok_or(TaskServiceError::RevisionNotFound {
                    task: task.pk(),
                    revision,
                })
        };
        Ok(pick(new)?.diff(pick(old)?))
    }

    /// Adds the principal to the task's watchers.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::LoginRequired`] for anonymous principals.
    pub async fn watch(
        &self,
        principal: &Principal,
        project: ProjectId,
        number: TaskNumber,
    ) -> TaskServiceResult<bool> {
        let user = active_user(principal)?;
        let task = self.find_task(principal, project, number).await?;
        let added = self.tasks.add_watcher(task.pk(), user).await?;
        debug!(task = %task.pk(), user = %user, added, "watch task");
        Ok(added)
    }

    /// Removes the principal from the task's watchers.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::LoginRequired`] for anonymous principals.
    pub async fn unwatch(
        &self,
        principal: &Principal,
        project: ProjectId,
        number: TaskNumber,
    ) -> TaskServiceResult<bool> {
        let user = active_user(principal)?;
        let task = self.find_task(principal, project, number).await?;
        Ok(self.tasks.remove_watcher(task.pk(), user).await?)
    }

    /// Lists explicit watchers of a task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::TaskNotFound`] or a permission error.
    pub async fn watchers(
        &self,
        principal: &Principal,
        project: ProjectId,
        number: TaskNumber,
    ) -> TaskServiceResult<Vec<UserId>> {
        let task = self.find_task(principal, project, number).await?;
        Ok(self.tasks.list_watchers(task.pk()).await?)
    }

    /// Counts the project's tasks per status, priority, type and component.
    ///
    /// # Errors
    ///
    /// Returns a permission or storage error.
    pub async fn report(
        &self,
        principal: &Principal,
        project: ProjectId,
    ) -> TaskServiceResult<TaskReport> {
        let project = self
            .authorized_project(principal, project, ProjectPermission::ViewTasks)
            .await?;
        let tasks = self.tasks.list_for_project(project.id()).await?;
        let statuses = self.workflow.list_statuses(project.id()).await?;
        Ok(TaskReport::build(&tasks, &statuses))
    }

    async fn resolve_fields(
        &self,
        project: &Project,
        request: CreateTaskRequest,
    ) -> TaskServiceResult<TaskFields> {
        let id = project.id();
        let status = match request.status {
            Some(status) => status,
            None => self
                .workflow
                .list_statuses(id)
                .await?
                .into_iter()
                .find(|status| status.is_initial)
                .map(|status| status.id)
                .ok_or(TrackerDomainError::NoInitialStatus)?,
        };
        let component = match request.component {
            Some(component) => component,
            None => self
                .workflow
                .list_components(id)
                .await?
                .first()
                .map(|component| component.id)
                .ok_or(TrackerDomainError::MissingComponent)?,
        };
        let priority = match request.priority {
            Some(priority) => priority,
            None => self.first_label(id, LabelKind::Priority).await?,
        };
        let task_type = match request.task_type {
            Some(task_type) => task_type,
            None => self.first_label(id, LabelKind::TaskType).await?,
        };

        let fields = TaskFields {
            summary: request.summary,
            description: request.description,
            status,
            component,
            deadline: request.deadline,
            milestone: request.milestone,
            owner: request.owner,
            priority,
            task_type,
        };
        self.ensure_references(id, &fields).await?;
        Ok(fields)
    }

    async fn first_label(&self, project: ProjectId, kind: LabelKind) -> TaskServiceResult<LabelId> {
        self.workflow
            .list_labels(project, kind)
            .await?
            .first()
            .map(|label| label.id)
            .ok_or_else(|| TrackerDomainError::MissingLabel(kind).into())
    }

    async fn ensure_references(
        &self,
        project: ProjectId,
        fields: &TaskFields,
    ) -> TaskServiceResult<()> {
        let foreign = |entity: &'static str, id: Uuid| TaskServiceError::ForeignReference {
            entity,
            id,
            project,
        };

        let statuses = self.workflow.list_statuses(project).await?;
        if !statuses.iter().any(|status| status.id == fields.status) {
            return Err(foreign("status", fields.status.into_inner()));
        }
        let components = self.workflow.list_components(project).await?;
        if !components.iter().any(|component| component.id == fields.component) {
            return Err(foreign("component", fields.component.into_inner()));
        }
        for (kind, id) in [
            (LabelKind::Priority, fields.priority),
            (LabelKind::TaskType, fields.task_type),
        ] {
            let labels = self.workflow.list_labels(project, kind).await?;
            if !labels.iter().any(|label| label.id == id) {
                return Err(foreign(kind.as_str(), id.into_inner()));
            }
        }
        if let Some(milestone) = fields.milestone {
            let belongs = self
                .workflow
                .find_milestone(milestone)
                .await?
                .is_some_and(|found| found.project_id == project);
            if !belongs {
                return Err(foreign("milestone", milestone.into_inner()));
            }
        }
        Ok(())
    }

    async fn task_by_number(
        &self,
        project: ProjectId,
        number: TaskNumber,
    ) -> TaskServiceResult<Task> {
        self.tasks
            .find_by_number(project, number)
            .await?
            .ok_or(TaskServiceError::TaskNotFound { project, number })
    }

    async fn authorized_project(
        &self,
        principal: &Principal,
        project: ProjectId,
        permission: ProjectPermission,
    ) -> TaskServiceResult<Project> {
        let found = self
            .projects
            .find_by_id(project)
            .await?
            .ok_or(TaskServiceError::ProjectNotFound(project))?;
        self.authorizer
            .ensure_permission(principal, &found, permission)
            .await?;
        Ok(found)
    }
}

fn active_user(principal: &Principal) -> TaskServiceResult<UserId> {
    principal
        .user()
        .filter(|user| user.is_active())
        .map(|user| user.id())
        .ok_or(TaskServiceError::LoginRequired)
}
