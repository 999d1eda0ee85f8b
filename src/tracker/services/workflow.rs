//! Service layer for statuses, transitions, components, labels and
//! milestones.

use crate::accounts::Principal;
use crate::permission::{Authorizer, PermissionError, ProjectPermission};
use crate::project::domain::{Project, ProjectId};
use crate::project::ports::{ProjectRepository, ProjectRepositoryError};
use crate::tracker::{
    domain::{
        Component, DestinationChange, Label, LabelKind, Milestone, MilestoneId, Status,
        StatusGraph, StatusId, TrackerDomainError, Transition,
    },
    ports::{TaskRepository, TaskRepositoryError, WorkflowRepository, WorkflowRepositoryError},
};
use crate::workflow::{StatusSpec, WorkflowDefinition};
use chrono::{Days, NaiveDate};
use mockable::Clock;
use std::collections::BTreeSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Service-level errors for workflow management.
#[derive(Debug, Error)]
pub enum WorkflowServiceError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TrackerDomainError),
    /// Workflow storage failed.
    #[error(transparent)]
    Repository(#[from] WorkflowRepositoryError),
    /// Project storage failed.
    #[error(transparent)]
    Projects(#[from] ProjectRepositoryError),
    /// Task storage failed.
    #[error(transparent)]
    Tasks(#[from] TaskRepositoryError),
    /// Authorization failed.
    #[error(transparent)]
    Permission(#[from] PermissionError),
    /// The project does not exist.
    #[error("project not found: {0}")]
    ProjectNotFound(ProjectId),
    /// The status does not exist in the project.
    #[error("status {status} not found in project {project}")]
    StatusNotFound {
        /// Project searched.
        project: ProjectId,
        /// Missing status.
        status: StatusId,
    },
    /// Tasks are still in the status.
    #[error("status {status} is used by {tasks} task(s)")]
    StatusInUse {
        /// Status that was to be deleted.
        status: StatusId,
        /// Tasks currently in the status.
        tasks: usize,
    },
    /// The milestone does not exist in the project.
    #[error("milestone {milestone} not found in project {project}")]
    MilestoneNotFound {
        /// Project searched.
        project: ProjectId,
        /// Missing milestone.
        milestone: MilestoneId,
    },
    /// The deadline cannot be represented.
    #[error("milestone deadline out of range")]
    DeadlineOutOfRange,
}

/// Result type for workflow service operations.
pub type WorkflowServiceResult<T> = Result<T, WorkflowServiceError>;

/// Workflow management service.
#[derive(Clone)]
pub struct WorkflowService<W, T, P, A, C>
where
    W: WorkflowRepository,
    T: TaskRepository,
    P: ProjectRepository,
    A: Authorizer,
    C: Clock + Send + Sync,
{
    workflow: Arc<W>,
    tasks: Arc<T>,
    projects: Arc<P>,
    authorizer: Arc<A>,
    clock: Arc<C>,
    default_milestone_delta_days: u32,
}

impl<W, T, P, A, C> WorkflowService<W, T, P, A, C>
where
    W: WorkflowRepository,
    T: TaskRepository,
    P: ProjectRepository,
    A: Authorizer,
    C: Clock + Send + Sync,
{
    /// Creates a workflow service.
    #[must_use]
    pub const fn new(
        workflow: Arc<W>,
        tasks: Arc<T>,
        projects: Arc<P>,
        authorizer: Arc<A>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            workflow,
            tasks,
            projects,
            authorizer,
            clock,
            default_milestone_delta_days: 60,
        }
    }

    /// Sets the milestone delta used when a project has no configuration.
    #[must_use]
    pub const fn with_default_milestone_delta(mut self, days: u32) -> Self {
        self.default_milestone_delta_days = days;
        self
    }

    /// Creates the workflow entries the project lacks, then completes the
    /// transition graph. See [`materialize_workflow`].
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowServiceError`] when validation or storage fails.
    pub async fn materialize(
        &self,
        project: ProjectId,
        definition: &WorkflowDefinition,
    ) -> WorkflowServiceResult<()> {
        materialize_workflow(&*self.workflow, project, definition).await
    }

    /// Inserts every ordered status pair, self loops included. Returns the
    /// number of transitions that did not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowServiceError::Repository`] when storage fails.
    pub async fn create_all_transitions(
        &self,
        project: ProjectId,
    ) -> WorkflowServiceResult<usize> {
        create_all_transitions(&*self.workflow, project).await
    }

    /// Loads the project's transition graph.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowServiceError::Repository`] when storage fails.
    pub async fn graph(&self, project: ProjectId) -> WorkflowServiceResult<StatusGraph> {
        Ok(StatusGraph::new(self.workflow.list_transitions(project).await?))
    }

    /// Returns `true` when a task may move from `from` to `to`.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowServiceError::Repository`] when storage fails.
    pub async fn can_change_to(
        &self,
        from: StatusId,
        to: StatusId,
    ) -> WorkflowServiceResult<bool> {
        Ok(self
            .workflow
            .transition_exists(Transition::new(from, to))
            .await?)
    }

    /// Replaces the destination set of `source` wholesale.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowServiceError::StatusNotFound`] when `source` or a
    /// destination belongs to another project, or a permission error.
    pub async fn set_destinations(
        &self,
        principal: &Principal,
        project: ProjectId,
        source: StatusId,
        destinations: BTreeSet<StatusId>,
    ) -> WorkflowServiceResult<DestinationChange> {
        self.authorized_project(principal, project, ProjectPermission::ChangeWorkflow)
            .await?;
        let known: BTreeSet<StatusId> = self
            .workflow
            .list_statuses(project)
            .await?
            .into_iter()
            .map(|status| status.id)
            .collect();
        if let Some(missing) = std::iter::once(source)
            .chain(destinations.iter().copied())
            .find(|id| !known.contains(id))
        {
            return Err(WorkflowServiceError::StatusNotFound {
                project,
                status: missing,
            });
        }

        let graph = self.graph(project).await?;
        let change = graph.plan_destinations(source, &destinations);
        for transition in &change.removed {
            self.workflow.delete_transition(*transition).await?;
        }
        for transition in &change.added {
            self.workflow.insert_transition(*transition).await?;
        }
        debug!(
            project = %project,
            status = %source,
            removed = change.removed.len(),
            added = change.added.len(),
            "replaced status destinations"
        );
        Ok(change)
    }

    /// Adds a status to the project.
    ///
    /// # Errors
    ///
    /// Returns a duplicate-name, validation or permission error.
    pub async fn create_status(
        &self,
        principal: &Principal,
        project: ProjectId,
        spec: &StatusSpec,
    ) -> WorkflowServiceResult<Status> {
        self.authorized_project(principal, project, ProjectPermission::ChangeWorkflow)
            .await?;
        let status = Status::from_spec(project, spec)?;
        self.workflow.insert_status(&status).await?;
        Ok(status)
    }

    /// Deletes a status together with its incoming and outgoing transitions.
    ///
    /// A status that tasks are still in is kept.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowServiceError::StatusNotFound`],
    /// [`WorkflowServiceError::StatusInUse`] or a permission error.
    pub async fn delete_status(
        &self,
        principal: &Principal,
        project: ProjectId,
        status: StatusId,
    ) -> WorkflowServiceResult<()> {
        self.authorized_project(principal, project, ProjectPermission::ChangeWorkflow)
            .await?;
        let belongs = self
            .workflow
            .find_status(status)
            .await?
            .is_some_and(|found| found.project_id == project);
        if !belongs {
            return Err(WorkflowServiceError::StatusNotFound { project, status });
        }
        self.ensure_unused(status).await?;
        match self.workflow.delete_status(status).await {
            Ok(true) => {}
            Ok(false) => return Err(WorkflowServiceError::StatusNotFound { project, status }),
            Err(WorkflowRepositoryError::StatusInUse(_)) => {
                // A task moved into the status after the check above.
                self.ensure_unused(status).await?;
                return Err(WorkflowServiceError::StatusInUse { status, tasks: 1 });
            }
            Err(err) => return Err(err.into()),
        }
        info!(project = %project, status = %status, "deleted status");
        Ok(())
    }

    /// Adds a component to the project.
    ///
    /// # Errors
    ///
    /// Returns a duplicate-name, validation or permission error.
    pub async fn create_component(
        &self,
        principal: &Principal,
        project: ProjectId,
        name: &str,
        description: &str,
    ) -> WorkflowServiceResult<Component> {
        self.authorized_project(principal, project, ProjectPermission::ChangeWorkflow)
            .await?;
        let component = Component::new(project, name)?.with_description(description);
        self.workflow.insert_component(&component).await?;
        Ok(component)
    }

    /// Adds a task type or priority to the project.
    ///
    /// # Errors
    ///
    /// Returns a duplicate-name, validation or permission error.
    pub async fn create_label(
        &self,
        principal: &Principal,
        project: ProjectId,
        kind: LabelKind,
        name: &str,
        order: i32,
    ) -> WorkflowServiceResult<Label> {
        self.authorized_project(principal, project, ProjectPermission::ChangeWorkflow)
            .await?;
        let label = Label::new(project, kind, name, order)?;
        self.workflow.insert_label(&label).await?;
        Ok(label)
    }

    /// Adds a milestone. Without an explicit deadline the milestone is due
    /// the configured number of days from today.
    ///
    /// # Errors
    ///
    /// Returns a duplicate-name, validation or permission error.
    pub async fn create_milestone(
        &self,
        principal: &Principal,
        project: ProjectId,
        name: &str,
        deadline: Option<NaiveDate>,
    ) -> WorkflowServiceResult<Milestone> {
        self.authorized_project(principal, project, ProjectPermission::ChangeWorkflow)
            .await?;
        let deadline = match deadline {
            Some(date) => date,
            None => self.default_deadline(project).await?,
        };
        let milestone = Milestone::new(project, name, deadline, &*self.clock)?;
        self.workflow.insert_milestone(&milestone).await?;
        Ok(milestone)
    }

    /// Marks a milestone as completed today.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowServiceError::MilestoneNotFound`],
    /// [`TrackerDomainError::MilestoneAlreadyCompleted`] or a permission
    /// error.
    pub async fn complete_milestone(
        &self,
        principal: &Principal,
        project: ProjectId,
        milestone: MilestoneId,
    ) -> WorkflowServiceResult<Milestone> {
        self.authorized_project(principal, project, ProjectPermission::ChangeWorkflow)
            .await?;
        let mut found = self
            .workflow
            .find_milestone(milestone)
            .await?
            .filter(|candidate| candidate.project_id == project)
            .ok_or(WorkflowServiceError::MilestoneNotFound { project, milestone })?;
        found.complete(self.clock.utc().date_naive())?;
        self.workflow.update_milestone(&found).await?;
        Ok(found)
    }

    async fn ensure_unused(&self, status: StatusId) -> WorkflowServiceResult<()> {
        match self.tasks.count_in_status(status).await? {
            0 => Ok(()),
            tasks => Err(WorkflowServiceError::StatusInUse { status, tasks }),
        }
    }

    async fn default_deadline(&self, project: ProjectId) -> WorkflowServiceResult<NaiveDate> {
        let delta = self
            .projects
            .find_config(project)
            .await?
            .map_or(self.default_milestone_delta_days, |config| {
                config.milestone_deadline_delta_days
            });
        self.clock
            .utc()
            .date_naive()
            .checked_add_days(Days::new(u64::from(delta)))
            .ok_or(WorkflowServiceError::DeadlineOutOfRange)
    }

    async fn authorized_project(
        &self,
        principal: &Principal,
        project: ProjectId,
        permission: ProjectPermission,
    ) -> WorkflowServiceResult<Project> {
        let found = self
            .projects
            .find_by_id(project)
            .await?
            .ok_or(WorkflowServiceError::ProjectNotFound(project))?;
        self.authorizer
            .ensure_permission(principal, &found, permission)
            .await?;
        Ok(found)
    }
}

/// Creates the components, labels and statuses of `definition` that the
/// project lacks, then completes the transition graph.
///
/// Existing entries are matched by name and left untouched, so running this
/// twice is harmless.
///
/// # Errors
///
/// Returns [`WorkflowServiceError`] when validation or storage fails.
pub async fn materialize_workflow<W>(
    workflow: &W,
    project: ProjectId,
    definition: &WorkflowDefinition,
) -> WorkflowServiceResult<()>
where
    W: WorkflowRepository + ?Sized,
{
    for name in definition.components() {
        if workflow
            .find_component_by_name(project, name)
            .await?
            .is_none()
        {
            workflow
                .insert_component(&Component::new(project, name)?)
                .await?;
        }
    }
    for (kind, labels) in [
        (LabelKind::TaskType, definition.task_types()),
        (LabelKind::Priority, definition.priorities()),
    ] {
        for ranked in labels {
            if workflow
                .find_label_by_name(project, kind, &ranked.name)
                .await?
                .is_none()
            {
                let label = Label::new(project, kind, &ranked.name, ranked.order)?;
                workflow.insert_label(&label).await?;
            }
        }
    }
    for spec in definition.statuses() {
        if workflow
            .find_status_by_name(project, &spec.name)
            .await?
            .is_none()
        {
            workflow
                .insert_status(&Status::from_spec(project, spec)?)
                .await?;
        }
    }
    let created = create_all_transitions(workflow, project).await?;
    info!(
        project = %project,
        workflow = definition.id().as_str(),
        transitions = created,
        "materialized workflow"
    );
    Ok(())
}

/// Inserts every ordered pair of the project's statuses, self loops
/// included, and returns how many were new.
///
/// # Errors
///
/// Returns [`WorkflowServiceError::Repository`] when storage fails.
pub async fn create_all_transitions<W>(
    workflow: &W,
    project: ProjectId,
) -> WorkflowServiceResult<usize>
where
    W: WorkflowRepository + ?Sized,
{
    let statuses = workflow.list_statuses(project).await?;
    let mut created = 0;
    for transition in StatusGraph::complete(&statuses) {
        if workflow.insert_transition(transition).await? {
            created += 1;
        }
    }
    Ok(created)
}
