//! Shared in-memory application wiring for integration tests.

use std::sync::Arc;

use mockable::DefaultClock;
use projector::accounts::{Principal, User, adapters::memory::InMemoryUserDirectory};
use projector::activity::adapters::memory::InMemoryActionRepository;
use projector::bootstrap::{ListenerDependencies, event_bus};
use projector::notification::adapters::InMemoryMailer;
use projector::permission::{PermissionService, adapters::memory::InMemoryPermissionRepository};
use projector::project::{
    adapters::memory::InMemoryProjectRepository,
    domain::Project,
    services::{CreateProjectRequest, ProjectService, ProjectSetupService, SetupDependencies},
};
use projector::tracker::{
    adapters::memory::{InMemoryTaskRepository, InMemoryWorkflowRepository},
    ports::WorkflowRepository,
    services::{TaskService, WorkflowService},
};
use projector::tracker::domain::StatusId;
use projector::vcs::adapters::InMemoryVcsBackend;
use projector::workflow::WorkflowRegistry;
use rstest::fixture;

/// Permission service over in-memory storage.
pub type AppPermissions = PermissionService<InMemoryPermissionRepository, InMemoryUserDirectory>;

/// Inline setup over in-memory storage.
pub type AppSetup = ProjectSetupService<
    InMemoryProjectRepository,
    InMemoryWorkflowRepository,
    InMemoryPermissionRepository,
    InMemoryUserDirectory,
    InMemoryVcsBackend,
    DefaultClock,
>;

/// Project lifecycle service over in-memory storage.
pub type AppProjects = ProjectService<
    InMemoryProjectRepository,
    InMemoryPermissionRepository,
    InMemoryUserDirectory,
    AppSetup,
    DefaultClock,
>;

/// Task service over in-memory storage.
pub type AppTasks = TaskService<
    InMemoryTaskRepository,
    InMemoryWorkflowRepository,
    InMemoryProjectRepository,
    AppPermissions,
    DefaultClock,
>;

/// Workflow service over in-memory storage.
pub type AppWorkflow = WorkflowService<
    InMemoryWorkflowRepository,
    InMemoryTaskRepository,
    InMemoryProjectRepository,
    AppPermissions,
    DefaultClock,
>;

/// Every service wired against shared in-memory adapters.
pub struct App {
    pub permissions: Arc<AppPermissions>,
    pub directory: Arc<InMemoryUserDirectory>,
    pub workflow: Arc<InMemoryWorkflowRepository>,
    pub actions: Arc<InMemoryActionRepository>,
    pub mailer: Arc<InMemoryMailer>,
    pub vcs: Arc<InMemoryVcsBackend>,
    pub projects: AppProjects,
    pub tasks: AppTasks,
    pub workflow_service: AppWorkflow,
}

impl App {
    /// Wires the application with the standard listeners.
    #[must_use]
    pub fn new() -> Self {
        let clock = Arc::new(DefaultClock);
        let directory = Arc::new(InMemoryUserDirectory::new());
        let project_repo = Arc::new(InMemoryProjectRepository::new());
        let workflow = Arc::new(InMemoryWorkflowRepository::new());
        let task_repo = Arc::new(InMemoryTaskRepository::new());
        let actions = Arc::new(InMemoryActionRepository::new());
        let mailer = Arc::new(InMemoryMailer::new());
        let vcs = Arc::new(InMemoryVcsBackend::new());
        let permissions = Arc::new(PermissionService::new(
            Arc::new(InMemoryPermissionRepository::new()),
            Arc::clone(&directory),
        ));
        let events = Arc::new(event_bus(ListenerDependencies {
            actions: Arc::clone(&actions),
            tasks: Arc::clone(&task_repo),
            projects: Arc::clone(&project_repo),
            workflow: Arc::clone(&workflow),
            directory: Arc::clone(&directory),
            mailer: Arc::clone(&mailer),
            clock: Arc::clone(&clock),
            from_address: "projector@example.org".to_owned(),
        }));
        let setup = ProjectSetupService::new(SetupDependencies {
            projects: Arc::clone(&project_repo),
            workflow: Arc::clone(&workflow),
            permissions: Arc::clone(&permissions),
            vcs: Arc::clone(&vcs),
            registry: Arc::new(WorkflowRegistry::new()),
            clock: Arc::clone(&clock),
        });

        Self {
            projects: ProjectService::new(
                Arc::clone(&project_repo),
                Arc::clone(&permissions),
                Arc::new(setup),
                Arc::clone(&events),
                Arc::clone(&clock),
            ),
            tasks: TaskService::new(
                Arc::clone(&task_repo),
                Arc::clone(&workflow),
                Arc::clone(&project_repo),
                Arc::clone(&permissions),
                events,
                Arc::clone(&clock),
            ),
            workflow_service: WorkflowService::new(
                Arc::clone(&workflow),
                task_repo,
                project_repo,
                Arc::clone(&permissions),
                clock,
            ),
            permissions,
            directory,
            workflow,
            actions,
            mailer,
            vcs,
        }
    }

    /// Registers an active user with an address.
    ///
    /// # Errors
    ///
    /// Returns an error when the directory rejects the user.
    pub fn user(&self, name: &str) -> Result<User, eyre::Report> {
        let user = User::new(name).with_email(format!("{name}@example.com"));
        self.directory.insert_user(user.clone())?;
        Ok(user)
    }

    /// Creates a ready public project owned by `author`.
    ///
    /// # Errors
    ///
    /// Returns an error when creation or setup fails.
    pub async fn project(&self, author: &User, name: &str) -> Result<Project, eyre::Report> {
        Ok(self
            .projects
            .create_project(
                &Principal::from(author.clone()),
                CreateProjectRequest::new(name),
            )
            .await?)
    }

    /// Looks up a status of `project` by name.
    ///
    /// # Errors
    ///
    /// Returns an error when the status does not exist.
    pub async fn status(&self, project: &Project, name: &str) -> Result<StatusId, eyre::Report> {
        self.workflow
            .find_status_by_name(project.id(), name)
            .await?
            .map(|status| status.id)
            .ok_or_else(|| eyre::eyre!("status {name} missing"))
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

/// Provides a freshly wired application.
#[fixture]
pub fn app() -> App {
    App::default()
}
