//! In-memory wiring shared by the project service tests.

use std::sync::Arc;

use async_trait::async_trait;
use mockall::mock;
use mockable::DefaultClock;

use crate::accounts::{User, adapters::memory::InMemoryUserDirectory};
use crate::activity::{ActivityRecorder, EventBus, adapters::memory::InMemoryActionRepository};
use crate::permission::{PermissionService, adapters::memory::InMemoryPermissionRepository};
use crate::project::{
    adapters::memory::InMemoryProjectRepository,
    domain::{NewProject, Project, ProjectId, ProjectName, Visibility},
    ports::ProjectRepository,
    services::{ProjectService, ProjectSetupService, SetupDependencies},
};
use crate::tracker::adapters::memory::InMemoryWorkflowRepository;
use crate::vcs::{
    RepositoryRef, VcsAlias, VcsBackend, VcsResult, adapters::memory::InMemoryVcsBackend,
};
use crate::workflow::WorkflowRegistry;

mock! {
    pub Vcs {}

    #[async_trait]
    impl VcsBackend for Vcs {
        async fn create_repository(
            &self,
            project: ProjectId,
            alias: VcsAlias,
        ) -> VcsResult<RepositoryRef>;

        async fn fork_repository(
            &self,
            source: &RepositoryRef,
            project: ProjectId,
        ) -> VcsResult<RepositoryRef>;
    }
}

pub type TestPermissions = PermissionService<InMemoryPermissionRepository, InMemoryUserDirectory>;

pub type TestSetup<V> = ProjectSetupService<
    InMemoryProjectRepository,
    InMemoryWorkflowRepository,
    InMemoryPermissionRepository,
    InMemoryUserDirectory,
    V,
    DefaultClock,
>;

pub type TestProjectService = ProjectService<
    InMemoryProjectRepository,
    InMemoryPermissionRepository,
    InMemoryUserDirectory,
    TestSetup<InMemoryVcsBackend>,
    DefaultClock,
>;

pub struct World {
    pub projects: Arc<InMemoryProjectRepository>,
    pub workflow: Arc<InMemoryWorkflowRepository>,
    pub directory: Arc<InMemoryUserDirectory>,
    pub permissions: Arc<TestPermissions>,
    pub actions: Arc<InMemoryActionRepository>,
    pub vcs: Arc<InMemoryVcsBackend>,
}

impl World {
    pub fn new() -> Self {
        let directory = Arc::new(InMemoryUserDirectory::new());
        Self {
            projects: Arc::new(InMemoryProjectRepository::new()),
            workflow: Arc::new(InMemoryWorkflowRepository::new()),
            permissions: Arc::new(PermissionService::new(
                Arc::new(InMemoryPermissionRepository::new()),
                Arc::clone(&directory),
            )),
            directory,
            actions: Arc::new(InMemoryActionRepository::new()),
            vcs: Arc::new(InMemoryVcsBackend::new()),
        }
    }

    pub fn user(&self, name: &str) -> User {
        let user = User::new(name).with_email(format!("{name}@example.com"));
        self.directory
            .insert_user(user.clone())
            .expect("directory insert should succeed");
        user
    }

    pub fn setup_with<V: VcsBackend>(&self, vcs: Arc<V>) -> TestSetup<V> {
        ProjectSetupService::new(SetupDependencies {
            projects: Arc::clone(&self.projects),
            workflow: Arc::clone(&self.workflow),
            permissions: Arc::clone(&self.permissions),
            vcs,
            registry: Arc::new(WorkflowRegistry::new()),
            clock: Arc::new(DefaultClock),
        })
    }

    pub fn setup(&self) -> TestSetup<InMemoryVcsBackend> {
        self.setup_with(Arc::clone(&self.vcs))
    }

    pub fn event_bus(&self) -> EventBus {
        let mut bus = EventBus::new();
        bus.register(Arc::new(ActivityRecorder::new(
            Arc::clone(&self.actions),
            Arc::new(DefaultClock),
        )));
        bus
    }

    pub fn project_service(&self) -> TestProjectService {
        ProjectService::new(
            Arc::clone(&self.projects),
            Arc::clone(&self.permissions),
            Arc::new(self.setup()),
            Arc::new(self.event_bus()),
            Arc::new(DefaultClock),
        )
    }

    pub async fn pending_project(&self, author: &User, name: &str) -> Project {
        let project = Project::new(
            NewProject {
                name: ProjectName::new(name).expect("valid name"),
                description: String::new(),
                category: None,
                visibility: Visibility::Public,
                author: author.id(),
            },
            &DefaultClock,
        );
        self.projects
            .store(&project)
            .await
            .expect("store should succeed");
        project
    }

    pub async fn reload(&self, id: ProjectId) -> Project {
        self.projects
            .find_by_id(id)
            .await
            .expect("lookup should succeed")
            .expect("project should exist")
    }
}
