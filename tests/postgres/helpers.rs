//! Database setup and seed data for the adapter integration tests.

pub use super::cluster::{BoxError, PostgresCluster, boxed, postgres_cluster};
use chrono::NaiveDate;
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use mockable::DefaultClock;
use projector::accounts::UserId;
use projector::persistence::{PgPool, connect};
use projector::project::{
    adapters::postgres::PostgresProjectRepository,
    domain::{NewProject, Project, ProjectId, ProjectName, Visibility},
    ports::ProjectRepository,
};
use projector::tracker::{
    adapters::postgres::{PostgresTaskRepository, PostgresWorkflowRepository},
    domain::{
        Component, Label, LabelKind, Status, StatusGraph, Task, TaskDraft, TaskFields,
    },
    ports::{TaskRepository, WorkflowRepository},
};
use tokio::runtime::Runtime;
use uuid::Uuid;

/// Schema applied to the template database.
pub const CREATE_TABLES_SQL: &str =
    include_str!("../../migrations/2026-10-19-000000_create_projector_tables/up.sql");

/// Template database holding the migrated schema.
pub const TEMPLATE_DB: &str = "projector_test_template";

/// Builds the runtime that drives the async repositories.
pub fn test_runtime() -> Result<Runtime, BoxError> {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .map_err(boxed)
}

/// Returns the cluster, or `None` after reporting why the test is skipped.
#[must_use]
pub fn cluster_or_skip(cluster: Result<PostgresCluster, BoxError>) -> Option<PostgresCluster> {
    match cluster {
        Ok(cluster) => Some(cluster),
        Err(err) => {
            eprintln!("SKIP-TEST-CLUSTER: embedded PostgreSQL unavailable: {err}");
            None
        }
    }
}

fn apply_migrations(url: &str) -> Result<(), BoxError> {
    let mut connection = PgConnection::establish(url).map_err(boxed)?;
    connection.batch_execute(CREATE_TABLES_SQL).map_err(boxed)
}

/// Fresh database cloned from the migrated template, dropped on exit.
pub struct TestDatabase {
    cluster: PostgresCluster,
    name: String,
    /// Pool connected to the database.
    pub pool: PgPool,
}

impl TestDatabase {
    /// Creates the template on first use and clones it.
    pub fn create(cluster: PostgresCluster) -> Result<Self, BoxError> {
        cluster.ensure_template(TEMPLATE_DB, apply_migrations)?;
        let name = format!("test_{}", Uuid::new_v4().simple());
        cluster.create_database_from_template(&name, TEMPLATE_DB)?;
        // One connection keeps statement order deterministic.
        let pool = connect(&cluster.database_url(&name), 1).map_err(boxed)?;
        Ok(Self {
            cluster,
            name,
            pool,
        })
    }

    /// Task repository over this database.
    #[must_use]
    pub fn tasks(&self) -> PostgresTaskRepository {
        PostgresTaskRepository::new(self.pool.clone())
    }

    /// Workflow repository over this database.
    #[must_use]
    pub fn workflow(&self) -> PostgresWorkflowRepository {
        PostgresWorkflowRepository::new(self.pool.clone())
    }

    /// Project repository over this database.
    #[must_use]
    pub fn projects(&self) -> PostgresProjectRepository {
        PostgresProjectRepository::new(self.pool.clone())
    }
}

impl Drop for TestDatabase {
    fn drop(&mut self) {
        if let Err(err) = self.cluster.drop_database(&self.name) {
            eprintln!("failed to drop test database {}: {err}", self.name);
        }
    }
}

/// A stored project with the rows a task needs.
pub struct Seed {
    /// Owning project.
    pub project: Project,
    /// Initial status.
    pub new: Status,
    /// Resolved status.
    pub fixed: Status,
    /// Component every task uses.
    pub component: Component,
    /// Priority every task uses.
    pub priority: Label,
    /// Task type every task uses.
    pub task_type: Label,
}

impl Seed {
    /// Stores a project with two statuses joined by a complete graph.
    pub async fn store(database: &TestDatabase) -> Result<Self, BoxError> {
        let clock = DefaultClock;
        let project = Project::new(
            NewProject {
                name: ProjectName::new(format!("Seed {}", Uuid::new_v4().simple()))
                    .map_err(boxed)?,
                description: String::new(),
                category: None,
                visibility: Visibility::Public,
                author: UserId::new(),
            },
            &clock,
        );
        database.projects().store(&project).await.map_err(boxed)?;

        let id = project.id();
        let new = Status::new(id, "New", 1, false, true).map_err(boxed)?;
        let fixed = Status::new(id, "Fixed", 2, true, false).map_err(boxed)?;
        let component = Component::new(id, "Core").map_err(boxed)?;
        let priority = Label::new(id, LabelKind::Priority, "Normal", 1).map_err(boxed)?;
        let task_type = Label::new(id, LabelKind::TaskType, "Bug", 1).map_err(boxed)?;

        let workflow = database.workflow();
        for status in [&new, &fixed] {
            workflow.insert_status(status).await.map_err(boxed)?;
        }
        for transition in StatusGraph::complete(&[new.clone(), fixed.clone()]) {
            workflow.insert_transition(transition).await.map_err(boxed)?;
        }
        workflow.insert_component(&component).await.map_err(boxed)?;
        workflow.insert_label(&priority).await.map_err(boxed)?;
        workflow.insert_label(&task_type).await.map_err(boxed)?;

        Ok(Self {
            project,
            new,
            fixed,
            component,
            priority,
            task_type,
        })
    }

    /// Project identifier.
    #[must_use]
    pub fn project_id(&self) -> ProjectId {
        self.project.id()
    }

    /// Fields for a task in the initial status.
    #[must_use]
    pub fn fields(&self, summary: &str) -> TaskFields {
        TaskFields {
            summary: summary.to_owned(),
            description: String::new(),
            status: self.new.id,
            component: self.component.id,
            deadline: NaiveDate::from_ymd_opt(2030, 1, 31),
            milestone: None,
            owner: None,
            priority: self.priority.id,
            task_type: self.task_type.id,
        }
    }

    /// Creates a task in the initial status.
    pub async fn create_task(
        &self,
        database: &TestDatabase,
        summary: &str,
    ) -> Result<Task, BoxError> {
        let draft = TaskDraft::new(
            self.project_id(),
            self.fields(summary),
            self.project.author(),
            &DefaultClock,
        )
        .map_err(boxed)?;
        database.tasks().create(draft).await.map_err(boxed)
    }
}
