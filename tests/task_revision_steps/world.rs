//! Shared world state for task revision BDD scenarios.

use projector::accounts::Principal;
use projector::project::domain::Project;
use projector::tracker::domain::{Task, TaskFields};
use projector::tracker::services::{TaskEdit, TaskServiceError};
use rstest::fixture;

use super::helpers::App;

/// Scenario world for task revision behaviour tests.
pub struct RevisionWorld {
    pub app: App,
    pub author: Option<Principal>,
    pub project: Option<Project>,
    pub task: Option<Task>,
    pub last_edit: Option<Result<TaskEdit, TaskServiceError>>,
}

impl RevisionWorld {
    /// Creates a world with a freshly wired application.
    #[must_use]
    pub fn new() -> Self {
        Self {
            app: App::new(),
            author: None,
            project: None,
            task: None,
            last_edit: None,
        }
    }

    /// Returns the project owner.
    ///
    /// # Errors
    ///
    /// Returns an error before the project step ran.
    pub fn author(&self) -> Result<&Principal, eyre::Report> {
        self.author
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing project owner in scenario world"))
    }

    /// Returns the scenario project.
    ///
    /// # Errors
    ///
    /// Returns an error before the project step ran.
    pub fn project(&self) -> Result<&Project, eyre::Report> {
        self.project
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing project in scenario world"))
    }

    /// Returns the scenario task.
    ///
    /// # Errors
    ///
    /// Returns an error before the task step ran.
    pub fn task(&self) -> Result<&Task, eyre::Report> {
        self.task
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing task in scenario world"))
    }

    /// Submits `fields` as an edit of the scenario task.
    ///
    /// # Errors
    ///
    /// Returns an error when the scenario is missing its project or task.
    /// Service failures are stored in `last_edit`.
    pub fn submit(
        &mut self,
        fields: TaskFields,
        comment: Option<String>,
    ) -> Result<(), eyre::Report> {
        let principal = self.author()?.clone();
        let project = self.project()?.id();
        let number = self.task()?.number();
        let result = run_async(self.app.tasks.edit_task(
            &principal,
            project,
            number,
            fields,
            comment,
        ));
        if let Ok(ref edit) = result {
            self.task = Some(edit.task.clone());
        }
        self.last_edit = Some(result);
        Ok(())
    }
}

impl Default for RevisionWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> RevisionWorld {
    RevisionWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
