//! Shared world state for project setup BDD scenarios.

use std::collections::HashMap;

use projector::accounts::User;
use projector::project::domain::Project;
use projector::project::services::ProjectServiceError;
use rstest::fixture;

use super::helpers::App;

/// Scenario world for project setup behaviour tests.
pub struct ProjectWorld {
    pub app: App,
    pub users: HashMap<String, User>,
    pub projects: HashMap<String, Project>,
    pub last_project: Option<Project>,
    pub last_error: Option<ProjectServiceError>,
}

impl ProjectWorld {
    /// Creates a world with a freshly wired application.
    #[must_use]
    pub fn new() -> Self {
        Self {
            app: App::new(),
            users: HashMap::new(),
            projects: HashMap::new(),
            last_project: None,
            last_error: None,
        }
    }

    /// Returns a user registered by an earlier step.
    ///
    /// # Errors
    ///
    /// Returns an error when no such user was registered.
    pub fn user(&self, name: &str) -> Result<&User, eyre::Report> {
        self.users
            .get(name)
            .ok_or_else(|| eyre::eyre!("user {name} was not registered"))
    }

    /// Returns a project created by an earlier step.
    ///
    /// # Errors
    ///
    /// Returns an error when no such project was created.
    pub fn project(&self, name: &str) -> Result<&Project, eyre::Report> {
        self.projects
            .get(name)
            .ok_or_else(|| eyre::eyre!("project {name} was not created"))
    }

    /// Records the outcome of a create or fork step.
    pub fn record(&mut self, result: Result<Project, ProjectServiceError>) {
        match result {
            Ok(project) => {
                self.last_project = Some(project);
                self.last_error = None;
            }
            Err(err) => {
                self.last_project = None;
                self.last_error = Some(err);
            }
        }
    }
}

impl Default for ProjectWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> ProjectWorld {
    ProjectWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
