//! Background setup runner.

use super::setup::{ProjectSetup, ProjectSetupResult, SetupRequest};
use crate::notification::{AdminMailer, Mailer};
use crate::project::domain::{Project, ProjectId};
use crate::project::ports::ProjectRepository;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

/// Runs setup on a spawned task once the project becomes visible.
///
/// The project row may be written by a transaction that has not committed
/// when the task starts, so the runner polls the repository a bounded number
/// of times before giving up.
pub struct BackgroundSetup<S, P, M>
where
    S: ProjectSetup + 'static,
    P: ProjectRepository + 'static,
    M: Mailer + 'static,
{
    setup: Arc<S>,
    projects: Arc<P>,
    admins: AdminMailer<M>,
    attempts: u32,
    interval: Duration,
}

impl<S, P, M> BackgroundSetup<S, P, M>
where
    S: ProjectSetup + 'static,
    P: ProjectRepository + 'static,
    M: Mailer + 'static,
{
    /// Creates a runner that polls five times, 200 ms apart.
    #[must_use]
    pub const fn new(setup: Arc<S>, projects: Arc<P>, admins: AdminMailer<M>) -> Self {
        Self {
            setup,
            projects,
            admins,
            attempts: 5,
            interval: Duration::from_millis(200),
        }
    }

    /// Overrides the visibility polling schedule.
    #[must_use]
    pub const fn with_polling(mut self, attempts: u32, interval: Duration) -> Self {
        self.attempts = attempts;
        self.interval = interval;
        self
    }

    /// Spawns setup for `project` and returns the task handle.
    #[must_use]
    pub fn spawn(&self, project: ProjectId, request: SetupRequest) -> JoinHandle<()> {
        let job = SetupJob {
            setup: Arc::clone(&self.setup),
            projects: Arc::clone(&self.projects),
            admins: self.admins.clone(),
            attempts: self.attempts,
            interval: self.interval,
        };
        tokio::spawn(async move { job.execute(project, request).await })
    }
}

#[async_trait]
impl<S, P, M> ProjectSetup for BackgroundSetup<S, P, M>
where
    S: ProjectSetup + 'static,
    P: ProjectRepository + 'static,
    M: Mailer + 'static,
{
    async fn run(
        &self,
        project: ProjectId,
        request: SetupRequest,
    ) -> ProjectSetupResult<Option<Project>> {
        drop(self.spawn(project, request));
        debug!(project = %project, "scheduled background project setup");
        Ok(None)
    }
}

struct SetupJob<S, P, M>
where
    S: ProjectSetup,
    P: ProjectRepository,
    M: Mailer,
{
    setup: Arc<S>,
    projects: Arc<P>,
    admins: AdminMailer<M>,
    attempts: u32,
    interval: Duration,
}

impl<S, P, M> SetupJob<S, P, M>
where
    S: ProjectSetup,
    P: ProjectRepository,
    M: Mailer,
{
    async fn execute(self, project: ProjectId, request: SetupRequest) {
        if !self.wait_until_visible(project).await {
            error!(
                project = %project,
                attempts = self.attempts,
                "project never became visible, setup abandoned"
            );
            self.alert(
                &format!("Project {project} setup abandoned"),
                &format!(
                    "Project {project} was not found after {} attempts.",
                    self.attempts
                ),
            )
            .await;
            return;
        }

        if let Err(err) = self.setup.run(project, request).await {
            self.alert(
                &format!("Project {project} setup failed"),
                &format!("Setup of project {project} failed: {err}"),
            )
            .await;
        }
    }

    async fn wait_until_visible(&self, project: ProjectId) -> bool {
        for attempt in 1..=self.attempts {
            match self.projects.find_by_id(project).await {
                Ok(Some(_)) => return true,
                Ok(None) => debug!(project = %project, attempt, "project not visible yet"),
                Err(err) => warn!(project = %project, attempt, error = %err, "project lookup failed"),
            }
            if attempt < self.attempts {
                tokio::time::sleep(self.interval).await;
            }
        }
        false
    }

    async fn alert(&self, subject: &str, body: &str) {
        if let Err(err) = self.admins.alert(subject, body).await {
            error!(error = %err, "failed to alert administrators");
        }
    }
}
