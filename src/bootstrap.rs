//! Startup wiring for project event listeners and the setup runner.

use crate::accounts::UserDirectory;
use crate::activity::{ActionRepository, ActivityRecorder, EventBus};
use crate::config::{NotificationSettings, SetupSettings};
use crate::notification::{AdminMailer, Mailer, RecipientResolver, TaskNotifier};
use crate::project::domain::{Project, ProjectId};
use crate::project::ports::ProjectRepository;
use crate::project::services::{BackgroundSetup, ProjectSetup, ProjectSetupResult, SetupRequest};
use crate::tracker::ports::{TaskRepository, WorkflowRepository};
use async_trait::async_trait;
use mockable::Clock;
use std::sync::Arc;

/// Collaborators needed by the standard listeners.
pub struct ListenerDependencies<A, T, P, W, D, M, C>
where
    A: ActionRepository + 'static,
    T: TaskRepository + 'static,
    P: ProjectRepository + 'static,
    W: WorkflowRepository + 'static,
    D: UserDirectory + 'static,
    M: Mailer + 'static,
    C: Clock + Send + Sync + 'static,
{
    /// Activity log storage.
    pub actions: Arc<A>,
    /// Task storage, for watchers.
    pub tasks: Arc<T>,
    /// Project storage, for memberships and teams.
    pub projects: Arc<P>,
    /// Workflow storage, for display names in mails.
    pub workflow: Arc<W>,
    /// User and group lookup.
    pub directory: Arc<D>,
    /// Outgoing mail.
    pub mailer: Arc<M>,
    /// Time source.
    pub clock: Arc<C>,
    /// Sender address for notifications.
    pub from_address: String,
}

/// Builds an [`EventBus`] with the activity recorder registered first and
/// the task notifier second.
#[must_use]
pub fn event_bus<A, T, P, W, D, M, C>(deps: ListenerDependencies<A, T, P, W, D, M, C>) -> EventBus
where
    A: ActionRepository + 'static,
    T: TaskRepository + 'static,
    P: ProjectRepository + 'static,
    W: WorkflowRepository + 'static,
    D: UserDirectory + 'static,
    M: Mailer + 'static,
    C: Clock + Send + Sync + 'static,
{
    let mut bus = EventBus::new();
    bus.register(Arc::new(ActivityRecorder::new(deps.actions, deps.clock)));
    let recipients = RecipientResolver::new(
        deps.tasks,
        deps.projects,
        Arc::clone(&deps.directory),
    );
    bus.register(Arc::new(TaskNotifier::new(
        recipients,
        deps.workflow,
        deps.directory,
        deps.mailer,
        deps.from_address,
    )));
    bus
}

/// Inline or background setup, as selected by [`SetupSettings::asynchronous`].
pub enum SetupRunner<S, P, M>
where
    S: ProjectSetup + 'static,
    P: ProjectRepository + 'static,
    M: Mailer + 'static,
{
    /// Setup finishes before project creation returns.
    Inline(Arc<S>),
    /// Setup runs on a spawned task.
    Background(BackgroundSetup<S, P, M>),
}

#[async_trait]
impl<S, P, M> ProjectSetup for SetupRunner<S, P, M>
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
        match self {
            Self::Inline(setup) => setup.run(project, request).await,
            Self::Background(runner) => runner.run(project, request).await,
        }
    }
}

/// Wraps `setup` in the runner the configuration asks for.
///
/// Background runners poll with the configured schedule and alert the
/// configured administrators.
#[must_use]
pub fn setup_runner<S, P, M>(
    settings: &SetupSettings,
    notifications: &NotificationSettings,
    setup: Arc<S>,
    projects: Arc<P>,
    mailer: Arc<M>,
) -> SetupRunner<S, P, M>
where
    S: ProjectSetup + 'static,
    P: ProjectRepository + 'static,
    M: Mailer + 'static,
{
    if !settings.asynchronous {
        return SetupRunner::Inline(setup);
    }
    let admins = AdminMailer::new(
        mailer,
        notifications.from_address.clone(),
        notifications.admin_emails.clone(),
    );
    SetupRunner::Background(
        BackgroundSetup::new(setup, projects, admins)
            .with_polling(settings.visibility_attempts, settings.visibility_interval()),
    )
}
