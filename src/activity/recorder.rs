//! Listener that writes the activity log.

use super::{
    domain::{Action, ActionTarget, ActionVerb, TargetKind},
    events::{EventListener, ListenerError, ProjectEvent},
    ports::ActionRepository,
};
use async_trait::async_trait;
use mockable::Clock;
use std::sync::Arc;

/// Records an [`Action`] for each project event.
///
/// A fork is logged on the original project only; the fork itself starts
/// with an empty history.
#[derive(Clone)]
pub struct ActivityRecorder<R, C>
where
    R: ActionRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> ActivityRecorder<R, C>
where
    R: ActionRepository,
    C: Clock + Send + Sync,
{
    /// Creates a recorder.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }

    fn action_for(&self, event: &ProjectEvent) -> Action {
        let clock = &*self.clock;
        match event {
            ProjectEvent::ProjectCreated { project, actor } => Action::new(
                project.id(),
                Some(*actor),
                ActionVerb::Created,
                project.is_public(),
                clock,
            )
            .with_target(ActionTarget::new(TargetKind::Project, project.id().into_inner())),
            ProjectEvent::ProjectForked {
                original,
                fork,
                actor,
            } => Action::new(
                original.id(),
                Some(*actor),
                ActionVerb::Forked,
                fork.is_public(),
                clock,
            )
            .with_target(ActionTarget::new(TargetKind::Project, fork.id().into_inner())),
            ProjectEvent::TaskCreated {
                project,
                task,
                actor,
            } => Action::new(
                project.id(),
                Some(*actor),
                ActionVerb::CreatedTask,
                project.is_public(),
                clock,
            )
            .with_target(ActionTarget::new(TargetKind::Task, task.pk().into_inner())),
            ProjectEvent::TaskChanged {
                project,
                task,
                actor,
                ..
            } => Action::new(
                project.id(),
                Some(*actor),
                ActionVerb::ChangedTask,
                project.is_public(),
                clock,
            )
            .with_target(ActionTarget::new(TargetKind::Task, task.pk().into_inner())),
            ProjectEvent::MemberAdded {
                project,
                user,
                actor,
            } => Action::new(
                project.id(),
                Some(*actor),
                ActionVerb::AddedMember,
                project.is_public(),
                clock,
            )
            .with_target(ActionTarget::new(TargetKind::User, user.into_inner())),
            ProjectEvent::TeamAdded {
                project,
                group,
                actor,
            } => Action::new(
                project.id(),
                Some(*actor),
                ActionVerb::AddedTeam,
                project.is_public(),
                clock,
            )
            .with_target(ActionTarget::new(TargetKind::Group, group.into_inner())),
        }
    }
}

#[async_trait]
impl<R, C> EventListener for ActivityRecorder<R, C>
where
    R: ActionRepository + 'static,
    C: Clock + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        "activity_recorder"
    }

    async fn on_event(&self, event: &ProjectEvent) -> Result<(), ListenerError> {
        let action = self.action_for(event);
        self.repository
            .record(&action)
            .await
            .map_err(ListenerError::new)
    }
}
