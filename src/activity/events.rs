//! Project events and the listener bus.

use crate::accounts::{GroupId, UserId};
use crate::project::domain::Project;
use crate::tracker::domain::{Changeset, Task, TaskRevision};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Something that happened to a project.
#[derive(Debug, Clone)]
pub enum ProjectEvent {
    /// A project finished its initial save.
    ProjectCreated {
        /// The new project.
        project: Project,
        /// Creating user.
        actor: UserId,
    },
    /// A project was forked.
    ProjectForked {
        /// The project that was forked.
        original: Project,
        /// The new fork.
        fork: Project,
        /// Forking user.
        actor: UserId,
    },
    /// A task was opened.
    TaskCreated {
        /// Owning project.
        project: Project,
        /// The new task.
        task: Task,
        /// Creating user.
        actor: UserId,
    },
    /// A task was edited.
    TaskChanged {
        /// Owning project.
        project: Project,
        /// Task after the edit.
        task: Task,
        /// Snapshot recorded for the edit.
        revision: TaskRevision,
        /// Field changes introduced by the edit.
        changes: Changeset,
        /// Editing user.
        actor: UserId,
    },
    /// A user became a project member.
    MemberAdded {
        /// Project joined.
        project: Project,
        /// New member.
        user: UserId,
        /// User who added the member.
        actor: UserId,
    },
    /// A group became a project team.
    TeamAdded {
        /// Project joined.
        project: Project,
        /// New team group.
        group: GroupId,
        /// User who added the team.
        actor: UserId,
    },
}

impl ProjectEvent {
    /// Returns a short event name for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::ProjectCreated { .. } => "project_created",
            Self::ProjectForked { .. } => "project_forked",
            Self::TaskCreated { .. } => "task_created",
            Self::TaskChanged { .. } => "task_changed",
            Self::MemberAdded { .. } => "member_added",
            Self::TeamAdded { .. } => "team_added",
        }
    }
}

/// Failure reported by a listener.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct ListenerError(Arc<dyn std::error::Error + Send + Sync>);

impl ListenerError {
    /// Wraps the underlying error.
    pub fn new(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self(Arc::new(err))
    }
}

/// Reacts to project events.
#[async_trait]
pub trait EventListener: Send + Sync {
    /// Name used in log output.
    fn name(&self) -> &'static str;

    /// Handles one event.
    async fn on_event(&self, event: &ProjectEvent) -> Result<(), ListenerError>;
}

/// Ordered set of listeners notified for every published event.
#[derive(Clone, Default)]
pub struct EventBus {
    listeners: Vec<Arc<dyn EventListener>>,
}

impl EventBus {
    /// Creates a bus with no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a listener; listeners run in registration order.
    pub fn register(&mut self, listener: Arc<dyn EventListener>) {
        debug!(listener = listener.name(), "registered event listener");
        self.listeners.push(listener);
    }

    /// Returns the number of registered listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Returns `true` when no listener is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Delivers `event` to every listener. Failures are logged and skipped.
    pub async fn publish(&self, event: &ProjectEvent) {
        for listener in &self.listeners {
            if let Err(err) = listener.on_event(event).await {
                warn!(
                    listener = listener.name(),
                    event = event.kind(),
                    error = %err,
                    "event listener failed"
                );
            }
        }
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.listeners.iter().map(|listener| listener.name()).collect();
        f.debug_struct("EventBus").field("listeners", &names).finish()
    }
}
