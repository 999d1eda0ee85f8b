//! Activity log entries.

use crate::accounts::UserId;
use crate::project::domain::ProjectId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Identifier of an activity entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionId(Uuid);

impl ActionId {
    /// Creates a new random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an identifier from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for ActionId {
    fn default() -> Self {
        Self::new()
    }
}

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionVerb {
    /// A project was created.
    Created,
    /// A project was forked.
    Forked,
    /// A task was opened.
    CreatedTask,
    /// A task was edited.
    ChangedTask,
    /// A member joined the project.
    AddedMember,
    /// A team joined the project.
    AddedTeam,
}

impl ActionVerb {
    /// Returns the stored verb text.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Forked => "forked",
            Self::CreatedTask => "created task",
            Self::ChangedTask => "changed task",
            Self::AddedMember => "added member",
            Self::AddedTeam => "added team",
        }
    }
}

impl fmt::Display for ActionVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown verb or target kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown action value: {0}")]
pub struct ParseActionError(pub String);

impl TryFrom<&str> for ActionVerb {
    type Error = ParseActionError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "created" => Ok(Self::Created),
            "forked" => Ok(Self::Forked),
            "created task" => Ok(Self::CreatedTask),
            "changed task" => Ok(Self::ChangedTask),
            "added member" => Ok(Self::AddedMember),
            "added team" => Ok(Self::AddedTeam),
            other => Err(ParseActionError(other.to_owned())),
        }
    }
}

/// Kind of object an action points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    /// A project.
    Project,
    /// A task.
    Task,
    /// A user.
    User,
    /// A group.
    Group,
}

impl TargetKind {
    /// Returns the stored kind text.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::Task => "task",
            Self::User => "user",
            Self::Group => "group",
        }
    }
}

impl TryFrom<&str> for TargetKind {
    type Error = ParseActionError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "project" => Ok(Self::Project),
            "task" => Ok(Self::Task),
            "user" => Ok(Self::User),
            "group" => Ok(Self::Group),
            other => Err(ParseActionError(other.to_owned())),
        }
    }
}

/// Generic link to the object an action concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionTarget {
    /// Object kind.
    pub kind: TargetKind,
    /// Object identifier.
    pub id: Uuid,
}

impl ActionTarget {
    /// Creates a target link.
    #[must_use]
    pub const fn new(kind: TargetKind, id: Uuid) -> Self {
        Self { kind, id }
    }
}

/// Append-only activity entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    id: ActionId,
    project_id: ProjectId,
    actor: Option<UserId>,
    verb: ActionVerb,
    target: Option<ActionTarget>,
    created_at: DateTime<Utc>,
    is_public: bool,
}

/// Parameter object for reconstructing a persisted action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedActionData {
    /// Persisted identifier.
    pub id: ActionId,
    /// Persisted project.
    pub project_id: ProjectId,
    /// Persisted actor.
    pub actor: Option<UserId>,
    /// Persisted verb.
    pub verb: ActionVerb,
    /// Persisted target link.
    pub target: Option<ActionTarget>,
    /// Persisted timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted public flag.
    pub is_public: bool,
}

impl Action {
    /// Creates a new entry stamped with the clock's current time.
    #[must_use]
    pub fn new(
        project_id: ProjectId,
        actor: Option<UserId>,
        verb: ActionVerb,
        is_public: bool,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id: ActionId::new(),
            project_id,
            actor,
            verb,
            target: None,
            created_at: clock.utc(),
            is_public,
        }
    }

    /// Links the entry to an object.
    #[must_use]
    pub const fn with_target(mut self, target: ActionTarget) -> Self {
        self.target = Some(target);
        self
    }

    /// Reconstructs an action from persisted storage.
    #[must_use]
    pub const fn from_persisted(data: PersistedActionData) -> Self {
        Self {
            id: data.id,
            project_id: data.project_id,
            actor: data.actor,
            verb: data.verb,
            target: data.target,
            created_at: data.created_at,
            is_public: data.is_public,
        }
    }

    /// Returns the identifier.
    #[must_use]
    pub const fn id(&self) -> ActionId {
        self.id
    }

    /// Returns the project the action belongs to.
    #[must_use]
    pub const fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// Returns the acting user, if any.
    #[must_use]
    pub const fn actor(&self) -> Option<UserId> {
        self.actor
    }

    /// Returns the verb.
    #[must_use]
    pub const fn verb(&self) -> ActionVerb {
        self.verb
    }

    /// Returns the linked object.
    #[must_use]
    pub const fn target(&self) -> Option<ActionTarget> {
        self.target
    }

    /// Returns the timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns `true` when the entry may appear in public feeds.
    #[must_use]
    pub const fn is_public(&self) -> bool {
        self.is_public
    }
}
