//! Project membership and team records.

use super::ProjectId;
use crate::accounts::{GroupId, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// A user's membership in a project. Unique per `(project, user)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    /// Project the user belongs to.
    pub project_id: ProjectId,
    /// Member account.
    pub user_id: UserId,
    /// When the membership was created.
    pub joined_at: DateTime<Utc>,
}

impl Membership {
    /// Creates a membership stamped with the current time.
    #[must_use]
    pub fn new(project_id: ProjectId, user_id: UserId, clock: &impl Clock) -> Self {
        Self {
            project_id,
            user_id,
            joined_at: clock.utc(),
        }
    }
}

/// A group promoted to project membership. Unique per `(project, group)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// Project the group belongs to.
    pub project_id: ProjectId,
    /// Member group.
    pub group_id: GroupId,
    /// When the team was added.
    pub created_at: DateTime<Utc>,
}

impl Team {
    /// Creates a team stamped with the current time.
    #[must_use]
    pub fn new(project_id: ProjectId, group_id: GroupId, clock: &impl Clock) -> Self {
        Self {
            project_id,
            group_id,
            created_at: clock.utc(),
        }
    }
}
