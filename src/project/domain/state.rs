//! Project setup checkpoint ladder.

use super::ParseProjectStateError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Setup progress of a project.
///
/// States are ordered by their storage code. Setup only moves forward;
/// `Error` can be entered from any other state and is left only through an
/// explicit retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectState {
    /// A setup step failed.
    Error,
    /// Created but not yet set up.
    Pending,
    /// Row persisted.
    Created,
    /// Author membership exists.
    MembershipsCreated,
    /// Author holds every project permission.
    AuthorPermissionsCreated,
    /// Components, types, priorities, statuses and transitions exist.
    WorkflowCreated,
    /// Project configuration exists.
    ConfigCreated,
    /// Backing repository exists.
    RepositoryCreated,
    /// Setup finished.
    Ready,
}

impl ProjectState {
    /// Every state in ladder order.
    pub const ALL: [Self; 9] = [
        Self::Error,
        Self::Pending,
        Self::Created,
        Self::MembershipsCreated,
        Self::AuthorPermissionsCreated,
        Self::WorkflowCreated,
        Self::ConfigCreated,
        Self::RepositoryCreated,
        Self::Ready,
    ];

    /// Returns the persisted integer code.
    #[must_use]
    pub const fn code(self) -> i16 {
        match self {
            Self::Error => -1,
            Self::Pending => 0,
            Self::Created => 10,
            Self::MembershipsCreated => 20,
            Self::AuthorPermissionsCreated => 30,
            Self::WorkflowCreated => 40,
            Self::ConfigCreated => 50,
            Self::RepositoryCreated => 60,
            Self::Ready => 100,
        }
    }

    /// Returns a human-readable label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Pending => "pending",
            Self::Created => "created",
            Self::MembershipsCreated => "memberships_created",
            Self::AuthorPermissionsCreated => "author_permissions_created",
            Self::WorkflowCreated => "workflow_created",
            Self::ConfigCreated => "config_created",
            Self::RepositoryCreated => "repository_created",
            Self::Ready => "ready",
        }
    }

    /// Returns `true` when `next` is a legal move from this state.
    ///
    /// Forward moves are legal from any non-error state; `Error` is legal
    /// from any state except itself.
    #[must_use]
    pub fn can_advance_to(self, next: Self) -> bool {
        match (self, next) {
            (Self::Error, _) => false,
            (_, Self::Error) => true,
            (current, target) => target > current,
        }
    }
}

impl fmt::Display for ProjectState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<i16> for ProjectState {
    type Error = ParseProjectStateError;

    fn try_from(value: i16) -> Result<Self, ParseProjectStateError> {
        Self::ALL
            .into_iter()
            .find(|state| state.code() == value)
            .ok_or(ParseProjectStateError(value))
    }
}
