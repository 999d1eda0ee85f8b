//! Permission vocabulary.

use crate::accounts::{GroupId, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Object-level permission on a single project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectPermission {
    /// See the project page.
    ViewProject,
    /// Edit project details.
    ChangeProject,
    /// Administer the project.
    AdminProject,
    /// Pull from the project repository.
    ReadRepository,
    /// Push to the project repository.
    WriteRepository,
    /// Browse tasks.
    ViewTasks,
    /// Open new tasks.
    AddTask,
    /// Edit existing tasks.
    ChangeTask,
    /// Add members.
    AddMember,
    /// Change member permissions.
    ChangeMember,
    /// Remove members.
    DeleteMember,
    /// Add teams.
    AddTeam,
    /// Change team permissions.
    ChangeTeam,
    /// Remove teams.
    DeleteTeam,
    /// Edit the project configuration.
    ChangeConfig,
    /// Edit statuses, transitions, components, labels and milestones.
    ChangeWorkflow,
}

impl ProjectPermission {
    /// Every project permission.
    pub const ALL: [Self; 16] = [
        Self::ViewProject,
        Self::ChangeProject,
        Self::AdminProject,
        Self::ReadRepository,
        Self::WriteRepository,
        Self::ViewTasks,
        Self::AddTask,
        Self::ChangeTask,
        Self::AddMember,
        Self::ChangeMember,
        Self::DeleteMember,
        Self::AddTeam,
        Self::ChangeTeam,
        Self::DeleteTeam,
        Self::ChangeConfig,
        Self::ChangeWorkflow,
    ];

    /// Permissions every principal holds on a public project.
    pub const PUBLIC: [Self; 3] = [Self::ViewProject, Self::ViewTasks, Self::ReadRepository];

    /// Permissions granted to a newly added member or team.
    pub const MEMBER_DEFAULTS: [Self; 6] = [
        Self::ViewProject,
        Self::ViewTasks,
        Self::AddTask,
        Self::ChangeTask,
        Self::ReadRepository,
        Self::WriteRepository,
    ];

    /// Returns the storage codename.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ViewProject => "view_project",
            Self::ChangeProject => "change_project",
            Self::AdminProject => "admin_project",
            Self::ReadRepository => "read_repository",
            Self::WriteRepository => "write_repository",
            Self::ViewTasks => "view_tasks",
            Self::AddTask => "add_task",
            Self::ChangeTask => "change_task",
            Self::AddMember => "add_member",
            Self::ChangeMember => "change_member",
            Self::DeleteMember => "delete_member",
            Self::AddTeam => "add_team",
            Self::ChangeTeam => "change_team",
            Self::DeleteTeam => "delete_team",
            Self::ChangeConfig => "change_config",
            Self::ChangeWorkflow => "change_workflow",
        }
    }

    /// Returns `true` when public projects grant this permission to everyone.
    #[must_use]
    pub fn is_public(self) -> bool {
        Self::PUBLIC.contains(&self)
    }
}

impl fmt::Display for ProjectPermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown permission codename.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown project permission: {0}")]
pub struct ParsePermissionError(pub String);

impl TryFrom<&str> for ProjectPermission {
    type Error = ParsePermissionError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|permission| permission.as_str() == normalized)
            .ok_or_else(|| ParsePermissionError(value.to_owned()))
    }
}

/// Holder of a permission grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Grantee {
    /// A single user.
    User(UserId),
    /// Every member of a group.
    Group(GroupId),
}

impl fmt::Display for Grantee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User(id) => write!(f, "user:{id}"),
            Self::Group(id) => write!(f, "group:{id}"),
        }
    }
}
