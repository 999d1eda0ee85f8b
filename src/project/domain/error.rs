//! Error types for project domain validation.

use super::{ProjectId, ProjectState};
use crate::accounts::Username;
use thiserror::Error;

/// Errors returned while constructing or mutating projects.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProjectDomainError {
    /// The project name is empty after trimming.
    #[error("project name must not be empty")]
    EmptyProjectName,

    /// The project name exceeds the storage limit.
    #[error("project name exceeds 64 character limit: {0}")]
    ProjectNameTooLong(String),

    /// The project name yields an empty slug.
    #[error("project name '{0}' must contain at least one letter or digit")]
    InvalidProjectName(String),

    /// The project name is reserved.
    #[error("project name '{0}' is not allowed")]
    BannedProjectName(String),

    /// The requested lifecycle change is not permitted.
    #[error("invalid project state transition: {from} -> {to}")]
    InvalidStateTransition {
        /// Current state.
        from: ProjectState,
        /// Requested state.
        to: ProjectState,
    },

    /// The project already has a backing repository.
    #[error("project {0} already has a repository")]
    RepositoryAlreadyExists(ProjectId),
}

/// Reasons a fork request is rejected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ForkError {
    /// Anonymous principals cannot fork.
    #[error("anonymous users cannot fork projects")]
    Anonymous,

    /// Inactive accounts cannot fork.
    #[error("inactive user '{0}' cannot fork projects")]
    InactiveUser(Username),

    /// Authors cannot fork their own project.
    #[error("user '{0}' cannot fork their own project")]
    OwnProject(Username),

    /// The user already owns a project in the fork tree.
    #[error("user '{user}' already forked project tree {root}")]
    AlreadyForked {
        /// Forking user.
        user: Username,
        /// Root of the fork tree.
        root: ProjectId,
    },
}

/// Error returned while parsing project states from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown project state code: {0}")]
pub struct ParseProjectStateError(pub i16);

/// Error returned while parsing visibility from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown project visibility: {0}")]
pub struct ParseVisibilityError(pub String);
