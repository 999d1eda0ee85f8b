//! Error types for tracker domain validation.

use super::{LabelKind, MilestoneId, StatusId};
use thiserror::Error;

/// Errors returned while constructing or editing tracker entities.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TrackerDomainError {
    /// A workflow entity name is empty after trimming.
    #[error("{0} name must not be empty")]
    EmptyName(&'static str),

    /// A workflow entity name exceeds the storage limit.
    #[error("{entity} name exceeds 64 character limit: {name}")]
    NameTooLong {
        /// Entity kind.
        entity: &'static str,
        /// Offending name.
        name: String,
    },

    /// The task summary is empty after trimming.
    #[error("task summary must not be empty")]
    EmptySummary,

    /// The task summary exceeds the storage limit.
    #[error("task summary exceeds 64 character limit: {0}")]
    SummaryTooLong(String),

    /// The task number is zero or too large.
    #[error("invalid task number {0}, expected a positive integer")]
    InvalidTaskNumber(u64),

    /// The edit changes no field and carries no comment.
    #[error("no changes made")]
    NoChangesMade,

    /// The workflow has no transition between the statuses.
    #[error("status {from} cannot change to {to}")]
    IllegalStatusChange {
        /// Current status.
        from: StatusId,
        /// Requested status.
        to: StatusId,
    },

    /// The project workflow has no initial status.
    #[error("workflow defines no initial status")]
    NoInitialStatus,

    /// The project workflow has no label of the kind.
    #[error("workflow defines no {0}")]
    MissingLabel(LabelKind),

    /// The project has no component.
    #[error("project defines no component")]
    MissingComponent,

    /// The milestone was already completed.
    #[error("milestone {0} is already completed")]
    MilestoneAlreadyCompleted(MilestoneId),
}

/// Error returned while parsing label kinds from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown label kind: {0}")]
pub struct ParseLabelKindError(pub String);
