//! Identifier types for the tracker domain.

use super::TrackerDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! uuid_identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
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

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_identifier!(
    /// Primary key of a task row.
    TaskPk
);
uuid_identifier!(
    /// Identifier of a workflow status.
    StatusId
);
uuid_identifier!(
    /// Identifier of a project component.
    ComponentId
);
uuid_identifier!(
    /// Identifier of a task type or priority label.
    LabelId
);
uuid_identifier!(
    /// Identifier of a milestone.
    MilestoneId
);

/// Per-project sequential task number, starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskNumber(u64);

impl TaskNumber {
    /// Largest number representable in the `BIGINT` column.
    const MAX_PERSISTED_VALUE: u64 = i64::MAX as u64;

    /// Number of the first task in a project.
    pub const FIRST: Self = Self(1);

    /// Creates a validated task number.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerDomainError::InvalidTaskNumber`] for zero or values
    /// above `i64::MAX`.
    pub const fn new(value: u64) -> Result<Self, TrackerDomainError> {
        if value == 0 || value > Self::MAX_PERSISTED_VALUE {
            return Err(TrackerDomainError::InvalidTaskNumber(value));
        }
        Ok(Self(value))
    }

    /// Returns the number following the highest existing one.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerDomainError::InvalidTaskNumber`] on overflow.
    pub fn next_after(highest: Option<Self>) -> Result<Self, TrackerDomainError> {
        match highest {
            None => Ok(Self::FIRST),
            Some(Self(value)) => Self::new(value.saturating_add(1)),
        }
    }

    /// Returns the underlying value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TaskNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
