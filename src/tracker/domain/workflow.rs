//! Per-project workflow entities.

use super::{ComponentId, LabelId, MilestoneId, ParseLabelKindError, StatusId, TrackerDomainError};
use crate::project::domain::ProjectId;
use crate::workflow::StatusSpec;
use chrono::{DateTime, NaiveDate, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length of a workflow entity name, matching `VARCHAR(64)`.
const MAX_NAME_LENGTH: usize = 64;

fn validated_name(entity: &'static str, value: &str) -> Result<String, TrackerDomainError> {
    let normalized = value.trim();
    if normalized.is_empty() {
        return Err(TrackerDomainError::EmptyName(entity));
    }
    if normalized.chars().count() > MAX_NAME_LENGTH {
        return Err(TrackerDomainError::NameTooLong {
            entity,
            name: value.to_owned(),
        });
    }
    Ok(normalized.to_owned())
}

/// Node of a project's status graph. Unique by `(project, name)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    /// Status identifier.
    pub id: StatusId,
    /// Owning project.
    pub project_id: ProjectId,
    /// Display name.
    pub name: String,
    /// Ordering position.
    pub order: i32,
    /// Tasks in this status count as resolved.
    pub is_resolved: bool,
    /// New tasks may start in this status.
    pub is_initial: bool,
}

impl Status {
    /// Creates a status with a fresh identifier.
    ///
    /// # Errors
    ///
    /// Returns a name validation error.
    pub fn new(
        project_id: ProjectId,
        name: &str,
        order: i32,
        is_resolved: bool,
        is_initial: bool,
    ) -> Result<Self, TrackerDomainError> {
        Ok(Self {
            id: StatusId::new(),
            project_id,
            name: validated_name("status", name)?,
            order,
            is_resolved,
            is_initial,
        })
    }

    /// Creates a status from a workflow definition entry.
    ///
    /// # Errors
    ///
    /// Returns a name validation error.
    pub fn from_spec(project_id: ProjectId, spec: &StatusSpec) -> Result<Self, TrackerDomainError> {
        Self::new(
            project_id,
            &spec.name,
            spec.order,
            spec.is_resolved,
            spec.is_initial,
        )
    }
}

/// Permitted directed move between two statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Transition {
    /// Current status.
    pub source: StatusId,
    /// Status the task may move to.
    pub destination: StatusId,
}

impl Transition {
    /// Creates a transition.
    #[must_use]
    pub const fn new(source: StatusId, destination: StatusId) -> Self {
        Self {
            source,
            destination,
        }
    }
}

/// Project component. Unique by `(project, name)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    /// Component identifier.
    pub id: ComponentId,
    /// Owning project.
    pub project_id: ProjectId,
    /// Display name.
    pub name: String,
    /// Free-text description.
    pub description: String,
}

impl Component {
    /// Creates a component with a fresh identifier.
    ///
    /// # Errors
    ///
    /// Returns a name validation error.
    pub fn new(project_id: ProjectId, name: &str) -> Result<Self, TrackerDomainError> {
        Ok(Self {
            id: ComponentId::new(),
            project_id,
            name: validated_name("component", name)?,
            description: String::new(),
        })
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Ordered enumerations attached to tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelKind {
    /// Task type (bug, feature, ...).
    TaskType,
    /// Task priority.
    Priority,
}

impl LabelKind {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TaskType => "task_type",
            Self::Priority => "priority",
        }
    }
}

impl fmt::Display for LabelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TaskType => f.write_str("task type"),
            Self::Priority => f.write_str("priority"),
        }
    }
}

impl TryFrom<&str> for LabelKind {
    type Error = ParseLabelKindError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "task_type" => Ok(Self::TaskType),
            "priority" => Ok(Self::Priority),
            _ => Err(ParseLabelKindError(value.to_owned())),
        }
    }
}

/// Task type or priority. Unique by `(project, kind, name)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    /// Label identifier.
    pub id: LabelId,
    /// Owning project.
    pub project_id: ProjectId,
    /// Dimension the label belongs to.
    pub kind: LabelKind,
    /// Display name.
    pub name: String,
    /// Ordering position.
    pub order: i32,
}

impl Label {
    /// Creates a label with a fresh identifier.
    ///
    /// # Errors
    ///
    /// Returns a name validation error.
    pub fn new(
        project_id: ProjectId,
        kind: LabelKind,
        name: &str,
        order: i32,
    ) -> Result<Self, TrackerDomainError> {
        let entity = match kind {
            LabelKind::TaskType => "task type",
            LabelKind::Priority => "priority",
        };
        Ok(Self {
            id: LabelId::new(),
            project_id,
            kind,
            name: validated_name(entity, name)?,
            order,
        })
    }
}

/// Project milestone. Unique by `(project, name)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    /// Milestone identifier.
    pub id: MilestoneId,
    /// Owning project.
    pub project_id: ProjectId,
    /// Display name.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Target date.
    pub deadline: NaiveDate,
    /// Date the milestone was completed.
    pub completed_on: Option<NaiveDate>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Milestone {
    /// Creates an open milestone.
    ///
    /// # Errors
    ///
    /// Returns a name validation error.
    pub fn new(
        project_id: ProjectId,
        name: &str,
        deadline: NaiveDate,
        clock: &impl Clock,
    ) -> Result<Self, TrackerDomainError> {
        Ok(Self {
            id: MilestoneId::new(),
            project_id,
            name: validated_name("milestone", name)?,
            description: String::new(),
            deadline,
            completed_on: None,
            created_at: clock.utc(),
        })
    }

    /// Returns `true` once completed.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        self.completed_on.is_some()
    }

    /// Marks the milestone completed on `date`.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerDomainError::MilestoneAlreadyCompleted`] when it was
    /// completed before.
    pub fn complete(&mut self, date: NaiveDate) -> Result<(), TrackerDomainError> {
        if self.is_completed() {
            return Err(TrackerDomainError::MilestoneAlreadyCompleted(self.id));
        }
        self.completed_on = Some(date);
        Ok(())
    }
}
