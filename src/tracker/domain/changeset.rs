//! Field-level differences between task snapshots.

use super::{ComponentId, LabelId, MilestoneId, StatusId, TaskFields};
use crate::accounts::UserId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Task fields tracked by revisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangesetField {
    /// Short summary line.
    Summary,
    /// Long description.
    Description,
    /// Workflow status.
    Status,
    /// Project component.
    Component,
    /// Due date.
    Deadline,
    /// Target milestone.
    Milestone,
    /// Assigned user.
    Owner,
    /// Priority label.
    Priority,
    /// Task type label.
    Type,
}

/// Fields compared by [`Changeset::between`], in reporting order.
pub const CHANGESET_FIELDS: [ChangesetField; 9] = [
    ChangesetField::Summary,
    ChangesetField::Description,
    ChangesetField::Status,
    ChangesetField::Component,
    ChangesetField::Deadline,
    ChangesetField::Milestone,
    ChangesetField::Owner,
    ChangesetField::Priority,
    ChangesetField::Type,
];

impl ChangesetField {
    /// Returns the field name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Summary => "summary",
            Self::Description => "description",
            Self::Status => "status",
            Self::Component => "component",
            Self::Deadline => "deadline",
            Self::Milestone => "milestone",
            Self::Owner => "owner",
            Self::Priority => "priority",
            Self::Type => "type",
        }
    }
}

impl fmt::Display for ChangesetField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value of a tracked field at one revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    /// Unset optional field.
    Empty,
    /// Free text.
    Text(String),
    /// Calendar date.
    Date(NaiveDate),
    /// Status reference.
    Status(StatusId),
    /// Component reference.
    Component(ComponentId),
    /// Milestone reference.
    Milestone(MilestoneId),
    /// User reference.
    User(UserId),
    /// Task type or priority reference.
    Label(LabelId),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("-"),
            Self::Text(text) => f.write_str(text),
            Self::Date(date) => write!(f, "{date}"),
            Self::Status(id) => write!(f, "{id}"),
            Self::Component(id) => write!(f, "{id}"),
            Self::Milestone(id) => write!(f, "{id}"),
            Self::User(id) => write!(f, "{id}"),
            Self::Label(id) => write!(f, "{id}"),
        }
    }
}

impl TaskFields {
    /// Returns the value of one tracked field.
    #[must_use]
    pub fn value_of(&self, field: ChangesetField) -> FieldValue {
        match field {
            ChangesetField::Summary => FieldValue::Text(self.summary.clone()),
            ChangesetField::Description => FieldValue::Text(self.description.clone()),
            ChangesetField::Status => FieldValue::Status(self.status),
            ChangesetField::Component => FieldValue::Component(self.component),
            ChangesetField::Deadline => self.deadline.map_or(FieldValue::Empty, FieldValue::Date),
            ChangesetField::Milestone => {
                self.milestone.map_or(FieldValue::Empty, FieldValue::Milestone)
            }
            ChangesetField::Owner => self.owner.map_or(FieldValue::Empty, FieldValue::User),
            ChangesetField::Priority => FieldValue::Label(self.priority),
            ChangesetField::Type => FieldValue::Label(self.task_type),
        }
    }
}

/// One changed field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldChange {
    /// Changed field.
    pub field: ChangesetField,
    /// Value before the edit.
    pub old: FieldValue,
    /// Value after the edit.
    pub new: FieldValue,
}

/// Ordered set of field changes between two snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Changeset {
    changes: Vec<FieldChange>,
}

impl Changeset {
    /// Compares `new` against `old` over [`CHANGESET_FIELDS`].
    #[must_use]
    pub fn between(new: &TaskFields, old: &TaskFields) -> Self {
        let changes = CHANGESET_FIELDS
            .into_iter()
            .filter_map(|field| {
                let old_value = old.value_of(field);
                let new_value = new.value_of(field);
                (old_value != new_value).then_some(FieldChange {
                    field,
                    old: old_value,
                    new: new_value,
                })
            })
            .collect();
        Self { changes }
    }

    /// Returns `true` when no field changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Returns the number of changed fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Returns the change for `field`, if it changed.
    #[must_use]
    pub fn get(&self, field: ChangesetField) -> Option<&FieldChange> {
        self.changes.iter().find(|change| change.field == field)
    }

    /// Returns the changed field names in reporting order.
    #[must_use]
    pub fn fields(&self) -> Vec<ChangesetField> {
        self.changes.iter().map(|change| change.field).collect()
    }

    /// Iterates over the changes in reporting order.
    pub fn iter(&self) -> std::slice::Iter<'_, FieldChange> {
        self.changes.iter()
    }
}

impl<'a> IntoIterator for &'a Changeset {
    type Item = &'a FieldChange;
    type IntoIter = std::slice::Iter<'a, FieldChange>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.iter()
    }
}
