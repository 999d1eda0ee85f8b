//! Immutable task snapshots.

use super::{Changeset, Task, TaskFields, TaskPk};
use crate::accounts::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Field values of a task at one revision. Unique by `(revision, task)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRevision {
    /// Task the snapshot belongs to.
    pub task_pk: TaskPk,
    /// Revision number; 0 is the creation snapshot.
    pub revision: u32,
    /// Snapshot of the tracked fields.
    pub fields: TaskFields,
    /// Free-text comment attached to the edit.
    pub comment: Option<String>,
    /// User who produced the revision.
    pub editor: UserId,
    /// When the revision was recorded.
    pub created_at: DateTime<Utc>,
}

impl TaskRevision {
    /// Captures the current state of `task`.
    #[must_use]
    pub fn snapshot(task: &Task, comment: Option<String>) -> Self {
        let comment = comment
            .map(|text| text.trim().to_owned())
            .filter(|text| !text.is_empty());
        Self {
            task_pk: task.pk(),
            revision: task.revision(),
            fields: task.fields().clone(),
            comment,
            editor: task.editor(),
            created_at: task.edited_at(),
        }
    }

    /// Compares this snapshot against an older one.
    #[must_use]
    pub fn diff(&self, old: &Self) -> Changeset {
        Changeset::between(&self.fields, &old.fields)
    }
}
