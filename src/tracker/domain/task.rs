//! Task aggregate and its editable fields.

use super::{
    Changeset, ChangesetField, ComponentId, LabelId, MilestoneId, StatusId, TaskNumber, TaskPk,
    TaskRevision, TrackerDomainError,
};
use crate::accounts::UserId;
use crate::project::domain::ProjectId;
use chrono::{DateTime, NaiveDate, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Maximum summary length, matching the `VARCHAR(64)` column.
const MAX_SUMMARY_LENGTH: usize = 64;

/// Editable task fields; also the snapshot stored by each revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFields {
    /// Short summary line.
    pub summary: String,
    /// Long description.
    pub description: String,
    /// Workflow status.
    pub status: StatusId,
    /// Project component.
    pub component: ComponentId,
    /// Due date.
    pub deadline: Option<NaiveDate>,
    /// Target milestone.
    pub milestone: Option<MilestoneId>,
    /// Assigned user.
    pub owner: Option<UserId>,
    /// Priority label.
    pub priority: LabelId,
    /// Task type label.
    pub task_type: LabelId,
}

impl TaskFields {
    /// Trims the summary and checks its length.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerDomainError::EmptySummary`] or
    /// [`TrackerDomainError::SummaryTooLong`].
    pub fn normalized(mut self) -> Result<Self, TrackerDomainError> {
        let summary = self.summary.trim();
        if summary.is_empty() {
            return Err(TrackerDomainError::EmptySummary);
        }
        if summary.chars().count() > MAX_SUMMARY_LENGTH {
            return Err(TrackerDomainError::SummaryTooLong(self.summary));
        }
        self.summary = summary.to_owned();
        Ok(self)
    }
}

/// A task that has not been assigned its per-project number yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pk: TaskPk,
    project_id: ProjectId,
    fields: TaskFields,
    author: UserId,
    created_at: DateTime<Utc>,
}

impl TaskDraft {
    /// Creates a validated draft.
    ///
    /// # Errors
    ///
    /// Returns summary validation errors.
    pub fn new(
        project_id: ProjectId,
        fields: TaskFields,
        author: UserId,
        clock: &impl Clock,
    ) -> Result<Self, TrackerDomainError> {
        Ok(Self {
            pk: TaskPk::new(),
            project_id,
            fields: fields.normalized()?,
            author,
            created_at: clock.utc(),
        })
    }

    /// Returns the owning project.
    #[must_use]
    pub const fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// Turns the draft into revision 0 of a task numbered `number`.
    #[must_use]
    pub fn into_task(self, number: TaskNumber) -> Task {
        Task {
            pk: self.pk,
            project_id: self.project_id,
            number,
            fields: self.fields,
            author: self.author,
            editor: self.author,
            revision: 0,
            created_at: self.created_at,
            edited_at: self.created_at,
        }
    }
}

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pk: TaskPk,
    project_id: ProjectId,
    number: TaskNumber,
    fields: TaskFields,
    author: UserId,
    editor: UserId,
    revision: u32,
    created_at: DateTime<Utc>,
    edited_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted primary key.
    pub pk: TaskPk,
    /// Persisted project.
    pub project_id: ProjectId,
    /// Persisted per-project number.
    pub number: TaskNumber,
    /// Persisted field values.
    pub fields: TaskFields,
    /// Persisted author.
    pub author: UserId,
    /// Persisted last editor.
    pub editor: UserId,
    /// Persisted revision counter.
    pub revision: u32,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted last edit timestamp.
    pub edited_at: DateTime<Utc>,
}

impl Task {
    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            pk: data.pk,
            project_id: data.project_id,
            number: data.number,
            fields: data.fields,
            author: data.author,
            editor: data.editor,
            revision: data.revision,
            created_at: data.created_at,
            edited_at: data.edited_at,
        }
    }

    /// Returns the primary key.
    #[must_use]
    pub const fn pk(&self) -> TaskPk {
        self.pk
    }

    /// Returns the owning project.
    #[must_use]
    pub const fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// Returns the per-project number.
    #[must_use]
    pub const fn number(&self) -> TaskNumber {
        self.number
    }

    /// Returns the current field values.
    #[must_use]
    pub const fn fields(&self) -> &TaskFields {
        &self.fields
    }

    /// Returns the creating user.
    #[must_use]
    pub const fn author(&self) -> UserId {
        self.author
    }

    /// Returns the user who made the latest revision.
    #[must_use]
    pub const fn editor(&self) -> UserId {
        self.editor
    }

    /// Returns the revision counter. Zero for an unedited task.
    #[must_use]
    pub const fn revision(&self) -> u32 {
        self.revision
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest edit timestamp.
    #[must_use]
    pub const fn edited_at(&self) -> DateTime<Utc> {
        self.edited_at
    }

    /// Compares this task's fields against an older copy of the task.
    #[must_use]
    pub fn diff(&self, old: &Self) -> Changeset {
        Changeset::between(&self.fields, &old.fields)
    }

    /// Validates a proposed edit and returns the resulting changeset.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerDomainError::NoChangesMade`] when no field changes
    /// and `comment` is blank, or summary validation errors.
    pub fn clean(
        &self,
        proposed: TaskFields,
        comment: Option<&str>,
    ) -> Result<(TaskFields, Changeset), TrackerDomainError> {
        let proposed = proposed.normalized()?;
        let changes = Changeset::between(&proposed, &self.fields);
        let has_comment = comment.is_some_and(|text| !text.trim().is_empty());
        if changes.is_empty() && !has_comment {
            return Err(TrackerDomainError::NoChangesMade);
        }
        Ok((proposed, changes))
    }

    /// Returns `true` when `changes` moves the task to another status.
    #[must_use]
    pub fn changes_status(changes: &Changeset) -> bool {
        changes.get(ChangesetField::Status).is_some()
    }

    /// Applies cleaned fields as the next revision and returns its snapshot.
    pub fn apply_edit(
        &mut self,
        fields: TaskFields,
        comment: Option<String>,
        editor: UserId,
        clock: &impl Clock,
    ) -> TaskRevision {
        self.fields = fields;
        self.editor = editor;
        self.revision = self.revision.saturating_add(1);
        self.edited_at = clock.utc();
        TaskRevision::snapshot(self, comment)
    }

    /// Returns the creation snapshot (revision 0).
    #[must_use]
    pub fn initial_revision(&self) -> TaskRevision {
        TaskRevision::snapshot(self, None)
    }
}
