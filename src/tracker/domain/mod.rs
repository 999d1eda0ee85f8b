//! Domain model for task tracking.
//!
//! Covers the per-project workflow entities (statuses, transitions,
//! components, task types, priorities, milestones), tasks with their
//! revision snapshots, and field-level changesets between snapshots.

mod changeset;
mod error;
mod graph;
mod ids;
mod report;
mod revision;
mod task;
mod workflow;

pub use changeset::{CHANGESET_FIELDS, Changeset, ChangesetField, FieldChange, FieldValue};
pub use error::{ParseLabelKindError, TrackerDomainError};
pub use graph::{DestinationChange, StatusGraph};
pub use ids::{ComponentId, LabelId, MilestoneId, StatusId, TaskNumber, TaskPk};
pub use report::{StatusCount, TaskReport};
pub use revision::TaskRevision;
pub use task::{PersistedTaskData, Task, TaskDraft, TaskFields};
pub use workflow::{Component, Label, LabelKind, Milestone, Status, Transition};
