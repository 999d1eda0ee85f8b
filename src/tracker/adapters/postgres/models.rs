//! Diesel row models for tracker persistence.

use super::schema::{
    components, labels, milestones, statuses, task_revisions, task_watchers, tasks, transitions,
};
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Status row.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = statuses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct StatusRow {
    /// Status identifier.
    pub id: uuid::Uuid,
    /// Owning project.
    pub project_id: uuid::Uuid,
    /// Display name.
    pub name: String,
    /// Ordering position.
    pub position: i32,
    /// Resolved flag.
    pub is_resolved: bool,
    /// Initial flag.
    pub is_initial: bool,
}

/// Transition row.
#[derive(Debug, Clone, Copy, Queryable, Selectable, Insertable)]
#[diesel(table_name = transitions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TransitionRow {
    /// Source status.
    pub source_id: uuid::Uuid,
    /// Destination status.
    pub destination_id: uuid::Uuid,
}

/// Component row.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = components)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ComponentRow {
    /// Component identifier.
    pub id: uuid::Uuid,
    /// Owning project.
    pub project_id: uuid::Uuid,
    /// Display name.
    pub name: String,
    /// Free-text description.
    pub description: String,
}

/// Task type or priority row.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = labels)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct LabelRow {
    /// Label identifier.
    pub id: uuid::Uuid,
    /// Owning project.
    pub project_id: uuid::Uuid,
    /// Label dimension.
    pub kind: String,
    /// Display name.
    pub name: String,
    /// Ordering position.
    pub position: i32,
}

/// Milestone row.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = milestones)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub struct MilestoneRow {
    /// Milestone identifier.
    pub id: uuid::Uuid,
    /// Owning project.
    pub project_id: uuid::Uuid,
    /// Display name.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Due date.
    pub deadline: NaiveDate,
    /// Completion date.
    pub completed_on: Option<NaiveDate>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Task row.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub struct TaskRow {
    /// Task primary key.
    pub pk: uuid::Uuid,
    /// Owning project.
    pub project_id: uuid::Uuid,
    /// Per-project number.
    pub number: i64,
    /// Short summary.
    pub summary: String,
    /// Long description.
    pub description: String,
    /// Current status.
    pub status_id: uuid::Uuid,
    /// Component.
    pub component_id: uuid::Uuid,
    /// Due date.
    pub deadline: Option<NaiveDate>,
    /// Target milestone.
    pub milestone_id: Option<uuid::Uuid>,
    /// Assigned user.
    pub owner_id: Option<uuid::Uuid>,
    /// Priority label.
    pub priority_id: uuid::Uuid,
    /// Task type label.
    pub task_type_id: uuid::Uuid,
    /// Creating user.
    pub author_id: uuid::Uuid,
    /// Latest editor.
    pub editor_id: uuid::Uuid,
    /// Revision counter.
    pub revision: i32,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Latest edit timestamp.
    pub edited_at: DateTime<Utc>,
}

/// Task revision row.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = task_revisions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRevisionRow {
    /// Task the snapshot belongs to.
    pub task_pk: uuid::Uuid,
    /// Revision number.
    pub revision: i32,
    /// Snapshot of the tracked fields.
    pub fields: Value,
    /// Edit comment.
    pub comment: Option<String>,
    /// User who produced the revision.
    pub editor_id: uuid::Uuid,
    /// Recording timestamp.
    pub created_at: DateTime<Utc>,
}

/// Watcher row.
#[derive(Debug, Clone, Copy, Queryable, Selectable, Insertable)]
#[diesel(table_name = task_watchers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskWatcherRow {
    /// Watched task.
    pub task_pk: uuid::Uuid,
    /// Watching user.
    pub user_id: uuid::Uuid,
}
