//! Diesel row models for the activity log.

use super::schema::actions;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Action row.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = actions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ActionRow {
    /// Entry identifier.
    pub id: uuid::Uuid,
    /// Project the entry belongs to.
    pub project_id: uuid::Uuid,
    /// Acting user.
    pub actor_id: Option<uuid::Uuid>,
    /// Verb text.
    pub verb: String,
    /// Linked object kind.
    pub target_kind: Option<String>,
    /// Linked object identifier.
    pub target_id: Option<uuid::Uuid>,
    /// Recording timestamp.
    pub created_at: DateTime<Utc>,
    /// Public flag.
    pub is_public: bool,
}
