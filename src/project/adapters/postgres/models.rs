//! Diesel row models for project persistence.

use super::schema::{project_configs, project_memberships, project_teams, projects};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Project row.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = projects)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub struct ProjectRow {
    /// Project identifier.
    pub id: uuid::Uuid,
    /// Display name.
    pub name: String,
    /// URL slug.
    pub slug: String,
    /// Description.
    pub description: String,
    /// Category.
    pub category: Option<String>,
    /// Visibility code.
    pub visibility: String,
    /// Owning user.
    pub author_id: uuid::Uuid,
    /// Fork parent.
    pub parent_id: Option<uuid::Uuid>,
    /// Fork tree root.
    pub root_id: uuid::Uuid,
    /// Fork source location.
    pub fork_url: Option<String>,
    /// Repository backend alias.
    pub repository_alias: Option<String>,
    /// Repository location.
    pub repository_location: Option<String>,
    /// Setup state code.
    pub state: i16,
    /// Setup failure description.
    pub error_text: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Membership row.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = project_memberships)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct MembershipRow {
    /// Project joined.
    pub project_id: uuid::Uuid,
    /// Member account.
    pub user_id: uuid::Uuid,
    /// Join timestamp.
    pub joined_at: DateTime<Utc>,
}

/// Team row.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = project_teams)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TeamRow {
    /// Project joined.
    pub project_id: uuid::Uuid,
    /// Member group.
    pub group_id: uuid::Uuid,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Project configuration row.
#[derive(Debug, Clone, Copy, Queryable, Selectable, Insertable)]
#[diesel(table_name = project_configs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProjectConfigRow {
    /// Owning project.
    pub project_id: uuid::Uuid,
    /// Revisions per history page.
    pub changesets_paginate_by: i32,
    /// Default milestone deadline offset in days.
    pub milestone_deadline_delta_days: i32,
}
