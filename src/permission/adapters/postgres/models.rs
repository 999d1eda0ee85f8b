//! Diesel row models for permission grants.

use super::schema::permission_grants;
use diesel::prelude::*;

/// Grant row.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = permission_grants)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct GrantRow {
    /// Project the grant applies to.
    pub project_id: uuid::Uuid,
    /// `user` or `group`.
    pub grantee_kind: String,
    /// User or group identifier.
    pub grantee_id: uuid::Uuid,
    /// Permission codename.
    pub permission: String,
}
