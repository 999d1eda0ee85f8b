//! Diesel schema for permission grants.

diesel::table! {
    /// One row per `(project, grantee, permission)`.
    permission_grants (project_id, grantee_kind, grantee_id, permission) {
        /// Project the grant applies to.
        project_id -> Uuid,
        /// `user` or `group`.
        #[max_length = 16]
        grantee_kind -> Varchar,
        /// User or group identifier.
        grantee_id -> Uuid,
        /// Permission codename.
        #[max_length = 32]
        permission -> Varchar,
    }
}
