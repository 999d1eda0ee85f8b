//! Diesel schema for project persistence.

diesel::table! {
    /// Projects and their setup state.
    projects (id) {
        /// Project identifier.
        id -> Uuid,
        /// Display name, unique per author ignoring case.
        #[max_length = 64]
        name -> Varchar,
        /// URL slug derived from the name.
        #[max_length = 128]
        slug -> Varchar,
        /// Free-text description.
        description -> Text,
        /// Optional category label.
        category -> Nullable<Text>,
        /// `public` or `private`.
        #[max_length = 16]
        visibility -> Varchar,
        /// Owning user.
        author_id -> Uuid,
        /// Fork parent.
        parent_id -> Nullable<Uuid>,
        /// Fork tree root; equals `id` for root projects.
        root_id -> Uuid,
        /// Repository location the fork was cloned from.
        fork_url -> Nullable<Text>,
        /// Repository backend alias.
        #[max_length = 16]
        repository_alias -> Nullable<Varchar>,
        /// Repository location.
        repository_location -> Nullable<Text>,
        /// Setup state code.
        state -> Int2,
        /// Description of the last setup failure.
        error_text -> Nullable<Text>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Project memberships.
    project_memberships (project_id, user_id) {
        /// Project joined.
        project_id -> Uuid,
        /// Member account.
        user_id -> Uuid,
        /// Join timestamp.
        joined_at -> Timestamptz,
    }
}

diesel::table! {
    /// Groups promoted to project teams.
    project_teams (project_id, group_id) {
        /// Project joined.
        project_id -> Uuid,
        /// Member group.
        group_id -> Uuid,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// One configuration record per project.
    project_configs (project_id) {
        /// Owning project.
        project_id -> Uuid,
        /// Revisions per history page.
        changesets_paginate_by -> Int4,
        /// Default milestone deadline offset in days.
        milestone_deadline_delta_days -> Int4,
    }
}

diesel::allow_tables_to_appear_in_same_query!(projects, project_memberships, project_teams);
