//! Diesel schema for tracker persistence.

diesel::table! {
    /// Workflow statuses per project.
    statuses (id) {
        /// Status identifier.
        id -> Uuid,
        /// Owning project.
        project_id -> Uuid,
        /// Display name, unique per project ignoring case.
        #[max_length = 64]
        name -> Varchar,
        /// Ordering position.
        position -> Int4,
        /// Whether tasks in this status count as resolved.
        is_resolved -> Bool,
        /// Whether new tasks may start in this status.
        is_initial -> Bool,
    }
}

diesel::table! {
    /// Allowed status changes.
    transitions (source_id, destination_id) {
        /// Status a task leaves.
        source_id -> Uuid,
        /// Status a task enters.
        destination_id -> Uuid,
    }
}

diesel::table! {
    /// Project components.
    components (id) {
        /// Component identifier.
        id -> Uuid,
        /// Owning project.
        project_id -> Uuid,
        /// Display name.
        #[max_length = 64]
        name -> Varchar,
        /// Free-text description.
        description -> Text,
    }
}

diesel::table! {
    /// Task types and priorities.
    labels (id) {
        /// Label identifier.
        id -> Uuid,
        /// Owning project.
        project_id -> Uuid,
        /// Label dimension (`task_type` or `priority`).
        #[max_length = 16]
        kind -> Varchar,
        /// Display name.
        #[max_length = 64]
        name -> Varchar,
        /// Ordering position.
        position -> Int4,
    }
}

diesel::table! {
    /// Project milestones.
    milestones (id) {
        /// Milestone identifier.
        id -> Uuid,
        /// Owning project.
        project_id -> Uuid,
        /// Display name.
        #[max_length = 64]
        name -> Varchar,
        /// Free-text description.
        description -> Text,
        /// Due date.
        deadline -> Date,
        /// Completion date.
        completed_on -> Nullable<Date>,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Current state of each task.
    tasks (pk) {
        /// Task primary key.
        pk -> Uuid,
        /// Owning project.
        project_id -> Uuid,
        /// Per-project sequential number.
        number -> Int8,
        /// Short summary.
        #[max_length = 64]
        summary -> Varchar,
        /// Long description.
        description -> Text,
        /// Current status.
        status_id -> Uuid,
        /// Component.
        component_id -> Uuid,
        /// Due date.
        deadline -> Nullable<Date>,
        /// Target milestone.
        milestone_id -> Nullable<Uuid>,
        /// Assigned user.
        owner_id -> Nullable<Uuid>,
        /// Priority label.
        priority_id -> Uuid,
        /// Task type label.
        task_type_id -> Uuid,
        /// Creating user.
        author_id -> Uuid,
        /// Latest editor.
        editor_id -> Uuid,
        /// Revision counter.
        revision -> Int4,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Latest edit timestamp.
        edited_at -> Timestamptz,
    }
}

diesel::table! {
    /// Immutable task snapshots.
    task_revisions (task_pk, revision) {
        /// Task the snapshot belongs to.
        task_pk -> Uuid,
        /// Revision number.
        revision -> Int4,
        /// Snapshot of the tracked fields as JSONB.
        fields -> Jsonb,
        /// Edit comment.
        comment -> Nullable<Text>,
        /// User who produced the revision.
        editor_id -> Uuid,
        /// Recording timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Explicit task watchers.
    task_watchers (task_pk, user_id) {
        /// Watched task.
        task_pk -> Uuid,
        /// Watching user.
        user_id -> Uuid,
    }
}

diesel::allow_tables_to_appear_in_same_query!(statuses, transitions);
