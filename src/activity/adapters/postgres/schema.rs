//! Diesel schema for the activity log.

diesel::table! {
    /// Append-only activity entries.
    actions (id) {
        /// Entry identifier.
        id -> Uuid,
        /// Project the entry belongs to.
        project_id -> Uuid,
        /// Acting user.
        actor_id -> Nullable<Uuid>,
        /// Verb text.
        #[max_length = 32]
        verb -> Varchar,
        /// Linked object kind.
        #[max_length = 16]
        target_kind -> Nullable<Varchar>,
        /// Linked object identifier.
        target_id -> Nullable<Uuid>,
        /// Recording timestamp.
        created_at -> Timestamptz,
        /// Whether the entry may appear in public feeds.
        is_public -> Bool,
    }
}
