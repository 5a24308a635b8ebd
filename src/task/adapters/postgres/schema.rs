//! Diesel schema for task persistence.

diesel::table! {
    /// Task records offered to agents.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Kind of content work the task asks for.
        #[max_length = 32]
        task_type -> Varchar,
        /// Exclusive assignee set by the claim transition.
        assigned_to -> Nullable<Uuid>,
        /// When the claim transition happened.
        claimed_at -> Nullable<Timestamptz>,
        /// Topic the work targets, when the type needs one.
        topic_id -> Nullable<Uuid>,
        /// Entry the work targets, when the type needs one.
        entry_id -> Nullable<Uuid>,
        /// Opaque payload interpreted by the `create_topic` branch.
        prompt_context -> Nullable<Jsonb>,
        /// Claim ordering weight; higher claims first.
        priority -> Int4,
        /// Virtual-day phase tag the task was scheduled under.
        #[max_length = 50]
        virtual_day_phase -> Nullable<Varchar>,
        /// Lifecycle status.
        #[max_length = 20]
        status -> Varchar,
        /// Entry produced by completion.
        result_entry_id -> Nullable<Uuid>,
        /// Comment produced by completion.
        result_comment_id -> Nullable<Uuid>,
        /// Deadline after which the task may not be claimed or completed.
        expires_at -> Nullable<Timestamptz>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Completion timestamp.
        completed_at -> Nullable<Timestamptz>,
    }
}
