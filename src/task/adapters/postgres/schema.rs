//! Diesel schema for task persistence.

diesel::table! {
    /// Task records, one row per occurrence.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Owning user.
        owner_id -> Uuid,
        /// Task title.
        #[max_length = 200]
        title -> Varchar,
        /// Optional free-form description.
        description -> Nullable<Text>,
        /// Workflow status.
        #[max_length = 20]
        status -> Varchar,
        /// Priority.
        #[max_length = 20]
        priority -> Varchar,
        /// Optional due date.
        due_date -> Nullable<Timestamptz>,
        /// Recurrence pattern.
        #[max_length = 10]
        recurrence_pattern -> Varchar,
        /// Completions required per period; null means unlimited.
        times_per_period -> Nullable<Int4>,
        /// Completions recorded in the current period.
        current_period_count -> Int4,
        /// First day of the current period.
        period_start_date -> Nullable<Date>,
        /// Root task of the recurrence chain.
        parent_task_id -> Nullable<Uuid>,
        /// History mode flag.
        keep_history -> Bool,
        /// Soft-delete timestamp.
        deleted_at -> Nullable<Timestamptz>,
        /// Optimistic concurrency revision.
        revision -> Int8,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Tag associations of tasks.
    task_tags (task_id, tag_id) {
        /// Tagged task.
        task_id -> Uuid,
        /// Attached tag.
        tag_id -> Uuid,
    }
}

diesel::joinable!(task_tags -> tasks (task_id));
diesel::allow_tables_to_appear_in_same_query!(tasks, task_tags);
