//! Diesel schema for task lifecycle persistence.

diesel::table! {
    /// Scheduled prompt executions.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Prompt executed by this task.
        prompt_id -> Uuid,
        /// Lifecycle status.
        #[max_length = 20]
        status -> Varchar,
        /// Time of the last completion report.
        last_run -> Nullable<Timestamptz>,
        /// Retry counter.
        retry_count -> Int4,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Evaluated outcomes of completed tasks, one per task.
    task_results (id) {
        /// Result identifier.
        id -> Uuid,
        /// Owning task.
        task_id -> Uuid,
        /// Raw response text.
        response_text -> Text,
        /// Brand score.
        brand_score -> Float8,
        /// Number of brand mentions.
        exposure_count -> Int4,
        /// Brand rank among all brands mentioned.
        exposure_rank -> Int4,
        /// Analysis report.
        analysis_report -> Text,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Source references attached to completed tasks.
    task_citations (id) {
        /// Citation identifier.
        id -> Uuid,
        /// Owning task.
        task_id -> Uuid,
        /// Cited URL.
        url -> Text,
        /// Cited title.
        title -> Nullable<Text>,
        /// Position within the report.
        position -> Int4,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::joinable!(task_results -> tasks (task_id));
diesel::joinable!(task_citations -> tasks (task_id));
diesel::allow_tables_to_appear_in_same_query!(tasks, task_results, task_citations);
