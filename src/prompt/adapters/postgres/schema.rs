//! Diesel schema for prompt persistence.

diesel::table! {
    /// Prompt templates distributed by the daily task generator.
    prompts (id) {
        /// Prompt identifier.
        id -> Uuid,
        /// Prompt text.
        content -> Text,
        /// Grouping label.
        #[max_length = 50]
        category -> Varchar,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last edit timestamp.
        updated_at -> Timestamptz,
    }
}
