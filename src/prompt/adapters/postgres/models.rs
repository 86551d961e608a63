//! Diesel row models for prompt persistence.

use super::schema::prompts;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for prompt records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = prompts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PromptRow {
    /// Prompt identifier.
    pub id: uuid::Uuid,
    /// Prompt text.
    pub content: String,
    /// Grouping label.
    pub category: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last edit timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for prompt records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = prompts)]
pub struct NewPromptRow {
    /// Prompt identifier.
    pub id: uuid::Uuid,
    /// Prompt text.
    pub content: String,
    /// Grouping label.
    pub category: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last edit timestamp.
    pub updated_at: DateTime<Utc>,
}
