//! Diesel row models for task persistence.

use super::schema::{task_citations, task_results, tasks};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for task records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Prompt identifier.
    pub prompt_id: uuid::Uuid,
    /// Lifecycle status.
    pub status: String,
    /// Time of the last completion report.
    pub last_run: Option<DateTime<Utc>>,
    /// Retry counter.
    pub retry_count: i32,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for task records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tasks)]
pub struct NewTaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Prompt identifier.
    pub prompt_id: uuid::Uuid,
    /// Lifecycle status.
    pub status: String,
    /// Time of the last completion report.
    pub last_run: Option<DateTime<Utc>>,
    /// Retry counter.
    pub retry_count: i32,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Row model for task results, used for both reads and inserts.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = task_results)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskResultRow {
    /// Result identifier.
    pub id: uuid::Uuid,
    /// Owning task.
    pub task_id: uuid::Uuid,
    /// Raw response text.
    pub response_text: String,
    /// Brand score.
    pub brand_score: f64,
    /// Number of brand mentions.
    pub exposure_count: i32,
    /// Brand rank.
    pub exposure_rank: i32,
    /// Analysis report.
    pub analysis_report: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Row model for citations, used for both reads and inserts.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = task_citations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CitationRow {
    /// Citation identifier.
    pub id: uuid::Uuid,
    /// Owning task.
    pub task_id: uuid::Uuid,
    /// Cited URL.
    pub url: String,
    /// Cited title.
    pub title: Option<String>,
    /// Position within the report.
    pub position: i32,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}
