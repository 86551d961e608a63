//! Task results, citations, and the completion record written atomically
//! with the task status change.

use super::{CitationId, ReportedStatus, TaskId, TaskResultId};
use crate::exposure::domain::ExposureEvaluation;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Evaluated outcome of a completed task. At most one exists per task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    id: TaskResultId,
    task_id: TaskId,
    response_text: String,
    brand_score: f64,
    exposure_count: i32,
    exposure_rank: i32,
    analysis_report: String,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task result.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedTaskResultData {
    /// Persisted result identifier.
    pub id: TaskResultId,
    /// Owning task identifier.
    pub task_id: TaskId,
    /// Raw response text.
    pub response_text: String,
    /// Brand score.
    pub brand_score: f64,
    /// Number of brand mentions.
    pub exposure_count: i32,
    /// Brand rank among all brands mentioned.
    pub exposure_rank: i32,
    /// Analysis report.
    pub analysis_report: String,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl TaskResult {
    /// Creates a result from the consumer's response and its evaluation.
    #[must_use]
    pub fn new(
        task_id: TaskId,
        response_text: impl Into<String>,
        evaluation: ExposureEvaluation,
        created_at: DateTime<Utc>,
    ) -> Self {
        let ExposureEvaluation {
            brand_score,
            exposure_count,
            exposure_rank,
            analysis,
        } = evaluation;
        Self {
            id: TaskResultId::new(),
            task_id,
            response_text: response_text.into(),
            brand_score,
            exposure_count,
            exposure_rank,
            analysis_report: analysis,
            created_at,
        }
    }

    /// Reconstructs a result from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskResultData) -> Self {
        Self {
            id: data.id,
            task_id: data.task_id,
            response_text: data.response_text,
            brand_score: data.brand_score,
            exposure_count: data.exposure_count,
            exposure_rank: data.exposure_rank,
            analysis_report: data.analysis_report,
            created_at: data.created_at,
        }
    }

    /// Returns the result identifier.
    #[must_use]
    pub const fn id(&self) -> TaskResultId {
        self.id
    }

    /// Returns the owning task identifier.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the raw response text reported by the consumer.
    #[must_use]
    pub fn response_text(&self) -> &str {
        &self.response_text
    }

    /// Returns the brand score.
    #[must_use]
    pub const fn brand_score(&self) -> f64 {
        self.brand_score
    }

    /// Returns the number of brand mentions.
    #[must_use]
    pub const fn exposure_count(&self) -> i32 {
        self.exposure_count
    }

    /// Returns the brand's rank among all brands mentioned.
    #[must_use]
    pub const fn exposure_rank(&self) -> i32 {
        self.exposure_rank
    }

    /// Returns the analysis report.
    #[must_use]
    pub fn analysis_report(&self) -> &str {
        &self.analysis_report
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Source reference attached to a completed task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    id: CitationId,
    task_id: TaskId,
    url: String,
    title: Option<String>,
    position: u32,
    created_at: DateTime<Utc>,
}

impl Citation {
    /// Creates a citation at `position` within its report.
    #[must_use]
    pub fn new(
        task_id: TaskId,
        url: impl Into<String>,
        title: Option<String>,
        position: u32,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: CitationId::new(),
            task_id,
            url: url.into(),
            title,
            position,
            created_at,
        }
    }

    /// Reconstructs a citation from persisted storage.
    #[must_use]
    pub const fn from_persisted(
        id: CitationId,
        task_id: TaskId,
        url: String,
        title: Option<String>,
        position: u32,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            task_id,
            url,
            title,
            position,
            created_at,
        }
    }

    /// Returns the citation identifier.
    #[must_use]
    pub const fn id(&self) -> CitationId {
        self.id
    }

    /// Returns the owning task identifier.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the cited URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the cited title, if reported.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Returns the zero-based position within its report.
    #[must_use]
    pub const fn position(&self) -> u32 {
        self.position
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Result and citations persisted with a `completed` report.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRecord {
    /// Evaluated result.
    pub result: TaskResult,
    /// Citations in report order.
    pub citations: Vec<Citation>,
}

/// Everything a repository must apply in one transaction to record a
/// completion report.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskCompletion {
    task_id: TaskId,
    status: ReportedStatus,
    reported_at: DateTime<Utc>,
    record: Option<CompletionRecord>,
}

impl TaskCompletion {
    /// Builds a `completed` report carrying its result and citations.
    #[must_use]
    pub const fn completed(
        task_id: TaskId,
        record: CompletionRecord,
        reported_at: DateTime<Utc>,
    ) -> Self {
        Self {
            task_id,
            status: ReportedStatus::Completed,
            reported_at,
            record: Some(record),
        }
    }

    /// Builds a `failed` report. Nothing besides the task row is written.
    #[must_use]
    pub const fn failed(task_id: TaskId, reported_at: DateTime<Utc>) -> Self {
        Self {
            task_id,
            status: ReportedStatus::Failed,
            reported_at,
            record: None,
        }
    }

    /// Returns the reported task identifier.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the reported status.
    #[must_use]
    pub const fn status(&self) -> ReportedStatus {
        self.status
    }

    /// Returns the report timestamp, written to `last_run`.
    #[must_use]
    pub const fn reported_at(&self) -> DateTime<Utc> {
        self.reported_at
    }

    /// Returns the result and citations, present for `completed` reports.
    #[must_use]
    pub const fn record(&self) -> Option<&CompletionRecord> {
        self.record.as_ref()
    }
}
