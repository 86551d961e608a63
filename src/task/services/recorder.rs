//! Completion reports: evaluation, fallback, and atomic persistence.

use crate::error::FailureKind;
use crate::exposure::{domain::ExposureEvaluation, ports::ExposureEvaluator};
use crate::task::{
    domain::{
        Citation, CompletionRecord, ReportedStatus, Task, TaskCompletion, TaskDomainError,
        TaskId, TaskResult,
    },
    ports::{TaskRepository, TaskRepositoryError},
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// A source reference reported with a completed task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CitationInput {
    url: String,
    title: Option<String>,
}

impl CitationInput {
    /// Creates a citation with the required URL.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: None,
        }
    }

    /// Sets the cited title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Completion report sent by a consumer for a claimed task.
///
/// The score and analysis are used only when exposure evaluation fails.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionReportRequest {
    status: String,
    response_text: String,
    brand_score: Option<f64>,
    analysis: Option<String>,
    citations: Vec<CitationInput>,
}

impl CompletionReportRequest {
    /// Creates a report with the raw status string (`completed` or
    /// `failed`).
    #[must_use]
    pub fn new(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            ..Self::default()
        }
    }

    /// Sets the model response text.
    #[must_use]
    pub fn with_response_text(mut self, response_text: impl Into<String>) -> Self {
        self.response_text = response_text.into();
        self
    }

    /// Sets the fallback brand score.
    #[must_use]
    pub const fn with_brand_score(mut self, brand_score: f64) -> Self {
        self.brand_score = Some(brand_score);
        self
    }

    /// Sets the fallback analysis text.
    #[must_use]
    pub fn with_analysis(mut self, analysis: impl Into<String>) -> Self {
        self.analysis = Some(analysis.into());
        self
    }

    /// Appends a citation. Order is preserved.
    #[must_use]
    pub fn with_citation(mut self, citation: CitationInput) -> Self {
        self.citations.push(citation);
        self
    }

    /// Replaces the citations.
    #[must_use]
    pub fn with_citations(mut self, citations: impl IntoIterator<Item = CitationInput>) -> Self {
        self.citations = citations.into_iter().collect();
        self
    }

    fn fallback_evaluation(&self) -> ExposureEvaluation {
        ExposureEvaluation {
            brand_score: self.brand_score.unwrap_or_default(),
            exposure_count: 0,
            exposure_rank: 0,
            analysis: self.analysis.clone().unwrap_or_default(),
        }
    }
}

/// Service-level errors for completion reports.
#[derive(Debug, Error)]
pub enum TaskResultError {
    /// The report is malformed or the task's status rejects it.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),
    /// No task exists with the given identifier.
    #[error("task {0} not found")]
    NotFound(TaskId),
    /// The write transaction failed and was rolled back.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),
}

impl TaskResultError {
    /// Classifies the failure for callers at the system edge.
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::Domain(TaskDomainError::InvalidStatusTransition { .. }) => FailureKind::Conflict,
            Self::Domain(_) => FailureKind::Validation,
            Self::NotFound(_) => FailureKind::NotFound,
            Self::Repository(err) => err.kind(),
        }
    }
}

/// Result type for completion reports.
pub type TaskResultResult<T> = Result<T, TaskResultError>;

/// Records completion reports for claimed tasks.
#[derive(Clone)]
pub struct TaskResultRecorder<T, E, C>
where
    T: TaskRepository,
    E: ExposureEvaluator,
    C: Clock + Send + Sync,
{
    tasks: Arc<T>,
    evaluator: Arc<E>,
    clock: Arc<C>,
}

impl<T, E, C> TaskResultRecorder<T, E, C>
where
    T: TaskRepository,
    E: ExposureEvaluator,
    C: Clock + Send + Sync,
{
    /// Creates a new recorder.
    #[must_use]
    pub const fn new(tasks: Arc<T>, evaluator: Arc<E>, clock: Arc<C>) -> Self {
        Self {
            tasks,
            evaluator,
            clock,
        }
    }

    /// Records a completion report and returns the updated task.
    ///
    /// A `completed` report is scored by the exposure evaluator before the
    /// write transaction opens. Evaluation failures are logged and replaced
    /// by the report's own score and analysis; they never fail the report.
    /// The status change, result, and citations then commit together.
    ///
    /// # Errors
    ///
    /// Returns [`TaskResultError::Domain`] for a malformed report or a
    /// status that rejects it, [`TaskResultError::NotFound`] when the task
    /// does not exist, and [`TaskResultError::Repository`] when the write
    /// transaction fails (including a second `completed` report). Nothing is
    /// persisted in any error case.
    pub async fn record_task_result(
        &self,
        task_id: TaskId,
        report: CompletionReportRequest,
    ) -> TaskResultResult<Task> {
        let reported = ReportedStatus::parse(&report.status)?;
        if let Some(position) = report
            .citations
            .iter()
            .position(|citation| citation.url.trim().is_empty())
        {
            return Err(TaskDomainError::EmptyCitationUrl(position).into());
        }

        let task = self
            .tasks
            .find_by_id(task_id)
            .await?
            .ok_or(TaskResultError::NotFound(task_id))?;
        if !task.status().accepts_report(reported) {
            return Err(TaskDomainError::InvalidStatusTransition {
                task_id,
                from: task.status(),
                to: reported,
            }
            .into());
        }

        let reported_at = self.clock.utc();
        let completion = match reported {
            ReportedStatus::Failed => TaskCompletion::failed(task_id, reported_at),
            ReportedStatus::Completed => {
                // Storage uniqueness still decides races; this only skips a
                // billed evaluator call for an obvious repeat.
                if self.tasks.find_result(task_id).await?.is_some() {
                    return Err(TaskRepositoryError::DuplicateResult(task_id).into());
                }
                let evaluation = self.evaluate_or_fallback(task_id, &report).await;
                let record = build_record(task_id, report, evaluation, reported_at)?;
                TaskCompletion::completed(task_id, record, reported_at)
            }
        };

        let updated = self
            .tasks
            .record_completion(&completion)
            .await
            .map_err(|err| match err {
                TaskRepositoryError::NotFound(id) => TaskResultError::NotFound(id),
                other => TaskResultError::Repository(other),
            })?;
        info!(task_id = %task_id, status = %reported, "recorded task completion");
        Ok(updated)
    }

    async fn evaluate_or_fallback(
        &self,
        task_id: TaskId,
        report: &CompletionReportRequest,
    ) -> ExposureEvaluation {
        match self.evaluator.evaluate(&report.response_text).await {
            Ok(evaluation) => evaluation,
            Err(err) => {
                warn!(
                    task_id = %task_id,
                    error = %err,
                    "exposure evaluation failed, using reported score"
                );
                report.fallback_evaluation()
            }
        }
    }
}

fn build_record(
    task_id: TaskId,
    report: CompletionReportRequest,
    evaluation: ExposureEvaluation,
    created_at: DateTime<Utc>,
) -> TaskResultResult<CompletionRecord> {
    let citations = report
        .citations
        .into_iter()
        .enumerate()
        .map(|(index, citation)| {
            let position = u32::try_from(index)
                .map_err(|_| TaskDomainError::TooManyCitations(index))?;
            Ok(Citation::new(
                task_id,
                citation.url,
                citation.title,
                position,
                created_at,
            ))
        })
        .collect::<TaskResultResult<Vec<_>>>()?;
    let result = TaskResult::new(task_id, report.response_text, evaluation, created_at);
    Ok(CompletionRecord { result, citations })
}
