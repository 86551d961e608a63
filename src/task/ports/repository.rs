//! Repository port for task persistence, claiming, and completion recording.

use crate::error::FailureKind;
use crate::task::domain::{
    Citation, Task, TaskCompletion, TaskDomainError, TaskId, TaskResult, TaskStatus,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Task persistence contract.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateTask`] when the task ID already
    /// exists.
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Finds a task by identifier.
    ///
    /// Returns `None` when the task does not exist.
    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>>;

    /// Returns every task in `status`, oldest first.
    async fn find_by_status(&self, status: TaskStatus) -> TaskRepositoryResult<Vec<Task>>;

    /// Atomically moves every pending task to `processing` and returns the
    /// claimed tasks, oldest first.
    ///
    /// Concurrent callers never receive the same task.
    async fn claim_pending(&self, claimed_at: DateTime<Utc>) -> TaskRepositoryResult<Vec<Task>>;

    /// Applies a completion report in one transaction: the status change,
    /// `last_run`, and for `completed` reports the result and its citations.
    ///
    /// Nothing is written when any step fails. Returns the updated task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not
    /// exist, [`TaskRepositoryError::Transition`] when its status rejects the
    /// report, and [`TaskRepositoryError::DuplicateResult`] when a result is
    /// already stored for the task.
    async fn record_completion(&self, completion: &TaskCompletion) -> TaskRepositoryResult<Task>;

    /// Finds the result stored for a task.
    async fn find_result(&self, task_id: TaskId) -> TaskRepositoryResult<Option<TaskResult>>;

    /// Returns the citations stored for a task in report order.
    async fn find_citations(&self, task_id: TaskId) -> TaskRepositoryResult<Vec<Citation>>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// A result is already stored for the task.
    #[error("result already recorded for task {0}")]
    DuplicateResult(TaskId),

    /// The task's current status rejects the report.
    #[error(transparent)]
    Transition(TaskDomainError),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }

    /// Classifies the failure for callers at the system edge.
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::NotFound(_) => FailureKind::NotFound,
            Self::DuplicateTask(_) | Self::DuplicateResult(_) | Self::Transition(_) => {
                FailureKind::Conflict
            }
            Self::Persistence(_) => FailureKind::Internal,
        }
    }
}
