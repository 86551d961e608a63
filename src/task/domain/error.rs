//! Error types for task domain validation and parsing.

use super::{ReportedStatus, TaskId, TaskStatus};
use thiserror::Error;

/// Errors returned while constructing or mutating task domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task identifier is not a valid UUID.
    #[error("invalid task identifier '{0}'")]
    InvalidTaskId(String),

    /// The completion report carries no status.
    #[error("completion report status is required")]
    MissingReportedStatus,

    /// The completion report status is not `completed` or `failed`.
    #[error("invalid reported status '{0}', expected completed or failed")]
    InvalidReportedStatus(String),

    /// A citation URL is empty after trimming.
    #[error("citation at position {0} has an empty URL")]
    EmptyCitationUrl(usize),

    /// The report carries more citations than positions can address.
    #[error("too many citations: {0}")]
    TooManyCitations(usize),

    /// The task cannot be claimed from its current status.
    #[error("task {task_id} cannot be claimed from status {from}")]
    NotClaimable {
        /// Task identifier.
        task_id: TaskId,
        /// Current status.
        from: TaskStatus,
    },

    /// The report would move the task out of a terminal status.
    #[error("task {task_id} cannot be reported {to} from status {from}")]
    InvalidStatusTransition {
        /// Task identifier.
        task_id: TaskId,
        /// Current status.
        from: TaskStatus,
        /// Reported status.
        to: ReportedStatus,
    },
}

/// Error returned while parsing task statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);
