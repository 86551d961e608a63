//! Domain model for the task lifecycle.
//!
//! A task is one scheduled execution of a prompt. Its status moves from
//! `pending` to `processing` when claimed and then to `completed` or `failed`
//! when the consumer reports back. A completed task owns exactly one
//! [`TaskResult`] and any number of [`Citation`]s.

mod error;
mod ids;
mod result;
mod task;

pub use error::{ParseTaskStatusError, TaskDomainError};
pub use ids::{CitationId, TaskId, TaskResultId};
pub use result::{Citation, CompletionRecord, PersistedTaskResultData, TaskCompletion, TaskResult};
pub use task::{PersistedTaskData, ReportedStatus, Task, TaskStatus};
