//! Task aggregate root and the status state machine.

use super::{ParseTaskStatusError, TaskDomainError, TaskId};
use crate::prompt::domain::PromptId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Task lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task has been generated and awaits a consumer.
    Pending,
    /// Task has been claimed by a consumer.
    Processing,
    /// Task has been reported as completed and owns a result.
    Completed,
    /// Task has been reported as failed.
    Failed,
}

impl TaskStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Returns `true` for statuses reached through a completion report.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Returns `true` when a completion report with `reported` status may be
    /// applied to a task in this status.
    ///
    /// Reports are accepted against `pending` and `processing` tasks. A
    /// failed task may be re-reported either way. A completed task only
    /// accepts another completion, which is then rejected by result
    /// uniqueness in storage.
    #[must_use]
    pub const fn accepts_report(self, reported: ReportedStatus) -> bool {
        !matches!((self, reported), (Self::Completed, ReportedStatus::Failed))
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            _ => Err(ParseTaskStatusError(value.to_owned())),
        }
    }
}

/// Status a consumer may report for a claimed task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportedStatus {
    /// The prompt produced a response.
    Completed,
    /// The consumer could not produce a response.
    Failed,
}

impl ReportedStatus {
    /// Parses the status string of a completion report.
    ///
    /// Matching is exact: only `completed` and `failed` are accepted.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::MissingReportedStatus`] for an empty value
    /// and [`TaskDomainError::InvalidReportedStatus`] for anything else.
    pub fn parse(value: &str) -> Result<Self, TaskDomainError> {
        match value {
            "" => Err(TaskDomainError::MissingReportedStatus),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(TaskDomainError::InvalidReportedStatus(other.to_owned())),
        }
    }

    /// Returns the canonical representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        self.into_status().as_str()
    }

    /// Returns the task status this report moves the task into.
    #[must_use]
    pub const fn into_status(self) -> TaskStatus {
        match self {
            Self::Completed => TaskStatus::Completed,
            Self::Failed => TaskStatus::Failed,
        }
    }
}

impl fmt::Display for ReportedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    prompt_id: PromptId,
    status: TaskStatus,
    last_run: Option<DateTime<Utc>>,
    retry_count: u32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Prompt this task executes.
    pub prompt_id: PromptId,
    /// Persisted lifecycle status.
    pub status: TaskStatus,
    /// Time of the last completion report, if any.
    pub last_run: Option<DateTime<Utc>>,
    /// Persisted retry counter.
    pub retry_count: u32,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest lifecycle timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a pending task for a prompt.
    #[must_use]
    pub fn new_for_prompt(prompt_id: PromptId, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: TaskId::new(),
            prompt_id,
            status: TaskStatus::Pending,
            last_run: None,
            retry_count: 0,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub const fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            prompt_id: data.prompt_id,
            status: data.status,
            last_run: data.last_run,
            retry_count: data.retry_count,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the prompt this task executes.
    #[must_use]
    pub const fn prompt_id(&self) -> PromptId {
        self.prompt_id
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the time of the last completion report.
    #[must_use]
    pub const fn last_run(&self) -> Option<DateTime<Utc>> {
        self.last_run
    }

    /// Returns the retry counter. Nothing increments it yet.
    #[must_use]
    pub const fn retry_count(&self) -> u32 {
        self.retry_count
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest lifecycle timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Moves a pending task to `processing`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::NotClaimable`] unless the task is pending.
    pub fn mark_processing(&mut self, at: DateTime<Utc>) -> Result<(), TaskDomainError> {
        if self.status != TaskStatus::Pending {
            return Err(TaskDomainError::NotClaimable {
                task_id: self.id,
                from: self.status,
            });
        }
        self.status = TaskStatus::Processing;
        self.updated_at = at;
        Ok(())
    }

    /// Applies a completion report, stamping `last_run` with `at`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidStatusTransition`] when the current
    /// status does not accept the report.
    pub fn apply_report(
        &mut self,
        reported: ReportedStatus,
        at: DateTime<Utc>,
    ) -> Result<(), TaskDomainError> {
        if !self.status.accepts_report(reported) {
            return Err(TaskDomainError::InvalidStatusTransition {
                task_id: self.id,
                from: self.status,
                to: reported,
            });
        }
        self.status = reported.into_status();
        self.last_run = Some(at);
        self.updated_at = at;
        Ok(())
    }
}
