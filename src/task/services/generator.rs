//! Daily task generation: one pending task per stored prompt.

use crate::error::FailureKind;
use crate::prompt::{
    domain::PromptId,
    ports::{PromptRepository, PromptRepositoryError},
};
use crate::task::{
    domain::{Task, TaskId},
    ports::TaskRepository,
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Outcome of one generation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskGenerationReport {
    created: Vec<TaskId>,
    failed: Vec<PromptId>,
}

impl TaskGenerationReport {
    /// Returns the tasks created by this run.
    #[must_use]
    pub fn created(&self) -> &[TaskId] {
        &self.created
    }

    /// Returns the prompts whose task could not be stored.
    #[must_use]
    pub fn failed(&self) -> &[PromptId] {
        &self.failed
    }

    /// Returns `true` when every prompt received a task.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Errors that abort a generation run.
#[derive(Debug, Error)]
pub enum TaskGenerationError {
    /// The prompt catalogue could not be read.
    #[error("failed to list prompts: {0}")]
    PromptListing(#[from] PromptRepositoryError),
}

impl TaskGenerationError {
    /// Classifies the failure for callers at the system edge.
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::PromptListing(_) => FailureKind::Internal,
        }
    }
}

/// Result type for generation runs.
pub type TaskGenerationResult<T> = Result<T, TaskGenerationError>;

/// Creates the daily batch of pending tasks.
#[derive(Clone)]
pub struct TaskGenerator<T, P, C>
where
    T: TaskRepository,
    P: PromptRepository,
    C: Clock + Send + Sync,
{
    tasks: Arc<T>,
    prompts: Arc<P>,
    clock: Arc<C>,
}

impl<T, P, C> TaskGenerator<T, P, C>
where
    T: TaskRepository,
    P: PromptRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new generator.
    #[must_use]
    pub const fn new(tasks: Arc<T>, prompts: Arc<P>, clock: Arc<C>) -> Self {
        Self {
            tasks,
            prompts,
            clock,
        }
    }

    /// Creates one pending task for every stored prompt.
    ///
    /// Each insert stands alone: a failure is logged, recorded in the report,
    /// and does not stop the remaining prompts.
    ///
    /// # Errors
    ///
    /// Returns [`TaskGenerationError::PromptListing`] when the prompt
    /// catalogue cannot be read. No task is created in that case.
    pub async fn generate_daily_tasks(&self) -> TaskGenerationResult<TaskGenerationReport> {
        info!("starting daily task generation");
        let prompts = self.prompts.list_all().await?;

        let mut report = TaskGenerationReport::default();
        for prompt in prompts {
            let task = Task::new_for_prompt(prompt.id(), &*self.clock);
            match self.tasks.store(&task).await {
                Ok(()) => report.created.push(task.id()),
                Err(err) => {
                    warn!(prompt_id = %prompt.id(), error = %err, "failed to create task for prompt");
                    report.failed.push(prompt.id());
                }
            }
        }

        info!(
            created = report.created.len(),
            failed = report.failed.len(),
            "daily task generation finished"
        );
        Ok(report)
    }
}
