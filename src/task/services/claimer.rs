//! Bulk claiming of pending tasks by an external consumer.

use crate::error::FailureKind;
use crate::prompt::{
    domain::{Prompt, PromptId},
    ports::{PromptRepository, PromptRepositoryError},
};
use crate::task::{
    domain::Task,
    ports::{TaskRepository, TaskRepositoryError},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Why a claimed task carries no prompt.
#[derive(Debug, Clone, Error)]
pub enum ClaimedPromptError {
    /// The prompt was deleted after the task was generated.
    #[error("prompt {0} not found")]
    PromptNotFound(PromptId),
    /// The prompt lookup failed.
    #[error(transparent)]
    Lookup(PromptRepositoryError),
}

/// A task moved to `processing`, paired with the prompt it executes.
#[derive(Debug, Clone)]
pub struct ClaimedTask {
    task: Task,
    prompt: Result<Prompt, ClaimedPromptError>,
}

impl ClaimedTask {
    /// Returns the claimed task.
    #[must_use]
    pub const fn task(&self) -> &Task {
        &self.task
    }

    /// Returns the task's prompt, or why it could not be loaded.
    ///
    /// # Errors
    ///
    /// Returns the [`ClaimedPromptError`] recorded at claim time.
    pub const fn prompt(&self) -> Result<&Prompt, &ClaimedPromptError> {
        self.prompt.as_ref()
    }

    /// Splits the claim into its task and prompt lookup outcome.
    #[must_use]
    pub fn into_parts(self) -> (Task, Result<Prompt, ClaimedPromptError>) {
        (self.task, self.prompt)
    }
}

/// Errors returned while claiming tasks.
#[derive(Debug, Error)]
pub enum TaskClaimError {
    /// The claim transaction failed; nothing was claimed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),
}

impl TaskClaimError {
    /// Classifies the failure for callers at the system edge.
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::Repository(err) => err.kind(),
        }
    }
}

/// Result type for claim operations.
pub type TaskClaimResult<T> = Result<T, TaskClaimError>;

/// Hands pending tasks to consumers.
#[derive(Clone)]
pub struct TaskClaimer<T, P, C>
where
    T: TaskRepository,
    P: PromptRepository,
    C: Clock + Send + Sync,
{
    tasks: Arc<T>,
    prompts: Arc<P>,
    clock: Arc<C>,
}

impl<T, P, C> TaskClaimer<T, P, C>
where
    T: TaskRepository,
    P: PromptRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new claimer.
    #[must_use]
    pub const fn new(tasks: Arc<T>, prompts: Arc<P>, clock: Arc<C>) -> Self {
        Self {
            tasks,
            prompts,
            clock,
        }
    }

    /// Claims every pending task, oldest first.
    ///
    /// Prompts are loaded after the claim commits. A missing prompt is
    /// reported on its own task and does not fail the batch.
    ///
    /// # Errors
    ///
    /// Returns [`TaskClaimError::Repository`] when the claim transaction
    /// fails.
    pub async fn claim_pending_tasks(&self) -> TaskClaimResult<Vec<ClaimedTask>> {
        let tasks = self.tasks.claim_pending(self.clock.utc()).await?;
        debug!(claimed = tasks.len(), "claimed pending tasks");

        let mut claimed = Vec::with_capacity(tasks.len());
        for task in tasks {
            let prompt = self.load_prompt(&task).await;
            claimed.push(ClaimedTask { task, prompt });
        }
        Ok(claimed)
    }

    async fn load_prompt(&self, task: &Task) -> Result<Prompt, ClaimedPromptError> {
        let prompt_id = task.prompt_id();
        let prompt = match self.prompts.find_by_id(prompt_id).await {
            Ok(Some(prompt)) => Ok(prompt),
            Ok(None) => Err(ClaimedPromptError::PromptNotFound(prompt_id)),
            Err(err) => Err(ClaimedPromptError::Lookup(err)),
        };
        if let Err(err) = &prompt {
            warn!(task_id = %task.id(), error = %err, "claimed task has no prompt");
        }
        prompt
    }
}
