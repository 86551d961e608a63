//! In-memory repository for task lifecycle tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::task::{
    domain::{Citation, Task, TaskCompletion, TaskId, TaskResult, TaskStatus},
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};

/// Thread-safe in-memory task repository.
///
/// Claims and completions run under a single write lock, so each one is
/// observed atomically by concurrent callers.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    state: Arc<RwLock<InMemoryTaskState>>,
}

#[derive(Debug, Default)]
struct InMemoryTaskState {
    tasks: HashMap<TaskId, Task>,
    results: HashMap<TaskId, TaskResult>,
    citations: HashMap<TaskId, Vec<Citation>>,
}

impl InMemoryTaskRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned(err: impl std::fmt::Display) -> TaskRepositoryError {
    TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

fn sorted_oldest_first(mut tasks: Vec<Task>) -> Vec<Task> {
    tasks.sort_by_key(|task| (task.created_at(), task.id()));
    tasks
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        if state.tasks.contains_key(&task.id()) {
            return Err(TaskRepositoryError::DuplicateTask(task.id()));
        }
        state.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn find_by_status(&self, status: TaskStatus) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.state.read().map_err(poisoned)?;
        let tasks = state
            .tasks
            .values()
            .filter(|task| task.status() == status)
            .cloned()
            .collect();
        Ok(sorted_oldest_first(tasks))
    }

    async fn claim_pending(&self, claimed_at: DateTime<Utc>) -> TaskRepositoryResult<Vec<Task>> {
        let mut state = self.state.write().map_err(poisoned)?;
        let mut claimed = Vec::new();
        for task in state.tasks.values_mut() {
            if task.status() == TaskStatus::Pending {
                task.mark_processing(claimed_at)
                    .map_err(TaskRepositoryError::Transition)?;
                claimed.push(task.clone());
            }
        }
        Ok(sorted_oldest_first(claimed))
    }

    async fn record_completion(&self, completion: &TaskCompletion) -> TaskRepositoryResult<Task> {
        let task_id = completion.task_id();
        let mut state = self.state.write().map_err(poisoned)?;

        let mut task = state
            .tasks
            .get(&task_id)
            .cloned()
            .ok_or(TaskRepositoryError::NotFound(task_id))?;
        task.apply_report(completion.status(), completion.reported_at())
            .map_err(TaskRepositoryError::Transition)?;
        if completion.record().is_some() && state.results.contains_key(&task_id) {
            return Err(TaskRepositoryError::DuplicateResult(task_id));
        }

        // All checks passed; commit.
        if let Some(record) = completion.record() {
            state.results.insert(task_id, record.result.clone());
            state
                .citations
                .entry(task_id)
                .or_default()
                .extend(record.citations.iter().cloned());
        }
        state.tasks.insert(task_id, task.clone());
        Ok(task)
    }

    async fn find_result(&self, task_id: TaskId) -> TaskRepositoryResult<Option<TaskResult>> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state.results.get(&task_id).cloned())
    }

    async fn find_citations(&self, task_id: TaskId) -> TaskRepositoryResult<Vec<Citation>> {
        let state = self.state.read().map_err(poisoned)?;
        let mut citations = state.citations.get(&task_id).cloned().unwrap_or_default();
        citations.sort_by_key(Citation::position);
        Ok(citations)
    }
}
