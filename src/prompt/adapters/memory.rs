//! In-memory prompt repository for tests and local runs.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::prompt::{
    domain::{Prompt, PromptId},
    ports::{PromptRepository, PromptRepositoryError, PromptRepositoryResult},
};

/// Thread-safe in-memory prompt repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPromptRepository {
    state: Arc<RwLock<HashMap<PromptId, Prompt>>>,
}

impl InMemoryPromptRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned(err: impl std::fmt::Display) -> PromptRepositoryError {
    PromptRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl PromptRepository for InMemoryPromptRepository {
    async fn store(&self, prompt: &Prompt) -> PromptRepositoryResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        if state.contains_key(&prompt.id()) {
            return Err(PromptRepositoryError::DuplicatePrompt(prompt.id()));
        }
        state.insert(prompt.id(), prompt.clone());
        Ok(())
    }

    async fn update(&self, prompt: &Prompt) -> PromptRepositoryResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        let slot = state
            .get_mut(&prompt.id())
            .ok_or(PromptRepositoryError::NotFound(prompt.id()))?;
        *slot = prompt.clone();
        Ok(())
    }

    async fn find_by_id(&self, id: PromptId) -> PromptRepositoryResult<Option<Prompt>> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state.get(&id).cloned())
    }

    async fn list_all(&self) -> PromptRepositoryResult<Vec<Prompt>> {
        let state = self.state.read().map_err(poisoned)?;
        let mut prompts: Vec<Prompt> = state.values().cloned().collect();
        prompts.sort_by_key(|prompt| (prompt.created_at(), prompt.id()));
        Ok(prompts)
    }

    async fn delete(&self, id: PromptId) -> PromptRepositoryResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        state
            .remove(&id)
            .map(|_| ())
            .ok_or(PromptRepositoryError::NotFound(id))
    }
}
