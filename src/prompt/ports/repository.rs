//! Repository port for prompt persistence.

use crate::prompt::domain::{Prompt, PromptId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for prompt repository operations.
pub type PromptRepositoryResult<T> = Result<T, PromptRepositoryError>;

/// Prompt persistence contract.
#[async_trait]
pub trait PromptRepository: Send + Sync {
    /// Stores a new prompt.
    ///
    /// # Errors
    ///
    /// Returns [`PromptRepositoryError::DuplicatePrompt`] when the identifier
    /// already exists.
    async fn store(&self, prompt: &Prompt) -> PromptRepositoryResult<()>;

    /// Persists an edited prompt.
    ///
    /// # Errors
    ///
    /// Returns [`PromptRepositoryError::NotFound`] when the prompt does not
    /// exist.
    async fn update(&self, prompt: &Prompt) -> PromptRepositoryResult<()>;

    /// Finds a prompt by identifier.
    ///
    /// Returns `None` when the prompt does not exist.
    async fn find_by_id(&self, id: PromptId) -> PromptRepositoryResult<Option<Prompt>>;

    /// Returns every prompt, oldest first.
    async fn list_all(&self) -> PromptRepositoryResult<Vec<Prompt>>;

    /// Deletes a prompt. Tasks referencing it are left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`PromptRepositoryError::NotFound`] when the prompt does not
    /// exist.
    async fn delete(&self, id: PromptId) -> PromptRepositoryResult<()>;
}

/// Errors returned by prompt repository implementations.
#[derive(Debug, Clone, Error)]
pub enum PromptRepositoryError {
    /// A prompt with the same identifier already exists.
    #[error("duplicate prompt identifier: {0}")]
    DuplicatePrompt(PromptId),

    /// The prompt was not found.
    #[error("prompt not found: {0}")]
    NotFound(PromptId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl PromptRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
