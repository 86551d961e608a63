//! Service layer for prompt CRUD.

use crate::error::FailureKind;
use crate::prompt::{
    domain::{Prompt, PromptCategory, PromptContent, PromptDomainError, PromptId},
    ports::{PromptRepository, PromptRepositoryError},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Request payload for creating a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePromptRequest {
    content: String,
    category: Option<String>,
}

impl CreatePromptRequest {
    /// Creates a request with the required prompt text.
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            category: None,
        }
    }

    /// Sets the prompt category. Defaults to `default` when unset.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

/// Request payload for editing a prompt. Unset fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdatePromptRequest {
    content: Option<String>,
    category: Option<String>,
}

impl UpdatePromptRequest {
    /// Creates an empty edit.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the prompt text.
    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Replaces the prompt category.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

/// Service-level errors for prompt catalogue operations.
#[derive(Debug, Error)]
pub enum PromptCatalogError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] PromptDomainError),
    /// No prompt exists with the given identifier.
    #[error("prompt {0} not found")]
    NotFound(PromptId),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] PromptRepositoryError),
}

impl PromptCatalogError {
    /// Classifies the failure for callers at the system edge.
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::Domain(_) => FailureKind::Validation,
            Self::NotFound(_) | Self::Repository(PromptRepositoryError::NotFound(_)) => {
                FailureKind::NotFound
            }
            Self::Repository(PromptRepositoryError::DuplicatePrompt(_)) => FailureKind::Conflict,
            Self::Repository(PromptRepositoryError::Persistence(_)) => FailureKind::Internal,
        }
    }
}

/// Result type for prompt catalogue operations.
pub type PromptCatalogResult<T> = Result<T, PromptCatalogError>;

/// Prompt catalogue orchestration service.
#[derive(Clone)]
pub struct PromptCatalogService<R, C>
where
    R: PromptRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> PromptCatalogService<R, C>
where
    R: PromptRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new prompt catalogue service.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }

    /// Lists every prompt, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`PromptCatalogError::Repository`] when the lookup fails.
    pub async fn list_prompts(&self) -> PromptCatalogResult<Vec<Prompt>> {
        Ok(self.repository.list_all().await?)
    }

    /// Retrieves a single prompt.
    ///
    /// # Errors
    ///
    /// Returns [`PromptCatalogError::NotFound`] when no prompt has the given
    /// identifier.
    pub async fn get_prompt(&self, id: PromptId) -> PromptCatalogResult<Prompt> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(PromptCatalogError::NotFound(id))
    }

    /// Creates a prompt.
    ///
    /// # Errors
    ///
    /// Returns [`PromptCatalogError::Domain`] for blank content or an invalid
    /// category, or [`PromptCatalogError::Repository`] when persistence
    /// fails.
    pub async fn create_prompt(&self, request: CreatePromptRequest) -> PromptCatalogResult<Prompt> {
        let content = PromptContent::new(request.content)?;
        let category = request
            .category
            .map(PromptCategory::new)
            .transpose()?
            .unwrap_or_default();

        let prompt = Prompt::new(content, category, &*self.clock);
        self.repository.store(&prompt).await?;
        Ok(prompt)
    }

    /// Edits a prompt in place.
    ///
    /// # Errors
    ///
    /// Returns [`PromptCatalogError::Domain`] for invalid replacement values,
    /// [`PromptCatalogError::NotFound`] when the prompt does not exist, or
    /// [`PromptCatalogError::Repository`] when persistence fails.
    pub async fn update_prompt(
        &self,
        id: PromptId,
        request: UpdatePromptRequest,
    ) -> PromptCatalogResult<Prompt> {
        let content = request.content.map(PromptContent::new).transpose()?;
        let category = request.category.map(PromptCategory::new).transpose()?;

        let mut prompt = self.get_prompt(id).await?;
        prompt.edit(content, category, &*self.clock);
        self.repository.update(&prompt).await?;
        Ok(prompt)
    }

    /// Deletes a prompt. Existing tasks keep their dangling reference.
    ///
    /// # Errors
    ///
    /// Returns [`PromptCatalogError::NotFound`] when the prompt does not
    /// exist, or [`PromptCatalogError::Repository`] when persistence fails.
    pub async fn delete_prompt(&self, id: PromptId) -> PromptCatalogResult<()> {
        self.repository
            .delete(id)
            .await
            .map_err(|err| match err {
                PromptRepositoryError::NotFound(missing) => PromptCatalogError::NotFound(missing),
                other => PromptCatalogError::Repository(other),
            })
    }
}
