//! Prompt aggregate and its validated fields.

use super::{PromptDomainError, PromptId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Non-empty prompt text sent verbatim to the external model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PromptContent(String);

impl PromptContent {
    /// Creates validated prompt content.
    ///
    /// Surrounding whitespace is preserved; only blank content is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`PromptDomainError::EmptyContent`] when the value is blank.
    pub fn new(value: impl Into<String>) -> Result<Self, PromptDomainError> {
        let content = value.into();
        if content.trim().is_empty() {
            return Err(PromptDomainError::EmptyContent);
        }
        Ok(Self(content))
    }

    /// Returns the content as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PromptContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Free-form grouping label for prompts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PromptCategory(String);

impl PromptCategory {
    /// Category assigned when none is supplied.
    pub const DEFAULT: &'static str = "default";

    /// Largest category length accepted by the `prompts.category` column.
    pub const MAX_CHARS: usize = 50;

    /// Creates a validated, trimmed category.
    ///
    /// # Errors
    ///
    /// Returns [`PromptDomainError::EmptyCategory`] for blank input or
    /// [`PromptDomainError::CategoryTooLong`] when the trimmed value exceeds
    /// [`Self::MAX_CHARS`] characters.
    pub fn new(value: impl Into<String>) -> Result<Self, PromptDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(PromptDomainError::EmptyCategory);
        }
        if trimmed.chars().count() > Self::MAX_CHARS {
            return Err(PromptDomainError::CategoryTooLong {
                value: trimmed.to_owned(),
                max: Self::MAX_CHARS,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the category as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for PromptCategory {
    fn default() -> Self {
        Self(Self::DEFAULT.to_owned())
    }
}

impl fmt::Display for PromptCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Prompt aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    id: PromptId,
    content: PromptContent,
    category: PromptCategory,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedPromptData {
    /// Persisted prompt identifier.
    pub id: PromptId,
    /// Persisted prompt text.
    pub content: PromptContent,
    /// Persisted category.
    pub category: PromptCategory,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest edit timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Prompt {
    /// Creates a new prompt.
    #[must_use]
    pub fn new(content: PromptContent, category: PromptCategory, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: PromptId::new(),
            content,
            category,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a prompt from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedPromptData) -> Self {
        Self {
            id: data.id,
            content: data.content,
            category: data.category,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the prompt identifier.
    #[must_use]
    pub const fn id(&self) -> PromptId {
        self.id
    }

    /// Returns the prompt text.
    #[must_use]
    pub const fn content(&self) -> &PromptContent {
        &self.content
    }

    /// Returns the prompt category.
    #[must_use]
    pub const fn category(&self) -> &PromptCategory {
        &self.category
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest edit timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Applies an explicit edit. Fields left as `None` keep their value.
    pub fn edit(
        &mut self,
        content: Option<PromptContent>,
        category: Option<PromptCategory>,
        clock: &impl Clock,
    ) {
        if let Some(new_content) = content {
            self.content = new_content;
        }
        if let Some(new_category) = category {
            self.category = new_category;
        }
        self.updated_at = clock.utc();
    }
}
