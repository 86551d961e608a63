//! Error types for prompt domain validation.

use thiserror::Error;

/// Errors returned while constructing prompt domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PromptDomainError {
    /// The prompt identifier is not a valid UUID.
    #[error("invalid prompt identifier '{0}'")]
    InvalidPromptId(String),

    /// The prompt content is empty after trimming.
    #[error("prompt content must not be empty")]
    EmptyContent,

    /// The category is empty after trimming.
    #[error("prompt category must not be empty")]
    EmptyCategory,

    /// The category exceeds the storage limit.
    #[error("prompt category exceeds {max} character limit: {value}")]
    CategoryTooLong {
        /// Offending category value.
        value: String,
        /// Maximum number of characters.
        max: usize,
    },
}
