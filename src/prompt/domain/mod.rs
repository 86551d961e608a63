//! Domain model for the prompt catalogue.

mod error;
mod ids;
mod prompt;

pub use error::PromptDomainError;
pub use ids::PromptId;
pub use prompt::{PersistedPromptData, Prompt, PromptCategory, PromptContent};
