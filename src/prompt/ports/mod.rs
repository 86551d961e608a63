//! Port contracts for the prompt catalogue.

pub mod repository;

pub use repository::{PromptRepository, PromptRepositoryError, PromptRepositoryResult};
