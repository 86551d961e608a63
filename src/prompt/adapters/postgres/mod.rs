//! `PostgreSQL` adapters for prompt persistence.

mod models;
mod repository;
mod schema;

pub use repository::{PostgresPromptRepository, PromptPgPool};
