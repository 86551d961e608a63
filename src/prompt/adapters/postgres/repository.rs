//! `PostgreSQL` repository implementation for prompt storage.

use super::{
    models::{NewPromptRow, PromptRow},
    schema::prompts,
};
use crate::prompt::{
    domain::{PersistedPromptData, Prompt, PromptCategory, PromptContent, PromptId},
    ports::{PromptRepository, PromptRepositoryError, PromptRepositoryResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by prompt adapters.
pub type PromptPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed prompt repository.
#[derive(Debug, Clone)]
pub struct PostgresPromptRepository {
    pool: PromptPgPool,
}

impl PostgresPromptRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PromptPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> PromptRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> PromptRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(PromptRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(PromptRepositoryError::persistence)?
    }
}

#[async_trait]
impl PromptRepository for PostgresPromptRepository {
    async fn store(&self, prompt: &Prompt) -> PromptRepositoryResult<()> {
        let prompt_id = prompt.id();
        let new_row = to_new_row(prompt);

        self.run_blocking(move |connection| {
            diesel::insert_into(prompts::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        PromptRepositoryError::DuplicatePrompt(prompt_id)
                    }
                    _ => PromptRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn update(&self, prompt: &Prompt) -> PromptRepositoryResult<()> {
        let prompt_id = prompt.id();
        let content = prompt.content().as_str().to_owned();
        let category = prompt.category().as_str().to_owned();
        let updated_at = prompt.updated_at();

        self.run_blocking(move |connection| {
            let affected = diesel::update(prompts::table.filter(prompts::id.eq(prompt_id.into_inner())))
                .set((
                    prompts::content.eq(content),
                    prompts::category.eq(category),
                    prompts::updated_at.eq(updated_at),
                ))
                .execute(connection)
                .map_err(PromptRepositoryError::persistence)?;
            if affected == 0 {
                return Err(PromptRepositoryError::NotFound(prompt_id));
            }
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: PromptId) -> PromptRepositoryResult<Option<Prompt>> {
        self.run_blocking(move |connection| {
            let row = prompts::table
                .filter(prompts::id.eq(id.into_inner()))
                .select(PromptRow::as_select())
                .first::<PromptRow>(connection)
                .optional()
                .map_err(PromptRepositoryError::persistence)?;
            row.map(row_to_prompt).transpose()
        })
        .await
    }

    async fn list_all(&self) -> PromptRepositoryResult<Vec<Prompt>> {
        self.run_blocking(|connection| {
            prompts::table
                .order((prompts::created_at.asc(), prompts::id.asc()))
                .select(PromptRow::as_select())
                .load::<PromptRow>(connection)
                .map_err(PromptRepositoryError::persistence)?
                .into_iter()
                .map(row_to_prompt)
                .collect()
        })
        .await
    }

    async fn delete(&self, id: PromptId) -> PromptRepositoryResult<()> {
        self.run_blocking(move |connection| {
            let affected = diesel::delete(prompts::table.filter(prompts::id.eq(id.into_inner())))
                .execute(connection)
                .map_err(PromptRepositoryError::persistence)?;
            if affected == 0 {
                return Err(PromptRepositoryError::NotFound(id));
            }
            Ok(())
        })
        .await
    }
}

fn to_new_row(prompt: &Prompt) -> NewPromptRow {
    NewPromptRow {
        id: prompt.id().into_inner(),
        content: prompt.content().as_str().to_owned(),
        category: prompt.category().as_str().to_owned(),
        created_at: prompt.created_at(),
        updated_at: prompt.updated_at(),
    }
}

fn row_to_prompt(row: PromptRow) -> PromptRepositoryResult<Prompt> {
    let PromptRow {
        id,
        content: persisted_content,
        category: persisted_category,
        created_at,
        updated_at,
    } = row;

    let content =
        PromptContent::new(persisted_content).map_err(PromptRepositoryError::persistence)?;
    let category =
        PromptCategory::new(persisted_category).map_err(PromptRepositoryError::persistence)?;

    Ok(Prompt::from_persisted(PersistedPromptData {
        id: PromptId::from_uuid(id),
        content,
        category,
        created_at,
        updated_at,
    }))
}
