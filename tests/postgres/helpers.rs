//! Shared test helpers for `PostgreSQL` integration tests.

use super::cluster::shared_cluster;
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use geoscope::prompt::adapters::postgres::PostgresPromptRepository;
use geoscope::task::adapters::postgres::{PostgresTaskRepository, TaskPgPool};
use mockable::DefaultClock;
use reqwest::Url;
use rstest::fixture;
use uuid::Uuid;

/// Boxed error type used across the helpers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Environment variable naming an external server to use instead of the
/// embedded cluster.
pub const DATABASE_URL_ENV: &str = "GEOSCOPE_TEST_DATABASE_URL";

/// SQL creating the schema.
pub const CREATE_SCHEMA_SQL: &str =
    include_str!("../../migrations/2026-10-18-000000_create_geoscope_tables/up.sql");

/// Provides a [`DefaultClock`] for test fixtures.
#[fixture]
pub fn clock() -> DefaultClock {
    DefaultClock
}

/// A database created for one test and dropped afterwards.
pub struct TemporaryDatabase {
    admin_url: String,
    name: String,
    url: String,
}

impl TemporaryDatabase {
    /// Creates an empty database and applies the schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the server is unreachable or DDL fails.
    pub fn create(admin_url: &str) -> Result<Self, BoxError> {
        let name = format!("geoscope_test_{}", Uuid::new_v4().simple());
        let mut url = Url::parse(admin_url)?;
        url.set_path(&format!("/{name}"));

        let mut admin = PgConnection::establish(admin_url)?;
        admin.batch_execute(&format!("CREATE DATABASE \"{name}\""))?;

        let database = Self {
            admin_url: admin_url.to_owned(),
            name,
            url: url.to_string(),
        };
        let mut conn = PgConnection::establish(&database.url)?;
        conn.batch_execute(CREATE_SCHEMA_SQL)?;
        Ok(database)
    }

    /// Connection URL for this database.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Drop for TemporaryDatabase {
    fn drop(&mut self) {
        if let Ok(mut admin) = PgConnection::establish(&self.admin_url) {
            drop(admin.batch_execute(&format!(
                "DROP DATABASE IF EXISTS \"{}\" WITH (FORCE)",
                self.name
            )));
        }
    }
}

/// Repositories backed by one temporary database.
pub struct PreparedRepos {
    /// Kept alive so the database outlives the repositories.
    pub temp_db: TemporaryDatabase,
    /// Shared connection pool.
    pub pool: TaskPgPool,
    /// Prompt repository.
    pub prompts: PostgresPromptRepository,
    /// Task repository.
    pub tasks: PostgresTaskRepository,
}

/// Returns the maintenance URL of the configured external server, falling
/// back to the shared embedded cluster.
///
/// Blocks while the embedded cluster starts, so call it off the async
/// executor.
///
/// # Errors
///
/// Returns an error if no external server is configured and the embedded
/// cluster cannot start.
pub fn admin_url() -> Result<String, BoxError> {
    match std::env::var(DATABASE_URL_ENV) {
        Ok(url) if !url.trim().is_empty() => Ok(url),
        _ => Ok(shared_cluster()?.admin_url()),
    }
}

/// Creates a temporary database and repositories over it.
///
/// # Errors
///
/// Returns an error if no server is available, or if database creation or
/// pool construction fails.
#[fixture]
pub async fn prepared_repos() -> Result<PreparedRepos, BoxError> {
    tokio::task::spawn_blocking(|| -> Result<PreparedRepos, BoxError> {
        let temp_db = TemporaryDatabase::create(&admin_url()?)?;
        let manager = ConnectionManager::<PgConnection>::new(temp_db.url());
        let pool = Pool::builder().max_size(4).build(manager)?;
        Ok(PreparedRepos {
            prompts: PostgresPromptRepository::new(pool.clone()),
            tasks: PostgresTaskRepository::new(pool.clone()),
            pool,
            temp_db,
        })
    })
    .await?
}

/// Runs a raw SQL batch against the pool.
///
/// # Errors
///
/// Returns an error if a connection cannot be acquired or the SQL fails.
pub async fn execute_sql(pool: &TaskPgPool, sql: String) -> Result<(), BoxError> {
    let pool = pool.clone();
    tokio::task::spawn_blocking(move || -> Result<(), BoxError> {
        let mut conn = pool.get()?;
        conn.batch_execute(&sql)?;
        Ok(())
    })
    .await?
}
