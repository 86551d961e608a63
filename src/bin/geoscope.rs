//! Runs the daily task generation schedule against `PostgreSQL`.
//!
//! Usage:
//!
//! ```text
//! geoscope [config-path]
//! ```
//!
//! The configuration path defaults to `$GEOSCOPE_CONFIG`, then
//! `geoscope.yaml` in the working directory. The process stops on Ctrl-C or
//! SIGTERM.

use camino::Utf8PathBuf;
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use geoscope::config::AppConfig;
use geoscope::prompt::adapters::postgres::PostgresPromptRepository;
use geoscope::scheduler::DailyTaskScheduler;
use geoscope::shutdown::shutdown_signal;
use geoscope::task::{adapters::postgres::PostgresTaskRepository, services::TaskGenerator};
use geoscope::telemetry::init_tracing;
use mockable::DefaultClock;
use std::env;
use std::sync::Arc;
use tracing::{info, warn};

/// Boxed error type for the main result.
type BoxError = Box<dyn std::error::Error + Send + Sync>;

const CONFIG_ENV: &str = "GEOSCOPE_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "geoscope.yaml";

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let config_path = config_path()?;
    let config = AppConfig::load(&config_path)?;
    init_tracing(&config.logging)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %config_path,
        "geoscope starting"
    );
    if config.llm.api_key.is_none() {
        warn!("no exposure evaluation API key configured; reports will keep their own scores");
    }

    let database_url = config.database.url.clone();
    let pool_size = config.database.pool_size;
    let pool = tokio::task::spawn_blocking(move || {
        Pool::builder()
            .max_size(pool_size)
            .build(ConnectionManager::<PgConnection>::new(database_url))
    })
    .await??;
    info!(pool_size, "database pool ready");

    let generator = TaskGenerator::new(
        Arc::new(PostgresTaskRepository::new(pool.clone())),
        Arc::new(PostgresPromptRepository::new(pool)),
        Arc::new(DefaultClock),
    );
    let scheduler = DailyTaskScheduler::from_config(generator, &config.scheduler);
    scheduler.run_until(shutdown_signal()).await;

    info!("geoscope stopped");
    Ok(())
}

fn config_path() -> Result<Utf8PathBuf, BoxError> {
    let raw = match env::args_os().nth(1) {
        Some(arg) => arg,
        None => env::var_os(CONFIG_ENV).unwrap_or_else(|| DEFAULT_CONFIG_PATH.into()),
    };
    raw.into_string()
        .map(Utf8PathBuf::from)
        .map_err(|_| "config path is not valid UTF-8".into())
}
