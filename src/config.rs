//! Application configuration loaded from YAML.
//!
//! ```yaml
//! database:
//!   url: postgres://geoscope@localhost/geoscope
//!   pool_size: 8
//! llm:
//!   api_key: sk-...
//!   model: qwen-plus
//!   timeout_secs: 30
//! scheduler:
//!   interval_hours: 24
//!   run_on_startup: true
//! logging:
//!   level: info
//!   json: false
//! ```
//!
//! Every section except `database` may be omitted. When `llm.api_key` is
//! unset the key is read from the `DASHSCOPE_API_KEY` environment variable.

use crate::exposure::adapters::{
    HttpExposureEvaluatorConfig,
    http::{DEFAULT_ENDPOINT, DEFAULT_MODEL},
};
use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Environment variable consulted when no API key is configured.
pub const API_KEY_ENV: &str = "DASHSCOPE_API_KEY";

/// Longest accepted generation interval: one year.
pub const MAX_INTERVAL_HOURS: u64 = 365 * 24;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file '{path}': {source}")]
    Read {
        /// Path that was requested.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid YAML for [`AppConfig`].
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    /// A value failed validation.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Root configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AppConfig {
    /// Database connection settings.
    pub database: DatabaseConfig,
    /// Exposure evaluation endpoint settings.
    #[serde(default)]
    pub llm: LlmConfig,
    /// Daily generation schedule.
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Database connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum pooled connections.
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
}

/// Exposure evaluation endpoint settings.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Bearer token for the endpoint.
    pub api_key: Option<String>,
    /// Chat-completion endpoint URL.
    pub endpoint: String,
    /// Model name.
    pub model: String,
    /// Whole-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            model: DEFAULT_MODEL.to_owned(),
            timeout_secs: 30,
        }
    }
}

impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl LlmConfig {
    /// Builds the HTTP evaluator settings.
    #[must_use]
    pub fn evaluator_config(&self) -> HttpExposureEvaluatorConfig {
        HttpExposureEvaluatorConfig {
            endpoint: self.endpoint.clone(),
            api_key: self.api_key.clone(),
            model: self.model.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

/// Daily generation schedule.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Hours between generation runs.
    pub interval_hours: u64,
    /// Whether to generate once immediately at startup.
    pub run_on_startup: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval_hours: 24,
            run_on_startup: true,
        }
    }
}

impl SchedulerConfig {
    /// Returns the generation period.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_hours.saturating_mul(3600))
    }
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            json: false,
        }
    }
}

const fn default_pool_size() -> u32 {
    8
}

impl AppConfig {
    /// Loads, completes, and validates configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] when the file cannot be read,
    /// [`ConfigError::Parse`] for malformed YAML, and
    /// [`ConfigError::Invalid`] when validation fails.
    pub fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        let content = read_config_file(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    /// Parses, completes, and validates configuration from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed YAML and
    /// [`ConfigError::Invalid`] when validation fails.
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yaml::from_str(content)?;
        config.apply_api_key_fallback(std::env::var(API_KEY_ENV).ok());
        config.validate()?;
        Ok(config)
    }

    /// Validates value ranges and required fields.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "database.url must not be empty".to_owned(),
            ));
        }
        if self.database.pool_size == 0 {
            return Err(ConfigError::Invalid(
                "database.pool_size must be > 0".to_owned(),
            ));
        }
        if self.llm.endpoint.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "llm.endpoint must not be empty".to_owned(),
            ));
        }
        if self.llm.model.trim().is_empty() {
            return Err(ConfigError::Invalid("llm.model must not be empty".to_owned()));
        }
        if self.llm.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "llm.timeout_secs must be > 0".to_owned(),
            ));
        }
        if !(1..=MAX_INTERVAL_HOURS).contains(&self.scheduler.interval_hours) {
            return Err(ConfigError::Invalid(format!(
                "scheduler.interval_hours must be between 1 and {MAX_INTERVAL_HOURS}"
            )));
        }
        EnvFilter::try_new(&self.logging.level).map_err(|err| {
            ConfigError::Invalid(format!(
                "logging.level '{}' is not a valid filter: {err}",
                self.logging.level
            ))
        })?;
        Ok(())
    }

    fn apply_api_key_fallback(&mut self, from_env: Option<String>) {
        let configured = self
            .llm
            .api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty());
        if !configured {
            self.llm.api_key = from_env.filter(|key| !key.trim().is_empty());
        }
    }
}

fn read_config_file(path: &Utf8Path) -> Result<String, std::io::Error> {
    let file_name = path
        .file_name()
        .ok_or_else(|| std::io::Error::other("config path must include a file name"))?;
    let parent = path
        .parent()
        .filter(|parent| !parent.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let dir = Dir::open_ambient_dir(parent, ambient_authority())?;
    dir.read_to_string(file_name)
}
