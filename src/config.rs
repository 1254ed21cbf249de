//! Environment-driven settings for Taskloom binaries.
//!
//! ```bash
//! export TASKLOOM_DATABASE_URL="postgres://taskloom@localhost/taskloom"
//! export TASKLOOM_POOL_MAX_SIZE=8
//! export TASKLOOM_LOG="taskloom=debug,info"
//! ```

use thiserror::Error;

/// Connection string of the `PostgreSQL` task store.
pub const DATABASE_URL_KEY: &str = "TASKLOOM_DATABASE_URL";
/// Maximum number of pooled database connections.
pub const POOL_MAX_SIZE_KEY: &str = "TASKLOOM_POOL_MAX_SIZE";
/// Log filter directives.
pub const LOG_FILTER_KEY: &str = "TASKLOOM_LOG";

const DEFAULT_POOL_MAX_SIZE: u32 = 4;
const DEFAULT_LOG_FILTER: &str = "info";

/// Errors raised while reading configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A required setting is not present.
    #[error("missing required setting {0}")]
    Missing(&'static str),
    /// A setting is present but unusable.
    #[error("invalid value '{value}' for {key}: {reason}")]
    Invalid {
        /// Setting name.
        key: &'static str,
        /// Rejected value.
        value: String,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Application settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// `PostgreSQL` connection string.
    pub database_url: String,
    /// Maximum size of the connection pool.
    pub pool_max_size: u32,
    /// `tracing-subscriber` filter directives.
    pub log_filter: String,
}

impl AppConfig {
    /// Reads settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the database URL is missing or a value
    /// cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through an arbitrary key lookup.
    ///
    /// Blank values count as absent.
    ///
    /// # Errors
    ///
    /// See [`Self::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let database_url = read(DATABASE_URL_KEY).ok_or(ConfigError::Missing(DATABASE_URL_KEY))?;
        let pool_max_size = read(POOL_MAX_SIZE_KEY)
            .map(|value| parse_pool_size(&value))
            .transpose()?
            .unwrap_or(DEFAULT_POOL_MAX_SIZE);
        let log_filter = read(LOG_FILTER_KEY).unwrap_or_else(|| DEFAULT_LOG_FILTER.to_owned());

        Ok(Self {
            database_url,
            pool_max_size,
            log_filter,
        })
    }
}

fn parse_pool_size(value: &str) -> Result<u32, ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid {
        key: POOL_MAX_SIZE_KEY,
        value: value.to_owned(),
        reason,
    };
    let size = value
        .trim()
        .parse::<u32>()
        .map_err(|err| invalid(err.to_string()))?;
    if size == 0 {
        return Err(invalid("must be positive".to_owned()));
    }
    Ok(size)
}
