//! Log subscriber installation for binaries.

use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Errors raised while installing the log subscriber.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The filter directives could not be parsed.
    #[error("invalid log filter '{filter}': {source}")]
    InvalidFilter {
        /// Rejected directives.
        filter: String,
        /// Parser error.
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },
    /// A global subscriber was already installed.
    #[error("failed to install log subscriber: {0}")]
    Install(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Builds the filter used by [`init`].
///
/// # Errors
///
/// Returns [`TelemetryError::InvalidFilter`] when `directives` is malformed.
pub fn filter(directives: &str) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(directives).map_err(|source| TelemetryError::InvalidFilter {
        filter: directives.to_owned(),
        source,
    })
}

/// Installs a formatted stderr subscriber filtered by `directives`.
///
/// # Errors
///
/// Returns [`TelemetryError`] when the directives are malformed or a
/// subscriber is already installed.
pub fn init(directives: &str) -> Result<(), TelemetryError> {
    tracing_subscriber::fmt()
        .with_env_filter(filter(directives)?)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(TelemetryError::Install)
}
