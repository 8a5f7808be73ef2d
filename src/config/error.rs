//! Errors raised while loading and checking `AppConfig`.

use thiserror::Error;

/// Loading failed or the loaded values were rejected.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// A loaded value that is out of range or malformed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Pool min_connections exceeds max_connections")]
    InvalidPoolSize,

    #[error("Pool size exceeds maximum allowed (100)")]
    PoolSizeTooLarge,

    #[error("Invalid log filter: {0}")]
    InvalidLogLevel(String),

    #[error("Retry attempts must be between 1 and {max}")]
    InvalidRetryAttempts { max: u32 },

    #[error("Import max_rows must be greater than zero")]
    InvalidImportLimit,
}
