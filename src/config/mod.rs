//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables using the
//! `config` and `dotenvy` crates. Variables carry the `PEERWISE` prefix and
//! nested values are separated by double underscores.
//!
//! # Example
//!
//! ```no_run
//! use peerwise::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod database;
mod error;
mod import;
mod runtime;
mod scheduler;

pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use import::ImportConfig;
pub use runtime::{Environment, RuntimeConfig};
pub use scheduler::SchedulerConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`], which reads from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Environment and log filter
    #[serde(default)]
    pub runtime: RuntimeConfig,

    /// PostgreSQL connection
    pub database: DatabaseConfig,

    /// Occurrence rollover
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// CSV member import
    #[serde(default)]
    pub import: ImportConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// 1. Loads `.env` if present (for development)
    /// 2. Reads variables with the `PEERWISE` prefix
    /// 3. Uses `__` to separate nested values
    ///
    /// # Environment Variable Format
    ///
    /// - `PEERWISE__DATABASE__URL=...` -> `database.url = ...`
    /// - `PEERWISE__SCHEDULER__ANCHOR=previous_end` -> `scheduler.anchor`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or values
    /// cannot be parsed into the expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("PEERWISE")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate every section
    ///
    /// # Errors
    ///
    /// Returns the first `ValidationError` found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.runtime.validate()?;
        self.database.validate()?;
        self.scheduler.validate()?;
        self.import.validate()?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.runtime.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::feedback_cycle::RolloverAnchor;
    use std::env;
    use std::sync::Mutex;

    // Env vars are process-global, so these tests must not interleave.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "PEERWISE__DATABASE__URL",
        "PEERWISE__RUNTIME__ENVIRONMENT",
        "PEERWISE__SCHEDULER__ANCHOR",
        "PEERWISE__SCHEDULER__RETRY_ATTEMPTS",
        "PEERWISE__IMPORT__STRICT_MANAGER_RESOLUTION",
    ];

    fn set_minimal_env() {
        env::set_var("PEERWISE__DATABASE__URL", "postgresql://test@localhost/peerwise");
    }

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn loads_from_environment_with_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.expect("config should load");
        assert_eq!(config.database.url, "postgresql://test@localhost/peerwise");
        assert_eq!(config.runtime.environment, Environment::Development);
        assert_eq!(config.scheduler.anchor, RolloverAnchor::EvaluationTime);
        assert_eq!(config.scheduler.retry_attempts, 3);
        assert!(!config.import.strict_manager_resolution);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn nested_sections_are_overridable() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("PEERWISE__RUNTIME__ENVIRONMENT", "production");
        env::set_var("PEERWISE__SCHEDULER__ANCHOR", "previous_end");
        env::set_var("PEERWISE__SCHEDULER__RETRY_ATTEMPTS", "5");
        env::set_var("PEERWISE__IMPORT__STRICT_MANAGER_RESOLUTION", "true");
        let result = AppConfig::load();
        clear_env();

        let config = result.expect("config should load");
        assert!(config.is_production());
        assert_eq!(config.scheduler.anchor, RolloverAnchor::PreviousEnd);
        assert_eq!(config.scheduler.retry_attempts, 5);
        assert!(config.import.strict_manager_resolution);
    }

    #[test]
    fn missing_database_section_fails_to_load() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        assert!(AppConfig::load().is_err());
    }
}
