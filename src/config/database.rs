//! Database configuration

use serde::Deserialize;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;

use super::error::ValidationError;

/// PostgreSQL connection settings
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Minimum connections to maintain
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Maximum connections allowed
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Connection acquire timeout in seconds
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,

    /// Run pending migrations before the scheduler pass
    #[serde(default)]
    pub run_migrations: bool,
}

impl DatabaseConfig {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    /// Pool options built from these settings; connect with `connect(&self.url)`.
    pub fn pool_options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .min_connections(self.min_connections)
            .max_connections(self.max_connections)
            .acquire_timeout(self.acquire_timeout())
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.url.is_empty() {
            return Err(ValidationError::MissingRequired("DATABASE_URL"));
        }
        if !self.url.starts_with("postgres://") && !self.url.starts_with("postgresql://") {
            return Err(ValidationError::InvalidDatabaseUrl);
        }
        if self.min_connections > self.max_connections {
            return Err(ValidationError::InvalidPoolSize);
        }
        if self.max_connections > 100 {
            return Err(ValidationError::PoolSizeTooLarge);
        }
        Ok(())
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            min_connections: default_min_connections(),
            max_connections: default_max_connections(),
            acquire_timeout_secs: default_acquire_timeout(),
            run_migrations: false,
        }
    }
}

// A scheduler pass is a short batch job; a handful of connections is plenty.
fn default_min_connections() -> u32 {
    1
}

fn default_max_connections() -> u32 {
    5
}

fn default_acquire_timeout() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_url(url: &str) -> DatabaseConfig {
        DatabaseConfig {
            url: url.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn defaults_suit_a_batch_job() {
        let config = DatabaseConfig::default();
        assert_eq!(config.min_connections, 1);
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.acquire_timeout(), Duration::from_secs(30));
        assert!(!config.run_migrations);
    }

    #[test]
    fn missing_url_is_rejected() {
        assert_eq!(
            DatabaseConfig::default().validate(),
            Err(ValidationError::MissingRequired("DATABASE_URL"))
        );
    }

    #[test]
    fn non_postgres_url_is_rejected() {
        assert_eq!(
            with_url("mysql://localhost/peerwise").validate(),
            Err(ValidationError::InvalidDatabaseUrl)
        );
    }

    #[test]
    fn both_postgres_schemes_are_accepted() {
        assert!(with_url("postgres://localhost/peerwise").validate().is_ok());
        assert!(with_url("postgresql://user:pass@db:5432/peerwise").validate().is_ok());
    }

    #[test]
    fn inverted_pool_bounds_are_rejected() {
        let config = DatabaseConfig {
            min_connections: 10,
            max_connections: 5,
            ..with_url("postgres://localhost/peerwise")
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidPoolSize));
    }

    #[test]
    fn oversized_pool_is_rejected() {
        let config = DatabaseConfig {
            max_connections: 150,
            ..with_url("postgres://localhost/peerwise")
        };
        assert_eq!(config.validate(), Err(ValidationError::PoolSizeTooLarge));
    }
}
