//! Runtime configuration

use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use super::error::ValidationError;

/// Process-level settings: deployment environment and log filter.
#[derive(Debug, Clone, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default)]
    pub environment: Environment,

    /// Default `tracing` filter directive, used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Deployment environment
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl RuntimeConfig {
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Filter from `RUST_LOG`, falling back to the configured level.
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.log_level))
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        EnvFilter::try_new(&self.log_level)
            .map(|_| ())
            .map_err(|e| ValidationError::InvalidLogLevel(e.to_string()))
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info,sqlx=warn".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_development_at_info() {
        let config = RuntimeConfig::default();
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.log_level, "info,sqlx=warn");
        assert!(!config.is_production());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn production_is_detected() {
        let config = RuntimeConfig {
            environment: Environment::Production,
            ..Default::default()
        };
        assert!(config.is_production());
    }

    #[test]
    fn malformed_filter_is_rejected() {
        let config = RuntimeConfig {
            log_level: "peerwise=loud".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ValidationError::InvalidLogLevel(_))));
    }
}
