//! Rollover scheduler configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::application::RetryPolicy;
use crate::domain::feedback_cycle::{FeedbackCycleScheduler, RolloverAnchor};

const MAX_RETRY_ATTEMPTS: u32 = 10;

/// Settings for the occurrence rollover pass.
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    /// `evaluation_time` or `previous_end`
    #[serde(default)]
    pub anchor: RolloverAnchor,

    /// Attempts per cycle for transient storage failures, including the first
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,

    /// Fixed delay between attempts in milliseconds
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl SchedulerConfig {
    pub fn scheduler(&self) -> FeedbackCycleScheduler {
        FeedbackCycleScheduler::new(self.anchor)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retry_attempts, Duration::from_millis(self.retry_delay_ms))
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.retry_attempts == 0 || self.retry_attempts > MAX_RETRY_ATTEMPTS {
            return Err(ValidationError::InvalidRetryAttempts {
                max: MAX_RETRY_ATTEMPTS,
            });
        }
        Ok(())
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            anchor: RolloverAnchor::default(),
            retry_attempts: default_retry_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    500
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_anchor_at_evaluation_time() {
        let config = SchedulerConfig::default();
        assert_eq!(config.scheduler().anchor(), RolloverAnchor::EvaluationTime);
        assert_eq!(config.retry_policy().max_attempts(), 3);
        assert_eq!(config.retry_policy().delay(), Duration::from_millis(500));
    }

    #[test]
    fn zero_attempts_is_rejected() {
        let config = SchedulerConfig {
            retry_attempts: 0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidRetryAttempts { max: 10 })
        );
    }

    #[test]
    fn too_many_attempts_is_rejected() {
        let config = SchedulerConfig {
            retry_attempts: 11,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn previous_end_anchor_deserializes_from_snake_case() {
        let config: SchedulerConfig =
            serde_json::from_str(r#"{"anchor": "previous_end"}"#).unwrap();
        assert_eq!(config.anchor, RolloverAnchor::PreviousEnd);
        assert_eq!(config.retry_attempts, 3);
    }
}
