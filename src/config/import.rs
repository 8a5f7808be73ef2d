//! Member import configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::org::ImportOptions;

/// Limits and strictness for CSV member imports.
#[derive(Debug, Clone, Deserialize)]
pub struct ImportConfig {
    /// Reject rows whose manager matches neither a row nor an existing member
    #[serde(default)]
    pub strict_manager_resolution: bool,

    #[serde(default = "default_max_rows")]
    pub max_rows: usize,
}

impl ImportConfig {
    pub fn options(&self) -> ImportOptions {
        ImportOptions {
            strict_manager_resolution: self.strict_manager_resolution,
            max_rows: Some(self.max_rows),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_rows == 0 {
            return Err(ValidationError::InvalidImportLimit);
        }
        Ok(())
    }
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            strict_manager_resolution: false,
            max_rows: default_max_rows(),
        }
    }
}

fn default_max_rows() -> usize {
    5_000
}
