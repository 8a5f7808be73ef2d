//! Lifecycle statuses for cycles and occurrences.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{StateMachine, ValidationError};

/// Whether a cycle is generating occurrences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackCycleStatus {
    #[default]
    Draft,
    Active,
}

impl FeedbackCycleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackCycleStatus::Draft => "draft",
            FeedbackCycleStatus::Active => "active",
        }
    }
}

impl StateMachine for FeedbackCycleStatus {
    /// Draft and Active can be toggled; a paused cycle goes back to draft.
    fn valid_transitions(&self) -> Vec<Self> {
        match self {
            FeedbackCycleStatus::Draft => vec![FeedbackCycleStatus::Active],
            FeedbackCycleStatus::Active => vec![FeedbackCycleStatus::Draft],
        }
    }
}

impl fmt::Display for FeedbackCycleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FeedbackCycleStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(FeedbackCycleStatus::Draft),
            "active" => Ok(FeedbackCycleStatus::Active),
            other => Err(ValidationError::invalid_format(
                "cycle_status",
                format!("unknown status '{}'", other),
            )),
        }
    }
}

/// Status of one occurrence. Occurrences only ever move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OccurrenceStatus {
    #[default]
    Active,
    Completed,
}

impl OccurrenceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OccurrenceStatus::Active => "active",
            OccurrenceStatus::Completed => "completed",
        }
    }
}

impl StateMachine for OccurrenceStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        matches!((self, target), (OccurrenceStatus::Active, OccurrenceStatus::Completed))
    }

    fn valid_transitions(&self) -> Vec<Self> {
        match self {
            OccurrenceStatus::Active => vec![OccurrenceStatus::Completed],
            OccurrenceStatus::Completed => vec![],
        }
    }
}

impl fmt::Display for OccurrenceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OccurrenceStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(OccurrenceStatus::Active),
            "completed" => Ok(OccurrenceStatus::Completed),
            other => Err(ValidationError::invalid_format(
                "occurrence_status",
                format!("unknown status '{}'", other),
            )),
        }
    }
}
