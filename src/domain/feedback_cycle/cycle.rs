//! Recurring feedback cycle policy.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{CompanyId, FeedbackCycleId, StateMachine, ValidationError};

use super::{FeedbackCycleStatus, Frequency};

/// A recurring feedback policy that generates occurrences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackCycle {
    pub id: FeedbackCycleId,
    pub company_id: CompanyId,
    pub frequency: Frequency,
    pub status: FeedbackCycleStatus,
    /// Last day on which reminder emails go out, if bounded.
    pub due_date: Option<NaiveDate>,
}

impl FeedbackCycle {
    /// Creates a new draft cycle.
    pub fn new(company_id: CompanyId, frequency: Frequency) -> Self {
        Self {
            id: FeedbackCycleId::new(),
            company_id,
            frequency,
            status: FeedbackCycleStatus::Draft,
            due_date: None,
        }
    }

    pub fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn is_active(&self) -> bool {
        self.status == FeedbackCycleStatus::Active
    }

    /// Starts generating occurrences.
    pub fn activate(&mut self) -> Result<(), ValidationError> {
        self.status = self.status.transition_to(FeedbackCycleStatus::Active)?;
        Ok(())
    }

    /// Stops generating occurrences. Existing occurrences are kept.
    pub fn pause(&mut self) -> Result<(), ValidationError> {
        self.status = self.status.transition_to(FeedbackCycleStatus::Draft)?;
        Ok(())
    }

    /// True if reminder emails should go out on `today`.
    ///
    /// The due date itself is inclusive.
    pub fn is_due_on(&self, today: NaiveDate) -> bool {
        self.is_active() && self.due_date.map_or(true, |due| today <= due)
    }
}
