//! ListDueCyclesHandler - Query handler for cycles due for reminder emails.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::domain::feedback_cycle::{FeedbackCycle, FeedbackCycleScheduler};
use crate::domain::foundation::CompanyId;
use crate::ports::FeedbackCycleStore;

use super::SchedulingError;

/// Query for the cycles of a company that are due on a given day.
#[derive(Debug, Clone)]
pub struct ListDueCyclesQuery {
    pub company_id: CompanyId,
    pub today: NaiveDate,
}

pub type ListDueCyclesResult = Vec<FeedbackCycle>;

/// Handler for listing due cycles.
pub struct ListDueCyclesHandler {
    store: Arc<dyn FeedbackCycleStore>,
    scheduler: FeedbackCycleScheduler,
}

impl ListDueCyclesHandler {
    pub fn new(store: Arc<dyn FeedbackCycleStore>, scheduler: FeedbackCycleScheduler) -> Self {
        Self { store, scheduler }
    }

    pub async fn handle(&self, query: ListDueCyclesQuery) -> Result<ListDueCyclesResult, SchedulingError> {
        let cycles = self.store.list_cycles(&query.company_id).await?;
        Ok(self
            .scheduler
            .select_due_cycles(&cycles, query.today)
            .into_iter()
            .cloned()
            .collect())
    }
}
