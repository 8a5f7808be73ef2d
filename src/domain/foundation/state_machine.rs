//! Status lifecycles.
//!
//! Cycle and occurrence statuses list their allowed successors; everything
//! else (validated moves, terminal checks) comes from the trait.

use std::fmt;

use super::ValidationError;

/// A status enum with a fixed set of allowed moves.
///
/// ```ignore
/// let next = OccurrenceStatus::Active.transition_to(OccurrenceStatus::Completed)?;
/// ```
pub trait StateMachine: Sized + Copy + PartialEq + fmt::Display {
    /// Statuses reachable in one step from `self`.
    fn valid_transitions(&self) -> Vec<Self>;

    fn can_transition_to(&self, target: &Self) -> bool {
        self.valid_transitions().contains(target)
    }

    /// Returns `target` if the move is allowed.
    ///
    /// # Errors
    ///
    /// `InvalidFormat` on the `status` field, naming both statuses.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            return Ok(target);
        }
        Err(ValidationError::invalid_format(
            "status",
            format!("cannot move from '{}' to '{}'", self, target),
        ))
    }

    /// True when no further moves exist.
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}
