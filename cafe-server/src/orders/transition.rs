//! Status transition guard
//!
//! The chain itself lives on [`OrderStatus`]; this is where the engine
//! turns a refusal into an [`OrderError`].

use shared::models::OrderStatus;

use super::OrderError;

pub fn ensure_transition(from: OrderStatus, to: OrderStatus) -> Result<(), OrderError> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(OrderError::IllegalTransition { from, to })
    }
}
