//! Order State Machine Service
//!
//! Validates status transitions for parent execution orders.

use super::errors::OrderError;
use super::status::OrderStatus;

/// Order state machine for validating transitions.
///
/// Cancellation is cooperative: any non-terminal state may move to
/// `Cancelled`. There is no automatic transition to `Failed` once an
/// order starts executing; unexecutable slices are deferred instead.
pub struct OrderStateMachine;

impl OrderStateMachine {
    /// Check if a state transition is valid.
    #[must_use]
    pub fn is_valid_transition(from: OrderStatus, to: OrderStatus) -> bool {
        matches!(
            (from, to),
            // From Pending
            (OrderStatus::Pending, OrderStatus::Executing)
                | (OrderStatus::Pending, OrderStatus::Cancelled)
                // From Executing
                | (OrderStatus::Executing, OrderStatus::PartialFill)
                | (OrderStatus::Executing, OrderStatus::Filled)
                | (OrderStatus::Executing, OrderStatus::Cancelled)
                | (OrderStatus::Executing, OrderStatus::Failed)
                // From PartialFill
                | (OrderStatus::PartialFill, OrderStatus::PartialFill)
                | (OrderStatus::PartialFill, OrderStatus::Filled)
                | (OrderStatus::PartialFill, OrderStatus::Cancelled)
        )
    }

    /// Validate a state transition.
    ///
    /// # Errors
    ///
    /// Returns error if the transition is invalid.
    pub fn validate_transition(from: OrderStatus, to: OrderStatus) -> Result<(), OrderError> {
        if Self::is_valid_transition(from, to) {
            Ok(())
        } else {
            Err(OrderError::InvalidStateTransition {
                from,
                to,
                reason: Self::transition_error_reason(from, to),
            })
        }
    }

    /// Get a human-readable reason for an invalid transition.
    #[must_use]
    pub fn transition_error_reason(from: OrderStatus, to: OrderStatus) -> String {
        match from {
            OrderStatus::Filled => format!("Order is already filled, cannot transition to {to}"),
            OrderStatus::Cancelled => format!("Order is cancelled, cannot transition to {to}"),
            OrderStatus::Failed => format!("Order failed planning, cannot transition to {to}"),
            _ => format!("Invalid transition from {from} to {to}"),
        }
    }

    /// Get all valid next states from a given state.
    #[must_use]
    pub fn valid_next_states(from: OrderStatus) -> Vec<OrderStatus> {
        match from {
            OrderStatus::Pending => vec![OrderStatus::Executing, OrderStatus::Cancelled],
            OrderStatus::Executing => vec![
                OrderStatus::PartialFill,
                OrderStatus::Filled,
                OrderStatus::Cancelled,
                OrderStatus::Failed,
            ],
            OrderStatus::PartialFill => vec![
                OrderStatus::PartialFill,
                OrderStatus::Filled,
                OrderStatus::Cancelled,
            ],
            // Terminal states
            OrderStatus::Filled | OrderStatus::Cancelled | OrderStatus::Failed => vec![],
        }
    }
}
