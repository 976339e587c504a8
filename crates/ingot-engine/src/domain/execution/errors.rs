//! Errors for the order execution bounded context.

use std::fmt;

use super::status::OrderStatus;

/// Errors raised by the order aggregate and state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    /// Attempted an invalid state transition.
    InvalidStateTransition {
        /// Current status.
        from: OrderStatus,
        /// Attempted status.
        to: OrderStatus,
        /// Reason the transition is not allowed.
        reason: String,
    },

    /// Referenced a slice index that does not exist on the order.
    UnknownSlice {
        /// Slice index that was requested.
        index: usize,
    },

    /// Attempted to fill a slice that already executed.
    SliceAlreadyExecuted {
        /// Slice index that was requested.
        index: usize,
    },

    /// A fill would push the filled volume past the order total.
    FillExceedsTotal {
        /// Volume of the attempted fill.
        fill_volume: String,
        /// Volume still unfilled on the order.
        remaining: String,
    },
}

impl fmt::Display for OrderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidStateTransition { from, to, reason } => {
                write!(f, "Invalid state transition: {from} -> {to}: {reason}")
            }
            Self::UnknownSlice { index } => {
                write!(f, "Order has no slice at index {index}")
            }
            Self::SliceAlreadyExecuted { index } => {
                write!(f, "Slice {index} has already executed")
            }
            Self::FillExceedsTotal {
                fill_volume,
                remaining,
            } => {
                write!(
                    f,
                    "Fill of {fill_volume} exceeds remaining volume {remaining}"
                )
            }
        }
    }
}

impl std::error::Error for OrderError {}
