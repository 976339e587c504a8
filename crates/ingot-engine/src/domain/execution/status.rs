//! Order status in the execution lifecycle.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a parent execution order.
///
/// Orders move through this lifecycle:
///
/// - `Pending` -> `Executing` on the first tick that picks the order up
/// - `Executing` -> `PartialFill` once some but not all volume is filled
/// - `PartialFill`/`Executing` -> `Filled` at the completion tolerance
/// - Any non-terminal state -> `Cancelled` on a cancel request
/// - `Failed` when slice planning rejects the order before any slice runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Order admitted but not yet picked up by the scheduler.
    Pending,
    /// Scheduler is actively working the order.
    Executing,
    /// Some volume filled, more slices remain.
    PartialFill,
    /// Filled volume reached the completion tolerance.
    Filled,
    /// Cancelled by request; already-filled volume is retained.
    Cancelled,
    /// Slice planning rejected the order before execution started.
    Failed,
}

impl OrderStatus {
    /// Returns true if the order is in a terminal state.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Filled | Self::Cancelled | Self::Failed)
    }

    /// Returns true if the scheduler still has work to do on the order.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Pending | Self::Executing | Self::PartialFill)
    }

    /// Returns true if the order can be cancelled.
    #[must_use]
    pub const fn is_cancelable(&self) -> bool {
        self.is_active()
    }

    /// Returns true if the order can receive slice fills.
    #[must_use]
    pub const fn can_fill(&self) -> bool {
        matches!(self, Self::Executing | Self::PartialFill)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Executing => write!(f, "EXECUTING"),
            Self::PartialFill => write!(f, "PARTIAL_FILL"),
            Self::Filled => write!(f, "FILLED"),
            Self::Cancelled => write!(f, "CANCELLED"),
            Self::Failed => write!(f, "FAILED"),
        }
    }
}
