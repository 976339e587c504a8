//! Slice value object.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::shared::TicketId;

/// One scheduled partial submission of a parent order.
///
/// The sum of slice volumes always equals the parent order's total
/// volume exactly; planners never round volume away.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slice {
    /// Volume to submit for this slice.
    pub volume: Decimal,
    /// Earliest time the slice becomes eligible for execution.
    pub scheduled_time: DateTime<Utc>,
    /// Whether the slice has been executed at the broker.
    pub executed: bool,
    /// Price the slice filled at, once executed.
    pub execution_price: Option<Decimal>,
    /// Broker ticket for the fill, once executed.
    pub broker_ticket: Option<TicketId>,
}

impl Slice {
    /// Create a new unexecuted slice.
    #[must_use]
    pub const fn new(volume: Decimal, scheduled_time: DateTime<Utc>) -> Self {
        Self {
            volume,
            scheduled_time,
            executed: false,
            execution_price: None,
            broker_ticket: None,
        }
    }

    /// Returns true if the slice is unexecuted and its scheduled time
    /// has been reached.
    #[must_use]
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        !self.executed && self.scheduled_time <= now
    }

    /// Record the broker fill for this slice.
    pub fn mark_executed(&mut self, price: Decimal, ticket: TicketId) {
        self.executed = true;
        self.execution_price = Some(price);
        self.broker_ticket = Some(ticket);
    }
}
