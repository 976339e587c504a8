//! Execution Order Aggregate Root
//!
//! The aggregate manages the lifecycle of a parent order worked as a
//! sequence of slices: status transitions, fill bookkeeping, and the
//! volume-weighted average price.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::OrderError;
use super::slice::Slice;
use super::state_machine::OrderStateMachine;
use super::status::OrderStatus;
use crate::domain::shared::{OrderId, Symbol, TicketId};

/// Fraction of total volume at which an order counts as fully filled.
///
/// Lot-step quantization can leave residual volume below the broker
/// minimum, so completion is measured against this tolerance rather
/// than exact equality.
pub const FILL_COMPLETION_RATIO: Decimal = Decimal::from_parts(99, 0, 0, false, 2); // 0.99

/// Side of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderSide {
    /// Buy the instrument.
    Buy,
    /// Sell the instrument.
    Sell,
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

/// Execution algorithm used to work a parent order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// Single immediate slice for the full volume.
    Market,
    /// Equal slices spread uniformly over a time window.
    Twap,
    /// Slices weighted by a U-shaped intraday volume profile.
    Vwap,
    /// Fixed visible peaks revealed one at a time.
    Iceberg,
}

impl Algorithm {
    /// Lowercase name used in logs and metric labels.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Market => "market",
            Self::Twap => "twap",
            Self::Vwap => "vwap",
            Self::Iceberg => "iceberg",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Construction parameters for an execution order.
#[derive(Debug, Clone)]
pub struct OrderParams {
    /// Order identifier.
    pub id: OrderId,
    /// Instrument being traded.
    pub symbol: Symbol,
    /// Order side.
    pub side: OrderSide,
    /// Algorithm working the order.
    pub algorithm: Algorithm,
    /// Total volume to execute.
    pub total_volume: Decimal,
    /// Quote-side price captured at admission (ask for buys, bid for sells).
    pub expected_price: Decimal,
    /// Admission timestamp.
    pub created_at: DateTime<Utc>,
}

/// Point-in-time view of an order for status queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderStatusSnapshot {
    /// Order identifier.
    pub order_id: OrderId,
    /// Instrument being traded.
    pub symbol: Symbol,
    /// Order side.
    pub side: OrderSide,
    /// Algorithm working the order.
    pub algorithm: Algorithm,
    /// Current lifecycle status.
    pub status: OrderStatus,
    /// Total volume to execute.
    pub total_volume: Decimal,
    /// Volume filled so far.
    pub filled_volume: Decimal,
    /// Filled volume as a percentage of total.
    pub fill_percentage: Decimal,
    /// Volume-weighted average fill price, once any slice filled.
    pub average_price: Option<Decimal>,
    /// Quote-side price captured at admission.
    pub expected_price: Decimal,
    /// Absolute difference between average and expected price.
    pub slippage: Option<Decimal>,
    /// Number of slices not yet executed.
    pub remaining_slices: usize,
    /// Scheduled time of the next unexecuted slice.
    pub next_slice_at: Option<DateTime<Utc>>,
    /// Times a due slice was deferred to a later tick.
    pub deferrals: u32,
    /// Admission timestamp.
    pub created_at: DateTime<Utc>,
    /// First tick that picked the order up.
    pub started_at: Option<DateTime<Utc>>,
    /// Time the order reached a terminal state.
    pub completed_at: Option<DateTime<Utc>>,
}

/// A parent order worked as a sequence of slices.
///
/// Invariants:
///
/// - Slice volumes always sum to `total_volume` exactly
/// - `filled_volume` never exceeds `total_volume`
/// - `average_price` is the volume-weighted mean of slice fills
/// - Status transitions go through [`OrderStateMachine`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionOrder {
    id: OrderId,
    symbol: Symbol,
    side: OrderSide,
    algorithm: Algorithm,
    total_volume: Decimal,
    expected_price: Decimal,
    status: OrderStatus,
    filled_volume: Decimal,
    average_price: Option<Decimal>,
    slices: Vec<Slice>,
    has_outstanding_slice: bool,
    deferrals: u32,
    created_at: DateTime<Utc>,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
}

impl ExecutionOrder {
    /// Create a pending order with a planned slice schedule.
    #[must_use]
    pub fn new(params: OrderParams, slices: Vec<Slice>) -> Self {
        Self {
            id: params.id,
            symbol: params.symbol,
            side: params.side,
            algorithm: params.algorithm,
            total_volume: params.total_volume,
            expected_price: params.expected_price,
            status: OrderStatus::Pending,
            filled_volume: Decimal::ZERO,
            average_price: None,
            slices,
            has_outstanding_slice: false,
            deferrals: 0,
            created_at: params.created_at,
            started_at: None,
            completed_at: None,
        }
    }

    /// Create an order that failed slice planning before execution.
    #[must_use]
    pub fn failed(params: OrderParams) -> Self {
        let completed_at = params.created_at;
        Self {
            completed_at: Some(completed_at),
            status: OrderStatus::Failed,
            ..Self::new(params, Vec::new())
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Order identifier.
    #[must_use]
    pub const fn id(&self) -> &OrderId {
        &self.id
    }

    /// Instrument being traded.
    #[must_use]
    pub const fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// Order side.
    #[must_use]
    pub const fn side(&self) -> OrderSide {
        self.side
    }

    /// Algorithm working the order.
    #[must_use]
    pub const fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Total volume to execute.
    #[must_use]
    pub const fn total_volume(&self) -> Decimal {
        self.total_volume
    }

    /// Quote-side price captured at admission.
    #[must_use]
    pub const fn expected_price(&self) -> Decimal {
        self.expected_price
    }

    /// Current lifecycle status.
    #[must_use]
    pub const fn status(&self) -> OrderStatus {
        self.status
    }

    /// Volume filled so far.
    #[must_use]
    pub const fn filled_volume(&self) -> Decimal {
        self.filled_volume
    }

    /// Volume-weighted average fill price, once any slice filled.
    #[must_use]
    pub const fn average_price(&self) -> Option<Decimal> {
        self.average_price
    }

    /// Planned slices in schedule order.
    #[must_use]
    pub fn slices(&self) -> &[Slice] {
        &self.slices
    }

    /// True while a dispatched slice awaits its outcome.
    #[must_use]
    pub const fn has_outstanding_slice(&self) -> bool {
        self.has_outstanding_slice
    }

    /// Times a due slice was deferred to a later tick.
    #[must_use]
    pub const fn deferrals(&self) -> u32 {
        self.deferrals
    }

    /// Admission timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// First tick that picked the order up.
    #[must_use]
    pub const fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// Time the order reached a terminal state.
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Volume not yet filled.
    #[must_use]
    pub fn remaining_volume(&self) -> Decimal {
        self.total_volume - self.filled_volume
    }

    /// Filled volume as a percentage of total.
    #[must_use]
    pub fn fill_percentage(&self) -> Decimal {
        if self.total_volume.is_zero() {
            Decimal::ZERO
        } else {
            self.filled_volume / self.total_volume * Decimal::ONE_HUNDRED
        }
    }

    /// Absolute difference between average and expected price.
    #[must_use]
    pub fn slippage(&self) -> Option<Decimal> {
        self.average_price
            .map(|avg| (avg - self.expected_price).abs())
    }

    /// True once filled volume reaches the completion tolerance.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.filled_volume >= self.total_volume * FILL_COMPLETION_RATIO
    }

    // ========================================================================
    // Scheduling
    // ========================================================================

    /// Indices of slices eligible for dispatch at `now`.
    ///
    /// Returns nothing while a previously dispatched slice is still
    /// outstanding, or when the order cannot receive fills. Iceberg
    /// orders reveal at most one slice at a time.
    #[must_use]
    pub fn due_slice_indices(&self, now: DateTime<Utc>) -> Vec<usize> {
        if !self.status.can_fill() || self.has_outstanding_slice {
            return Vec::new();
        }
        let mut due: Vec<usize> = self
            .slices
            .iter()
            .enumerate()
            .filter(|(_, slice)| slice.is_due(now))
            .map(|(index, _)| index)
            .collect();
        if self.algorithm == Algorithm::Iceberg {
            due.truncate(1);
        }
        due
    }

    /// Scheduled time of the next unexecuted slice.
    #[must_use]
    pub fn next_slice_at(&self) -> Option<DateTime<Utc>> {
        self.slices
            .iter()
            .find(|slice| !slice.executed)
            .map(|slice| slice.scheduled_time)
    }

    /// Number of slices not yet executed.
    #[must_use]
    pub fn remaining_slices(&self) -> usize {
        self.slices.iter().filter(|slice| !slice.executed).count()
    }

    /// Mark that slices of this order are in flight at the broker.
    pub fn mark_dispatched(&mut self) {
        self.has_outstanding_slice = true;
    }

    /// Clear the outstanding-slice marker once outcomes are applied.
    pub fn clear_outstanding(&mut self) {
        self.has_outstanding_slice = false;
    }

    /// Count a deferred slice for observability.
    pub fn record_deferral(&mut self) {
        self.deferrals += 1;
    }

    // ========================================================================
    // State Transitions
    // ========================================================================

    /// Move the order from `Pending` to `Executing`.
    ///
    /// # Errors
    ///
    /// Returns error if the order is not pending.
    pub fn begin_executing(&mut self, now: DateTime<Utc>) -> Result<(), OrderError> {
        OrderStateMachine::validate_transition(self.status, OrderStatus::Executing)?;
        self.status = OrderStatus::Executing;
        self.started_at = Some(now);
        Ok(())
    }

    /// Apply a broker fill for one slice.
    ///
    /// Updates the filled volume and the volume-weighted average price,
    /// then advances the status. A fill arriving after cancellation, or
    /// after an earlier fill already crossed the completion tolerance,
    /// is recorded without changing the terminal status. Returns `true`
    /// when this fill moved the order into `Filled`.
    ///
    /// # Errors
    ///
    /// Returns error if the status cannot accept fills, the slice index
    /// is unknown, the slice already executed, or the fill would exceed
    /// the order total.
    pub fn apply_fill(
        &mut self,
        slice_index: usize,
        price: Decimal,
        ticket: TicketId,
        now: DateTime<Utc>,
    ) -> Result<bool, OrderError> {
        // A slice dispatched before the order went terminal may still
        // fill. The volume is kept; the terminal status is not.
        let absorb_only = matches!(
            self.status,
            OrderStatus::Cancelled | OrderStatus::Filled
        );
        if !absorb_only {
            OrderStateMachine::validate_transition(self.status, OrderStatus::PartialFill)?;
        }

        let slice = self
            .slices
            .get_mut(slice_index)
            .ok_or(OrderError::UnknownSlice { index: slice_index })?;
        if slice.executed {
            return Err(OrderError::SliceAlreadyExecuted { index: slice_index });
        }

        let volume = slice.volume;
        let remaining = self.total_volume - self.filled_volume;
        if volume > remaining {
            return Err(OrderError::FillExceedsTotal {
                fill_volume: volume.to_string(),
                remaining: remaining.to_string(),
            });
        }

        slice.mark_executed(price, ticket);
        self.average_price = Some(match self.average_price {
            Some(avg) => {
                (avg * self.filled_volume + price * volume) / (self.filled_volume + volume)
            }
            None => price,
        });
        self.filled_volume += volume;

        if absorb_only {
            return Ok(false);
        }

        let target = if self.is_complete() {
            OrderStatus::Filled
        } else {
            OrderStatus::PartialFill
        };
        OrderStateMachine::validate_transition(self.status, target)?;
        self.status = target;
        if target == OrderStatus::Filled {
            self.completed_at = Some(now);
            return Ok(true);
        }
        Ok(false)
    }

    /// Cancel the order.
    ///
    /// Returns `false` if the order is already terminal. Filled volume
    /// is retained; unexecuted slices will never be dispatched.
    pub fn cancel(&mut self, now: DateTime<Utc>) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = OrderStatus::Cancelled;
        self.completed_at = Some(now);
        true
    }

    /// Build a point-in-time status snapshot.
    #[must_use]
    pub fn snapshot(&self) -> OrderStatusSnapshot {
        OrderStatusSnapshot {
            order_id: self.id.clone(),
            symbol: self.symbol.clone(),
            side: self.side,
            algorithm: self.algorithm,
            status: self.status,
            total_volume: self.total_volume,
            filled_volume: self.filled_volume,
            fill_percentage: self.fill_percentage(),
            average_price: self.average_price,
            expected_price: self.expected_price,
            slippage: self.slippage(),
            remaining_slices: self.remaining_slices(),
            next_slice_at: self.next_slice_at(),
            deferrals: self.deferrals,
            created_at: self.created_at,
            started_at: self.started_at,
            completed_at: self.completed_at,
        }
    }
}
