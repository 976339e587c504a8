//! Broker Gateway Port (Driven Port)
//!
//! Interface for market data and market order submission. The engine
//! never talks to broker wire protocols directly; adapters implement
//! this trait.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::execution::OrderSide;
use crate::domain::shared::{Symbol, TicketId};

/// Two-sided quote for an instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    /// Best bid price.
    pub bid: Decimal,
    /// Best ask price.
    pub ask: Decimal,
}

impl Quote {
    /// Create a quote.
    #[must_use]
    pub const fn new(bid: Decimal, ask: Decimal) -> Self {
        Self { bid, ask }
    }

    /// Absolute spread between ask and bid.
    #[must_use]
    pub fn spread(&self) -> Decimal {
        self.ask - self.bid
    }

    /// Spread expressed in pips for the given point size.
    #[must_use]
    pub fn spread_pips(&self, point: Decimal) -> Decimal {
        if point <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        self.spread() / point
    }

    /// Price a market order is expected to fill at for `side`.
    #[must_use]
    pub const fn side_price(&self, side: OrderSide) -> Decimal {
        match side {
            OrderSide::Buy => self.ask,
            OrderSide::Sell => self.bid,
        }
    }
}

/// Static trading attributes of an instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolInfo {
    /// Smallest price increment (pip size for slippage math).
    pub point: Decimal,
    /// Minimum tradeable lot.
    pub min_lot: Decimal,
    /// Maximum tradeable lot per submission.
    pub max_lot: Decimal,
}

impl SymbolInfo {
    /// Create symbol info.
    #[must_use]
    pub const fn new(point: Decimal, min_lot: Decimal, max_lot: Decimal) -> Self {
        Self {
            point,
            min_lot,
            max_lot,
        }
    }
}

/// Request to submit one slice as a market order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketOrderRequest {
    /// Symbol to trade.
    pub symbol: Symbol,
    /// Order side.
    pub side: OrderSide,
    /// Volume of this slice.
    pub volume: Decimal,
    /// Quote price observed when the slice was dispatched.
    pub reference_price: Decimal,
    /// Maximum acceptable deviation from the reference, in pips.
    pub max_deviation_pips: Decimal,
}

impl MarketOrderRequest {
    /// Create a market order request.
    #[must_use]
    pub const fn new(
        symbol: Symbol,
        side: OrderSide,
        volume: Decimal,
        reference_price: Decimal,
        max_deviation_pips: Decimal,
    ) -> Self {
        Self {
            symbol,
            side,
            volume,
            reference_price,
            max_deviation_pips,
        }
    }
}

/// Broker confirmation for an executed market order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokerFill {
    /// Broker-assigned ticket for the execution.
    pub ticket: TicketId,
    /// Price the order filled at.
    pub filled_price: Decimal,
}

impl BrokerFill {
    /// Create a broker fill.
    #[must_use]
    pub const fn new(ticket: TicketId, filled_price: Decimal) -> Self {
        Self {
            ticket,
            filled_price,
        }
    }
}

/// Errors returned by broker gateway implementations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// No quote is currently available for the symbol.
    #[error("No quote available for {symbol}")]
    NoQuote {
        /// Symbol that has no quote.
        symbol: String,
    },

    /// The broker does not know the symbol.
    #[error("Unknown symbol: {symbol}")]
    UnknownSymbol {
        /// Symbol the broker could not resolve.
        symbol: String,
    },

    /// The broker rejected the submission.
    #[error("Order rejected: {reason}")]
    Rejected {
        /// Rejection reason.
        reason: String,
    },

    /// Transport-level failure talking to the broker.
    #[error("Gateway connection error: {message}")]
    Connection {
        /// Error details.
        message: String,
    },
}

/// Gateway to the broker for quotes, symbol metadata, and fills.
#[async_trait]
pub trait BrokerGateway: Send + Sync {
    /// Get the current two-sided quote for a symbol.
    async fn quote(&self, symbol: &Symbol) -> Result<Quote, GatewayError>;

    /// Get static trading attributes for a symbol.
    async fn symbol_info(&self, symbol: &Symbol) -> Result<SymbolInfo, GatewayError>;

    /// Submit one slice as a market order and wait for the outcome.
    async fn submit_market_order(
        &self,
        request: MarketOrderRequest,
    ) -> Result<BrokerFill, GatewayError>;
}
