//! Paper broker adapter implementing `BrokerGateway`.
//!
//! In-memory simulated broker for development and tests. Quotes are
//! set by hand, market orders fill instantly at the current quote, and
//! rejection behavior can be toggled to exercise deferral paths.

use async_trait::async_trait;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::application::ports::{
    BrokerFill, BrokerGateway, GatewayError, MarketOrderRequest, Quote, SymbolInfo,
};
use crate::domain::shared::{Symbol, TicketId};

/// Simulated broker backed by in-memory quote and symbol tables.
///
/// Fills happen at the quoted price for the requested side. Volumes
/// outside the symbol's lot bounds are rejected, as is a fill whose
/// price has drifted from the request's reference price by more than
/// the allowed deviation.
#[derive(Debug, Default)]
pub struct PaperBroker {
    symbols: Mutex<HashMap<Symbol, SymbolInfo>>,
    quotes: Mutex<HashMap<Symbol, Quote>>,
    rejection: Mutex<Option<String>>,
    ticket_seq: AtomicU64,
    submissions: Mutex<Vec<MarketOrderRequest>>,
}

impl PaperBroker {
    /// Create an empty paper broker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tradeable symbol.
    pub fn register_symbol(&self, symbol: Symbol, info: SymbolInfo) {
        self.symbols.lock().insert(symbol, info);
    }

    /// Publish a quote for a symbol.
    pub fn set_quote(&self, symbol: Symbol, quote: Quote) {
        self.quotes.lock().insert(symbol, quote);
    }

    /// Remove the quote for a symbol, simulating a quote outage.
    pub fn clear_quote(&self, symbol: &Symbol) {
        self.quotes.lock().remove(symbol);
    }

    /// Reject all subsequent submissions with `reason`.
    pub fn reject_submissions(&self, reason: impl Into<String>) {
        *self.rejection.lock() = Some(reason.into());
    }

    /// Accept submissions again after [`Self::reject_submissions`].
    pub fn accept_submissions(&self) {
        *self.rejection.lock() = None;
    }

    /// Every order request received so far, in submission order.
    #[must_use]
    pub fn submissions(&self) -> Vec<MarketOrderRequest> {
        self.submissions.lock().clone()
    }

    fn next_ticket(&self) -> TicketId {
        let seq = self.ticket_seq.fetch_add(1, Ordering::SeqCst) + 1;
        TicketId::new(format!("PT-{seq}"))
    }
}

#[async_trait]
impl BrokerGateway for PaperBroker {
    async fn quote(&self, symbol: &Symbol) -> Result<Quote, GatewayError> {
        self.quotes
            .lock()
            .get(symbol)
            .copied()
            .ok_or_else(|| GatewayError::NoQuote {
                symbol: symbol.to_string(),
            })
    }

    async fn symbol_info(&self, symbol: &Symbol) -> Result<SymbolInfo, GatewayError> {
        self.symbols
            .lock()
            .get(symbol)
            .copied()
            .ok_or_else(|| GatewayError::UnknownSymbol {
                symbol: symbol.to_string(),
            })
    }

    async fn submit_market_order(
        &self,
        request: MarketOrderRequest,
    ) -> Result<BrokerFill, GatewayError> {
        self.submissions.lock().push(request.clone());

        if let Some(reason) = self.rejection.lock().clone() {
            return Err(GatewayError::Rejected { reason });
        }

        let info = self.symbol_info(&request.symbol).await?;
        let quote = self.quote(&request.symbol).await?;
        let fill_price = quote.side_price(request.side);

        if request.volume < info.min_lot || request.volume > info.max_lot {
            return Err(GatewayError::Rejected {
                reason: format!(
                    "volume {} outside lot bounds [{}, {}]",
                    request.volume, info.min_lot, info.max_lot
                ),
            });
        }

        // Reject fills that drifted too far from the caller's reference.
        if info.point > Decimal::ZERO {
            let deviation_pips = (fill_price - request.reference_price).abs() / info.point;
            if deviation_pips > request.max_deviation_pips {
                return Err(GatewayError::Rejected {
                    reason: format!(
                        "requote: price moved {deviation_pips} pips from reference"
                    ),
                });
            }
        }

        let ticket = self.next_ticket();
        tracing::debug!(
            ticket = %ticket,
            symbol = %request.symbol,
            side = %request.side,
            volume = %request.volume,
            fill_price = %fill_price,
            "Paper fill"
        );
        Ok(BrokerFill::new(ticket, fill_price))
    }
}
