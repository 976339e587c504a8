//! Execution Scheduler Service
//!
//! Background service that works admitted orders slice by slice. Each
//! tick runs in four phases:
//!
//! 1. Snapshot due slices under the registry lock
//! 2. Execute them at the broker with no lock held
//! 3. Apply fills and deferrals back under the lock
//! 4. Fire completion callbacks with no lock held
//!
//! Unexecutable slices (missing quote, wide spread, broker rejection)
//! are deferred, not failed: they stay scheduled and are retried on a
//! later tick. Orders never expire.

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::application::ports::{BrokerGateway, GatewayError, MarketOrderRequest, SymbolInfo};
use crate::domain::execution::{
    Algorithm, ExecutionOrder, OrderParams, OrderSide, OrderStatus, OrderStatusSnapshot,
};
use crate::domain::planning::{PlanConstraints, PlanParams, plan_slices};
use crate::domain::shared::{DomainError, OrderId, Symbol, TicketId};
use crate::observability;

/// Spread threshold multiplier. A slice is deferred when the current
/// spread exceeds this multiple of the slippage budget.
const WIDE_SPREAD_MULTIPLIER: Decimal = Decimal::TWO;

/// Configuration for the execution scheduler.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Interval between scheduler ticks.
    pub tick_interval: Duration,
    /// Algorithm used when a request names none.
    pub default_algorithm: Algorithm,
    /// Slippage budget per slice, in pips.
    pub max_slippage_pips: Decimal,
    /// Smallest volume worth submitting as its own slice.
    pub min_slice_volume: Decimal,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(1000),
            default_algorithm: Algorithm::Market,
            max_slippage_pips: Decimal::new(20, 0),
            min_slice_volume: Decimal::new(1, 2), // 0.01
        }
    }
}

/// Request to execute an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    /// Instrument to trade.
    pub symbol: Symbol,
    /// Order side.
    pub side: OrderSide,
    /// Total volume to execute.
    pub total_volume: Decimal,
    /// Algorithm parameters; the configured default applies when absent.
    pub params: Option<PlanParams>,
}

impl OrderRequest {
    /// Create a request that uses the configured default algorithm.
    #[must_use]
    pub const fn new(symbol: Symbol, side: OrderSide, total_volume: Decimal) -> Self {
        Self {
            symbol,
            side,
            total_volume,
            params: None,
        }
    }

    /// Set explicit algorithm parameters.
    #[must_use]
    pub fn with_params(mut self, params: PlanParams) -> Self {
        self.params = Some(params);
        self
    }
}

/// Errors surfaced at order submission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    /// Total volume was zero or negative.
    #[error("Total volume must be positive, got {volume}")]
    InvalidVolume {
        /// Offending volume.
        volume: Decimal,
    },

    /// Symbol failed validation.
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(#[from] DomainError),

    /// The gateway could not resolve the symbol.
    #[error("Unknown symbol: {symbol}")]
    UnknownSymbol {
        /// Symbol the gateway could not resolve.
        symbol: String,
    },

    /// No quote was available to anchor the expected price.
    #[error("No quote available for {symbol}")]
    NoQuote {
        /// Symbol with no quote.
        symbol: String,
    },
}

/// Notification fired when an order reaches the completion tolerance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillNotification {
    /// Order that completed.
    pub order_id: OrderId,
    /// Instrument traded.
    pub symbol: Symbol,
    /// Order side.
    pub side: OrderSide,
    /// Total volume filled.
    pub filled_volume: Decimal,
    /// Volume-weighted average fill price.
    pub average_price: Decimal,
    /// Absolute difference between average and expected price.
    pub slippage: Decimal,
}

type FillCallback = Arc<dyn Fn(&FillNotification) + Send + Sync>;

/// One slice selected for dispatch during a tick.
struct SliceDispatch {
    order_id: OrderId,
    symbol: Symbol,
    side: OrderSide,
    slice_index: usize,
    volume: Decimal,
}

/// Why a due slice was not executed this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeferReason {
    NoQuote,
    WideSpread,
    Rejected,
}

impl DeferReason {
    const fn as_str(self) -> &'static str {
        match self {
            Self::NoQuote => "no_quote",
            Self::WideSpread => "wide_spread",
            Self::Rejected => "rejected",
        }
    }
}

enum SliceOutcome {
    Executed { price: Decimal, ticket: TicketId },
    Deferred(DeferReason),
}

/// Background scheduler that admits orders and works their slices.
pub struct ExecutionScheduler<G: BrokerGateway> {
    config: SchedulerConfig,
    gateway: Arc<G>,
    orders: Arc<Mutex<HashMap<OrderId, ExecutionOrder>>>,
    symbol_meta: Arc<RwLock<HashMap<Symbol, SymbolInfo>>>,
    callbacks: Arc<RwLock<Vec<FillCallback>>>,
    shutdown: CancellationToken,
}

impl<G: BrokerGateway> Clone for ExecutionScheduler<G> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            gateway: Arc::clone(&self.gateway),
            orders: Arc::clone(&self.orders),
            symbol_meta: Arc::clone(&self.symbol_meta),
            callbacks: Arc::clone(&self.callbacks),
            shutdown: self.shutdown.clone(),
        }
    }
}

impl<G: BrokerGateway + 'static> ExecutionScheduler<G> {
    /// Create a scheduler with default configuration.
    #[must_use]
    pub fn new(gateway: Arc<G>, shutdown: CancellationToken) -> Self {
        Self::with_config(SchedulerConfig::default(), gateway, shutdown)
    }

    /// Create a scheduler with explicit configuration.
    #[must_use]
    pub fn with_config(
        config: SchedulerConfig,
        gateway: Arc<G>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            config,
            gateway,
            orders: Arc::new(Mutex::new(HashMap::new())),
            symbol_meta: Arc::new(RwLock::new(HashMap::new())),
            callbacks: Arc::new(RwLock::new(Vec::new())),
            shutdown,
        }
    }

    /// Scheduler configuration.
    #[must_use]
    pub const fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Broker gateway the scheduler executes through.
    #[must_use]
    pub const fn gateway(&self) -> &Arc<G> {
        &self.gateway
    }

    /// Register a callback fired once per completed order.
    pub fn register_on_fill(&self, callback: impl Fn(&FillNotification) + Send + Sync + 'static) {
        self.callbacks.write().push(Arc::new(callback));
    }

    /// Admit an order for execution.
    ///
    /// Captures the expected price from the current quote, plans the
    /// slice schedule, and stores the order for the tick loop. Orders
    /// whose parameters fail planning are stored as `Failed` so their
    /// status stays queryable.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError`] if the volume is not positive, the
    /// symbol is malformed or unknown, or no quote is available.
    pub async fn submit_order(&self, request: OrderRequest) -> Result<OrderId, SubmitError> {
        if request.total_volume <= Decimal::ZERO {
            return Err(SubmitError::InvalidVolume {
                volume: request.total_volume,
            });
        }
        request.symbol.validate()?;

        let info = self
            .gateway
            .symbol_info(&request.symbol)
            .await
            .map_err(|err| {
                tracing::warn!(symbol = %request.symbol, error = %err, "Symbol lookup failed");
                SubmitError::UnknownSymbol {
                    symbol: request.symbol.to_string(),
                }
            })?;
        let quote = self.gateway.quote(&request.symbol).await.map_err(|err| {
            tracing::warn!(symbol = %request.symbol, error = %err, "No quote at submission");
            SubmitError::NoQuote {
                symbol: request.symbol.to_string(),
            }
        })?;

        self.symbol_meta.write().insert(request.symbol.clone(), info);

        let params = request
            .params
            .unwrap_or_else(|| PlanParams::default_for(self.config.default_algorithm));
        let algorithm = params.algorithm();
        let now = Utc::now();
        let id = OrderId::generate();
        let order_params = OrderParams {
            id: id.clone(),
            symbol: request.symbol,
            side: request.side,
            algorithm,
            total_volume: request.total_volume,
            expected_price: quote.side_price(request.side),
            created_at: now,
        };

        let constraints = PlanConstraints::new(self.config.min_slice_volume, info.min_lot);
        let order = match plan_slices(request.total_volume, &params, &constraints, now) {
            Ok(slices) => {
                tracing::info!(
                    order_id = %id,
                    symbol = %order_params.symbol,
                    side = %order_params.side,
                    algorithm = %algorithm,
                    volume = %request.total_volume,
                    slices = slices.len(),
                    "Order admitted"
                );
                ExecutionOrder::new(order_params, slices)
            }
            Err(err) => {
                tracing::warn!(
                    order_id = %id,
                    algorithm = %algorithm,
                    error = %err,
                    "Slice planning rejected order"
                );
                ExecutionOrder::failed(order_params)
            }
        };

        self.orders.lock().insert(id.clone(), order);
        observability::record_order_submitted(algorithm.as_str());
        Ok(id)
    }

    /// Cancel an order.
    ///
    /// Returns `false` if the order is unknown or already terminal.
    /// Already-filled volume is retained; a slice in flight may still
    /// fill and is recorded without resurrecting the order.
    pub fn cancel_order(&self, order_id: &OrderId) -> bool {
        let cancelled = {
            let mut orders = self.orders.lock();
            orders
                .get_mut(order_id)
                .is_some_and(|order| order.cancel(Utc::now()))
        };
        if cancelled {
            tracing::info!(order_id = %order_id, "Order cancelled");
            observability::record_order_cancelled();
        }
        cancelled
    }

    /// Status snapshot for one order, if known.
    #[must_use]
    pub fn order_status(&self, order_id: &OrderId) -> Option<OrderStatusSnapshot> {
        self.orders.lock().get(order_id).map(ExecutionOrder::snapshot)
    }

    /// Snapshots of all orders still being worked.
    #[must_use]
    pub fn active_orders(&self) -> Vec<OrderStatusSnapshot> {
        self.orders
            .lock()
            .values()
            .filter(|order| order.status().is_active())
            .map(ExecutionOrder::snapshot)
            .collect()
    }

    /// Start the background tick loop.
    pub fn start(&self) {
        let scheduler = self.clone();
        let shutdown = self.shutdown.clone();
        let tick_interval = self.config.tick_interval;

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick_interval);
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        scheduler.run_tick().await;
                    }
                    () = shutdown.cancelled() => {
                        tracing::info!("Execution scheduler shutting down");
                        break;
                    }
                }
            }
        });
    }

    /// Run one tick at the current wall clock.
    pub async fn run_tick(&self) {
        self.tick_at(Utc::now()).await;
    }

    /// Run one tick as of `now`.
    pub async fn tick_at(&self, now: DateTime<Utc>) {
        // Phase 1: snapshot due work under the lock.
        let dispatches: Vec<SliceDispatch> = {
            let mut orders = self.orders.lock();
            let mut due_slices = Vec::new();
            for order in orders.values_mut() {
                if order.status() == OrderStatus::Pending {
                    if let Err(err) = order.begin_executing(now) {
                        tracing::error!(order_id = %order.id(), error = %err, "Failed to start order");
                        continue;
                    }
                    tracing::debug!(order_id = %order.id(), "Order picked up for execution");
                }
                let due = order.due_slice_indices(now);
                if due.is_empty() {
                    continue;
                }
                order.mark_dispatched();
                for slice_index in due {
                    due_slices.push(SliceDispatch {
                        order_id: order.id().clone(),
                        symbol: order.symbol().clone(),
                        side: order.side(),
                        slice_index,
                        volume: order.slices()[slice_index].volume,
                    });
                }
            }
            due_slices
        };

        if dispatches.is_empty() {
            return;
        }

        // Phase 2: broker I/O with no lock held.
        let mut outcomes = Vec::with_capacity(dispatches.len());
        for dispatch in dispatches {
            let outcome = self.execute_slice(&dispatch).await;
            outcomes.push((dispatch, outcome));
        }

        // Phase 3: apply outcomes under the lock.
        let mut notifications = Vec::new();
        {
            let mut orders = self.orders.lock();
            for (dispatch, outcome) in outcomes {
                let Some(order) = orders.get_mut(&dispatch.order_id) else {
                    continue;
                };
                order.clear_outstanding();
                match outcome {
                    SliceOutcome::Executed { price, ticket } => {
                        observability::record_slice_executed(dispatch.symbol.as_str());
                        match order.apply_fill(dispatch.slice_index, price, ticket, now) {
                            Ok(true) => {
                                observability::record_order_filled(order.algorithm().as_str());
                                let average_price =
                                    order.average_price().unwrap_or(order.expected_price());
                                tracing::info!(
                                    order_id = %order.id(),
                                    filled_volume = %order.filled_volume(),
                                    average_price = %average_price,
                                    "Order filled"
                                );
                                notifications.push(FillNotification {
                                    order_id: order.id().clone(),
                                    symbol: order.symbol().clone(),
                                    side: order.side(),
                                    filled_volume: order.filled_volume(),
                                    average_price,
                                    slippage: order.slippage().unwrap_or(Decimal::ZERO),
                                });
                            }
                            Ok(false) => {}
                            Err(err) => {
                                tracing::error!(
                                    order_id = %order.id(),
                                    slice = dispatch.slice_index,
                                    error = %err,
                                    "Failed to apply fill"
                                );
                            }
                        }
                    }
                    SliceOutcome::Deferred(reason) => {
                        order.record_deferral();
                        observability::record_slice_deferred(
                            dispatch.symbol.as_str(),
                            reason.as_str(),
                        );
                    }
                }
            }
        }

        // Phase 4: completion callbacks with no lock held.
        if notifications.is_empty() {
            return;
        }
        let callbacks = self.callbacks.read().clone();
        for notification in &notifications {
            for callback in &callbacks {
                callback(notification);
            }
        }
    }

    /// Execute one dispatched slice at the broker.
    async fn execute_slice(&self, dispatch: &SliceDispatch) -> SliceOutcome {
        let quote = match self.gateway.quote(&dispatch.symbol).await {
            Ok(quote) => quote,
            Err(err) => {
                tracing::debug!(
                    order_id = %dispatch.order_id,
                    error = %err,
                    "Deferring slice: no quote"
                );
                return SliceOutcome::Deferred(DeferReason::NoQuote);
            }
        };

        let spread_pips = quote.spread_pips(self.symbol_point(&dispatch.symbol));
        if spread_pips > self.config.max_slippage_pips * WIDE_SPREAD_MULTIPLIER {
            tracing::debug!(
                order_id = %dispatch.order_id,
                spread_pips = %spread_pips,
                "Deferring slice: spread too wide"
            );
            return SliceOutcome::Deferred(DeferReason::WideSpread);
        }

        let request = MarketOrderRequest::new(
            dispatch.symbol.clone(),
            dispatch.side,
            dispatch.volume,
            quote.side_price(dispatch.side),
            self.config.max_slippage_pips,
        );
        match self.gateway.submit_market_order(request).await {
            Ok(fill) => SliceOutcome::Executed {
                price: fill.filled_price,
                ticket: fill.ticket,
            },
            Err(GatewayError::NoQuote { .. }) => SliceOutcome::Deferred(DeferReason::NoQuote),
            Err(err) => {
                tracing::warn!(
                    order_id = %dispatch.order_id,
                    error = %err,
                    "Deferring slice: broker rejected"
                );
                SliceOutcome::Deferred(DeferReason::Rejected)
            }
        }
    }

    fn symbol_point(&self, symbol: &Symbol) -> Decimal {
        self.symbol_meta
            .read()
            .get(symbol)
            .map_or(Decimal::ZERO, |info| info.point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::planning::TwapParams;
    use crate::infrastructure::paper::PaperBroker;
    use rust_decimal_macros::dec;

    fn gold_broker() -> Arc<PaperBroker> {
        let broker = PaperBroker::new();
        broker.register_symbol(
            Symbol::new("XAUUSD"),
            SymbolInfo::new(dec!(0.1), dec!(0.01), dec!(100)),
        );
        broker.set_quote(
            Symbol::new("XAUUSD"),
            crate::application::ports::Quote::new(dec!(2649.8), dec!(2650.0)),
        );
        Arc::new(broker)
    }

    fn scheduler(broker: Arc<PaperBroker>) -> ExecutionScheduler<PaperBroker> {
        ExecutionScheduler::new(broker, CancellationToken::new())
    }

    #[tokio::test]
    async fn submit_stores_pending_order() {
        let scheduler = scheduler(gold_broker());
        let request = OrderRequest::new(Symbol::new("XAUUSD"), OrderSide::Buy, dec!(1.0))
            .with_params(PlanParams::Twap(TwapParams::new(10, 5)));

        let id = scheduler.submit_order(request).await.unwrap();
        let snapshot = scheduler.order_status(&id).unwrap();

        assert_eq!(snapshot.status, OrderStatus::Pending);
        assert_eq!(snapshot.total_volume, dec!(1.0));
        assert_eq!(snapshot.remaining_slices, 5);
        assert_eq!(snapshot.expected_price, dec!(2650.0));
    }

    #[tokio::test]
    async fn submit_without_params_uses_default_algorithm() {
        let scheduler = scheduler(gold_broker());
        let request = OrderRequest::new(Symbol::new("XAUUSD"), OrderSide::Sell, dec!(0.5));

        let id = scheduler.submit_order(request).await.unwrap();
        let snapshot = scheduler.order_status(&id).unwrap();

        assert_eq!(snapshot.algorithm, Algorithm::Market);
        assert_eq!(snapshot.remaining_slices, 1);
        // Sells anchor to the bid.
        assert_eq!(snapshot.expected_price, dec!(2649.8));
    }

    #[tokio::test]
    async fn submit_rejects_non_positive_volume() {
        let scheduler = scheduler(gold_broker());
        let request = OrderRequest::new(Symbol::new("XAUUSD"), OrderSide::Buy, Decimal::ZERO);

        let result = scheduler.submit_order(request).await;
        assert_eq!(
            result,
            Err(SubmitError::InvalidVolume {
                volume: Decimal::ZERO
            })
        );
    }

    #[tokio::test]
    async fn submit_rejects_malformed_symbol() {
        let scheduler = scheduler(gold_broker());
        let request = OrderRequest::new(Symbol::new("XAU/USD"), OrderSide::Buy, dec!(1.0));

        let result = scheduler.submit_order(request).await;
        assert!(matches!(result, Err(SubmitError::InvalidSymbol(_))));
    }

    #[tokio::test]
    async fn submit_rejects_unknown_symbol() {
        let scheduler = scheduler(gold_broker());
        let request = OrderRequest::new(Symbol::new("EURUSD"), OrderSide::Buy, dec!(1.0));

        let result = scheduler.submit_order(request).await;
        assert!(matches!(result, Err(SubmitError::UnknownSymbol { .. })));
    }

    #[tokio::test]
    async fn submit_rejects_when_no_quote() {
        let broker = gold_broker();
        broker.clear_quote(&Symbol::new("XAUUSD"));
        let scheduler = scheduler(broker);
        let request = OrderRequest::new(Symbol::new("XAUUSD"), OrderSide::Buy, dec!(1.0));

        let result = scheduler.submit_order(request).await;
        assert!(matches!(result, Err(SubmitError::NoQuote { .. })));
    }

    #[tokio::test]
    async fn degenerate_params_store_failed_order() {
        let scheduler = scheduler(gold_broker());
        let request = OrderRequest::new(Symbol::new("XAUUSD"), OrderSide::Buy, dec!(1.0))
            .with_params(PlanParams::Twap(TwapParams::new(0, 5)));

        let id = scheduler.submit_order(request).await.unwrap();
        let snapshot = scheduler.order_status(&id).unwrap();

        assert_eq!(snapshot.status, OrderStatus::Failed);
        assert_eq!(snapshot.remaining_slices, 0);
    }

    #[tokio::test]
    async fn cancel_unknown_order_returns_false() {
        let scheduler = scheduler(gold_broker());
        assert!(!scheduler.cancel_order(&OrderId::new("missing")));
    }

    #[tokio::test]
    async fn active_orders_excludes_terminal() {
        let scheduler = scheduler(gold_broker());
        let keep = scheduler
            .submit_order(OrderRequest::new(Symbol::new("XAUUSD"), OrderSide::Buy, dec!(0.5)))
            .await
            .unwrap();
        let drop = scheduler
            .submit_order(OrderRequest::new(Symbol::new("XAUUSD"), OrderSide::Buy, dec!(0.5)))
            .await
            .unwrap();
        assert!(scheduler.cancel_order(&drop));

        let active = scheduler.active_orders();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].order_id, keep);
    }

    #[tokio::test]
    async fn cancel_is_idempotent_on_terminal_orders() {
        let scheduler = scheduler(gold_broker());
        let id = scheduler
            .submit_order(OrderRequest::new(Symbol::new("XAUUSD"), OrderSide::Buy, dec!(0.5)))
            .await
            .unwrap();

        assert!(scheduler.cancel_order(&id));
        assert!(!scheduler.cancel_order(&id));
    }
}
