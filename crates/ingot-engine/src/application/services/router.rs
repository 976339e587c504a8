//! Smart Order Router Service
//!
//! Decision layer in front of the scheduler. Turns a high-level request
//! (symbol, side, volume, urgency) into an algorithm choice with derived
//! parameters, then delegates to [`ExecutionScheduler::submit_order`].
//!
//! Rules are evaluated in order, first match wins:
//!
//! 1. High urgency executes at market, whatever the size.
//! 2. Large orders are always sliced: VWAP inside the high-liquidity
//!    session window, TWAP outside it.
//! 3. A wide spread routes to TWAP to work the order passively.
//! 4. Everything else executes at market.

use chrono::{DateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::application::ports::BrokerGateway;
use crate::application::services::scheduler::{
    ExecutionScheduler, OrderRequest, SubmitError,
};
use crate::domain::execution::{Algorithm, OrderSide};
use crate::domain::planning::{IcebergParams, PlanParams, TwapParams, VwapParams};
use crate::domain::shared::{OrderId, Symbol};

/// Configuration for the smart order router.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Volume at or above which an order is always sliced.
    pub large_order_threshold: Decimal,
    /// Spread (in pips) above which small orders are worked passively.
    pub high_spread_pips: Decimal,
    /// Start of the high-liquidity session window (UTC).
    pub session_start: NaiveTime,
    /// End of the high-liquidity session window (UTC).
    pub session_end: NaiveTime,
    /// Slice count for an order right at the large-order threshold.
    pub base_slice_count: u32,
    /// Upper bound on derived slice counts.
    pub max_slice_count: u32,
    /// Execution window for an order right at the large-order threshold.
    pub base_duration_minutes: u32,
    /// Upper bound on derived execution windows.
    pub max_duration_minutes: u32,
    /// Fraction of total volume shown per iceberg peak.
    pub iceberg_visible_fraction: Decimal,
    /// Floor for derived iceberg peak volumes.
    pub min_slice_volume: Decimal,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            large_order_threshold: Decimal::ONE,
            high_spread_pips: Decimal::new(30, 0),
            session_start: NaiveTime::from_hms_opt(7, 0, 0).unwrap_or_default(),
            session_end: NaiveTime::from_hms_opt(16, 0, 0).unwrap_or_default(),
            base_slice_count: 4,
            max_slice_count: 12,
            base_duration_minutes: 10,
            max_duration_minutes: 60,
            iceberg_visible_fraction: Decimal::new(15, 2), // 0.15
            min_slice_volume: Decimal::new(1, 2),          // 0.01
        }
    }
}

/// Caller-supplied execution urgency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    /// Minimize market impact; slicing is acceptable.
    Normal,
    /// Immediacy dominates cost; execute at market.
    High,
}

impl std::fmt::Display for Urgency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "normal"),
            Self::High => write!(f, "high"),
        }
    }
}

/// High-level request routed to an algorithm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRequest {
    /// Instrument to trade.
    pub symbol: Symbol,
    /// Order side.
    pub side: OrderSide,
    /// Total volume to execute.
    pub total_volume: Decimal,
    /// Execution urgency.
    pub urgency: Urgency,
}

impl RouteRequest {
    /// Create a routing request.
    #[must_use]
    pub const fn new(
        symbol: Symbol,
        side: OrderSide,
        total_volume: Decimal,
        urgency: Urgency,
    ) -> Self {
        Self {
            symbol,
            side,
            total_volume,
            urgency,
        }
    }
}

/// Outcome of the routing rules for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutingDecision {
    /// Chosen algorithm.
    pub algorithm: Algorithm,
    /// Derived parameters handed to the planner.
    pub params: PlanParams,
}

impl RoutingDecision {
    fn from_params(params: PlanParams) -> Self {
        Self {
            algorithm: params.algorithm(),
            params,
        }
    }
}

/// Routes orders to an execution algorithm and submits them.
pub struct SmartOrderRouter<G: BrokerGateway> {
    config: RouterConfig,
    scheduler: ExecutionScheduler<G>,
}

impl<G: BrokerGateway + 'static> SmartOrderRouter<G> {
    /// Create a router in front of `scheduler`.
    #[must_use]
    pub const fn new(config: RouterConfig, scheduler: ExecutionScheduler<G>) -> Self {
        Self { config, scheduler }
    }

    /// Router configuration.
    #[must_use]
    pub const fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Route a request and submit the resulting order.
    ///
    /// Reads the current quote to measure the spread, applies the
    /// decision rules, and delegates to the scheduler.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError`] if the symbol is unknown, no quote is
    /// available, or the scheduler rejects the submission.
    pub async fn submit(&self, request: RouteRequest) -> Result<OrderId, SubmitError> {
        let gateway = self.scheduler.gateway();
        let info = gateway.symbol_info(&request.symbol).await.map_err(|_| {
            SubmitError::UnknownSymbol {
                symbol: request.symbol.to_string(),
            }
        })?;
        let quote = gateway.quote(&request.symbol).await.map_err(|_| {
            SubmitError::NoQuote {
                symbol: request.symbol.to_string(),
            }
        })?;

        let spread_pips = quote.spread_pips(info.point);
        let decision = self.decide(request.total_volume, request.urgency, spread_pips, Utc::now());
        tracing::info!(
            symbol = %request.symbol,
            side = %request.side,
            volume = %request.total_volume,
            urgency = %request.urgency,
            spread_pips = %spread_pips,
            algorithm = %decision.algorithm,
            "Routed order"
        );

        self.scheduler
            .submit_order(
                OrderRequest::new(request.symbol, request.side, request.total_volume)
                    .with_params(decision.params),
            )
            .await
    }

    /// Apply the decision rules to one request.
    #[must_use]
    pub fn decide(
        &self,
        total_volume: Decimal,
        urgency: Urgency,
        spread_pips: Decimal,
        now: DateTime<Utc>,
    ) -> RoutingDecision {
        if urgency == Urgency::High {
            return RoutingDecision::from_params(PlanParams::Market);
        }

        if total_volume >= self.config.large_order_threshold {
            let (duration_minutes, slice_count) = self.scale_for(total_volume);
            let params = if self.in_liquidity_session(now) {
                PlanParams::Vwap(VwapParams::new(duration_minutes, slice_count))
            } else {
                PlanParams::Twap(TwapParams::new(duration_minutes, slice_count))
            };
            return RoutingDecision::from_params(params);
        }

        if spread_pips > self.config.high_spread_pips {
            return RoutingDecision::from_params(PlanParams::Twap(TwapParams::new(
                self.config.base_duration_minutes,
                self.config.base_slice_count,
            )));
        }

        RoutingDecision::from_params(PlanParams::Market)
    }

    /// Derive iceberg parameters for an explicit iceberg submission.
    ///
    /// The visible peak is a fixed fraction of total volume, never
    /// below the minimum slice volume.
    #[must_use]
    pub fn iceberg_params(&self, total_volume: Decimal) -> IcebergParams {
        let visible = (total_volume * self.config.iceberg_visible_fraction)
            .max(self.config.min_slice_volume);
        IcebergParams::new(visible)
    }

    /// Whether `now` falls inside the high-liquidity session window.
    ///
    /// Windows that end before they start wrap across midnight. Equal
    /// bounds describe an empty window.
    #[must_use]
    pub fn in_liquidity_session(&self, now: DateTime<Utc>) -> bool {
        let time = now.time();
        let start = self.config.session_start;
        let end = self.config.session_end;
        if start <= end {
            time >= start && time < end
        } else {
            time >= start || time < end
        }
    }

    /// Scale execution window and slice count with order size.
    fn scale_for(&self, total_volume: Decimal) -> (u32, u32) {
        let ratio = (total_volume / self.config.large_order_threshold)
            .floor()
            .to_u32()
            .unwrap_or(u32::MAX)
            .max(1);
        let duration_minutes = self
            .config
            .base_duration_minutes
            .saturating_mul(ratio)
            .clamp(
                self.config.base_duration_minutes,
                self.config.max_duration_minutes,
            );
        let slice_count = self.config.base_slice_count.saturating_mul(ratio).clamp(
            self.config.base_slice_count,
            self.config.max_slice_count,
        );
        (duration_minutes, slice_count)
    }
}
