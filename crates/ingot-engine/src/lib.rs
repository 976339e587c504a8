// Allow unwrap/expect and other test-specific patterns in test code
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::match_same_arms,
        clippy::needless_pass_by_value,
        clippy::needless_collect,
        clippy::option_if_let_else,
        clippy::default_trait_access,
        clippy::items_after_statements,
        clippy::or_fun_call
    )
)]

//! Ingot Execution Engine - Rust Core Library
//!
//! Order execution scheduling engine for the Ingot trading system:
//! slice planning algorithms (TWAP, VWAP, iceberg), a background
//! scheduler that works due slices against a broker gateway with a
//! deferral policy for adverse market conditions, and a smart order
//! router that picks an algorithm from order size, urgency, and
//! market microstructure.
//!
//! # Architecture (Clean Architecture + DDD + Hexagonal)
//!
//! ## Layers (inside → outside)
//!
//! - **Domain**: Core business logic (aggregates, value objects, planning math)
//!   - `shared`: identifiers, symbols, shared errors
//!   - `execution`: order aggregate, status lifecycle, fill bookkeeping
//!   - `planning`: TWAP, VWAP, iceberg slice planning
//!
//! - **Application**: Use cases and orchestration
//!   - `ports`: interfaces for external systems (`BrokerGateway`)
//!   - `services`: `ExecutionScheduler`, `SmartOrderRouter`
//!
//! - **Infrastructure**: Adapters (implementations)
//!   - `paper`: in-memory simulated broker
//!
//! Configuration loading and metrics instrumentation are cross-cutting
//! and live in `config` and `observability`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Clean Architecture Layers
// =============================================================================

/// Domain layer - Core business logic with no external dependencies.
pub mod domain;

/// Application layer - Services and port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Cross-Cutting Concerns
// =============================================================================

/// Configuration loading, validation, and env interpolation.
pub mod config;

/// Metrics instrumentation helpers.
pub mod observability;

// =============================================================================
// Re-exports from Clean Architecture
// =============================================================================

// Domain re-exports
pub use domain::execution::{
    Algorithm, ExecutionOrder, FILL_COMPLETION_RATIO, OrderError, OrderParams, OrderSide,
    OrderStateMachine, OrderStatus, OrderStatusSnapshot, Slice,
};
pub use domain::planning::{
    IcebergParams, PlanConstraints, PlanError, PlanParams, TwapParams, VwapParams, plan_slices,
};
pub use domain::shared::{DomainError, OrderId, Symbol, TicketId};

// Application re-exports
pub use application::ports::{
    BrokerFill, BrokerGateway, GatewayError, MarketOrderRequest, Quote, SymbolInfo,
};
pub use application::services::{
    ExecutionScheduler, FillNotification, OrderRequest, RouteRequest, RouterConfig,
    RoutingDecision, SchedulerConfig, SmartOrderRouter, SubmitError, Urgency,
};

// Infrastructure re-exports
pub use infrastructure::paper::PaperBroker;

// Configuration re-exports
pub use config::{ConfigError, EngineConfig, load_config, load_config_from_string};
