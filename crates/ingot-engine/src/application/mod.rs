//! Application Layer
//!
//! Use-case orchestration between the domain model and the outside
//! world:
//!
//! - **ports**: trait boundaries implemented by infrastructure adapters
//! - **services**: the execution scheduler and the smart order router
//!
//! Application code owns locking, I/O sequencing, and observability.
//! Execution semantics live in the domain layer.

pub mod ports;
pub mod services;

pub use ports::{
    BrokerFill, BrokerGateway, GatewayError, MarketOrderRequest, Quote, SymbolInfo,
};
pub use services::{
    ExecutionScheduler, FillNotification, OrderRequest, RouteRequest, RouterConfig,
    RoutingDecision, SchedulerConfig, SmartOrderRouter, SubmitError, Urgency,
};
