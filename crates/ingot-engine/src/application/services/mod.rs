//! Application Services
//!
//! Services that coordinate domain objects and ports:
//!
//! - **scheduler**: background loop that admits orders and executes due slices
//! - **router**: decision layer that picks an algorithm and delegates to the scheduler

pub mod router;
pub mod scheduler;

pub use router::{RouteRequest, RouterConfig, RoutingDecision, SmartOrderRouter, Urgency};
pub use scheduler::{
    ExecutionScheduler, FillNotification, OrderRequest, SchedulerConfig, SubmitError,
};
