//! Order Execution Bounded Context
//!
//! Manages the lifecycle of a parent order worked as a sequence of
//! slices, from admission to completion.
//!
//! # Key Concepts
//!
//! - **Order Aggregate**: The root entity managing status transitions
//!   and fill bookkeeping
//! - **Slices**: Scheduled partial submissions that sum exactly to the
//!   parent volume
//! - **Completion Tolerance**: Orders count as filled at 99% of total
//!   volume to absorb lot-step residue

pub mod errors;
pub mod order;
pub mod slice;
pub mod state_machine;
pub mod status;

pub use errors::OrderError;
pub use order::{
    Algorithm, ExecutionOrder, FILL_COMPLETION_RATIO, OrderParams, OrderSide, OrderStatusSnapshot,
};
pub use slice::Slice;
pub use state_machine::OrderStateMachine;
pub use status::OrderStatus;
