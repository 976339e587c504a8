//! Domain Layer
//!
//! The innermost layer containing business logic with zero
//! infrastructure dependencies. This layer defines:
//!
//! - **Aggregates**: Consistency boundaries with invariants
//! - **Value Objects**: Immutable domain types with equality by value
//! - **Domain Services**: Stateless business logic
//!
//! # Bounded Contexts
//!
//! - [`execution`]: Order lifecycle, slices, fill bookkeeping
//! - [`planning`]: Slice schedule planning (TWAP, VWAP, Iceberg, Market)
//! - [`shared`]: Identifiers, symbols, and shared errors

pub mod execution;
pub mod planning;
pub mod shared;
