//! Shared Kernel
//!
//! Value objects and errors used across bounded contexts:
//!
//! - **Identifiers**: Strongly-typed IDs ([`OrderId`], [`TicketId`])
//! - **Symbol**: Normalized instrument symbol
//! - **Errors**: Domain-level error types

pub mod errors;
pub mod identifiers;
pub mod symbol;

pub use errors::DomainError;
pub use identifiers::{OrderId, TicketId};
pub use symbol::Symbol;
