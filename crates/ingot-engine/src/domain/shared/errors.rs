//! Domain errors shared across bounded contexts.

use std::fmt;

/// Errors raised by domain value objects, free of infrastructure
/// concerns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A field failed validation.
    InvalidValue {
        /// Name of the offending field.
        field: &'static str,
        /// Failed predicate, phrased to read on from the field name.
        message: String,
    },
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidValue { field, message } => write!(f, "{field} {message}"),
        }
    }
}

impl std::error::Error for DomainError {}
