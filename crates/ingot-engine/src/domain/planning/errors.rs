//! Errors for the slice planning bounded context.

use std::fmt;

/// Errors raised while planning a slice schedule.
///
/// Planning errors surface before any slice executes; the submitted
/// order is stored as failed rather than silently dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    /// Total volume was zero or negative.
    InvalidTotalVolume {
        /// Offending volume.
        volume: String,
    },

    /// Execution window duration was zero.
    InvalidDuration {
        /// Offending duration in minutes.
        minutes: u32,
    },

    /// Requested slice count was zero.
    InvalidSliceCount {
        /// Offending slice count.
        count: u32,
    },

    /// Iceberg visible volume was zero or negative.
    InvalidVisibleVolume {
        /// Offending visible volume.
        volume: String,
    },
}

impl fmt::Display for PlanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTotalVolume { volume } => {
                write!(f, "Total volume must be positive, got {volume}")
            }
            Self::InvalidDuration { minutes } => {
                write!(f, "Execution duration must be positive, got {minutes} minutes")
            }
            Self::InvalidSliceCount { count } => {
                write!(f, "Slice count must be positive, got {count}")
            }
            Self::InvalidVisibleVolume { volume } => {
                write!(f, "Visible volume must be positive, got {volume}")
            }
        }
    }
}

impl std::error::Error for PlanError {}
