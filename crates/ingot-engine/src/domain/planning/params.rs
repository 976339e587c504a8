//! Algorithm parameter value objects.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::execution::Algorithm;

/// Parameters for TWAP execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwapParams {
    /// Execution window in minutes.
    pub duration_minutes: u32,
    /// Number of equal slices to spread over the window.
    pub num_slices: u32,
}

impl TwapParams {
    /// Create TWAP parameters.
    #[must_use]
    pub const fn new(duration_minutes: u32, num_slices: u32) -> Self {
        Self {
            duration_minutes,
            num_slices,
        }
    }
}

impl Default for TwapParams {
    fn default() -> Self {
        Self::new(10, 5)
    }
}

/// Parameters for VWAP execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VwapParams {
    /// Execution window in minutes.
    pub duration_minutes: u32,
    /// Number of profile-weighted slices over the window.
    pub num_slices: u32,
}

impl VwapParams {
    /// Create VWAP parameters.
    #[must_use]
    pub const fn new(duration_minutes: u32, num_slices: u32) -> Self {
        Self {
            duration_minutes,
            num_slices,
        }
    }
}

impl Default for VwapParams {
    fn default() -> Self {
        Self::new(30, 8)
    }
}

/// Parameters for iceberg execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IcebergParams {
    /// Volume shown per peak.
    pub visible_volume: Decimal,
}

impl IcebergParams {
    /// Create iceberg parameters.
    #[must_use]
    pub const fn new(visible_volume: Decimal) -> Self {
        Self { visible_volume }
    }
}

impl Default for IcebergParams {
    fn default() -> Self {
        Self::new(Decimal::from_parts(1, 0, 0, false, 1)) // 0.1
    }
}

/// Typed parameters for one execution algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "algorithm", rename_all = "lowercase")]
pub enum PlanParams {
    /// Single immediate slice for the full volume.
    Market,
    /// Equal slices over a time window.
    Twap(TwapParams),
    /// Volume-profile weighted slices over a time window.
    Vwap(VwapParams),
    /// Fixed visible peaks revealed one at a time.
    Iceberg(IcebergParams),
}

impl PlanParams {
    /// The algorithm these parameters drive.
    #[must_use]
    pub const fn algorithm(&self) -> Algorithm {
        match self {
            Self::Market => Algorithm::Market,
            Self::Twap(_) => Algorithm::Twap,
            Self::Vwap(_) => Algorithm::Vwap,
            Self::Iceberg(_) => Algorithm::Iceberg,
        }
    }

    /// Default parameters for the given algorithm.
    #[must_use]
    pub fn default_for(algorithm: Algorithm) -> Self {
        match algorithm {
            Algorithm::Market => Self::Market,
            Algorithm::Twap => Self::Twap(TwapParams::default()),
            Algorithm::Vwap => Self::Vwap(VwapParams::default()),
            Algorithm::Iceberg => Self::Iceberg(IcebergParams::default()),
        }
    }
}
