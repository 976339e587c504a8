//! Slice Planning Bounded Context
//!
//! Pure planning logic that turns an admitted order into a slice
//! schedule. Planners depend only on the execution model; market data
//! and broker I/O stay in the application layer.
//!
//! # Key Concepts
//!
//! - **Volume Conservation**: Slice volumes sum to the order total
//!   exactly, with the final slice absorbing quantization remainders
//! - **Shrink Rule**: Slice counts shrink rather than planning below
//!   the minimum slice volume
//! - **U-Shaped Profile**: VWAP weights mirror session open and close
//!   volume concentration

pub mod errors;
pub mod params;
pub mod planner;
pub mod volume_profile;

pub use errors::PlanError;
pub use params::{IcebergParams, PlanParams, TwapParams, VwapParams};
pub use planner::{PlanConstraints, plan_slices};
pub use volume_profile::u_shaped_weights;
