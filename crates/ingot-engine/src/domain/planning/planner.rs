//! Slice schedule planner.
//!
//! Pure planning logic: given a total volume, algorithm parameters, and
//! broker constraints, produce the slice schedule the scheduler will
//! work through. Slice volumes always sum to the total exactly.

use chrono::{DateTime, TimeDelta, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use super::errors::PlanError;
use super::params::{IcebergParams, PlanParams, TwapParams, VwapParams};
use super::volume_profile::u_shaped_weights;
use crate::domain::execution::Slice;

/// Broker constraints applied while planning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanConstraints {
    /// Smallest volume worth submitting as its own slice.
    pub min_slice_volume: Decimal,
    /// Broker lot step; slice volumes are quantized down to it.
    pub lot_step: Decimal,
}

impl PlanConstraints {
    /// Create planning constraints.
    #[must_use]
    pub const fn new(min_slice_volume: Decimal, lot_step: Decimal) -> Self {
        Self {
            min_slice_volume,
            lot_step,
        }
    }
}

/// Plan the slice schedule for an order.
///
/// # Errors
///
/// Returns [`PlanError`] if the total volume is not positive or the
/// algorithm parameters are degenerate (zero duration, zero slices,
/// zero visible volume).
pub fn plan_slices(
    total_volume: Decimal,
    params: &PlanParams,
    constraints: &PlanConstraints,
    now: DateTime<Utc>,
) -> Result<Vec<Slice>, PlanError> {
    if total_volume <= Decimal::ZERO {
        return Err(PlanError::InvalidTotalVolume {
            volume: total_volume.to_string(),
        });
    }
    match params {
        PlanParams::Market => Ok(vec![Slice::new(total_volume, now)]),
        PlanParams::Twap(twap) => plan_twap(total_volume, twap, constraints, now),
        PlanParams::Vwap(vwap) => plan_vwap(total_volume, vwap, constraints, now),
        PlanParams::Iceberg(iceberg) => plan_iceberg(total_volume, iceberg, constraints, now),
    }
}

/// Equal slices spread uniformly over the window. The final slice
/// absorbs the quantization remainder.
fn plan_twap(
    total: Decimal,
    params: &TwapParams,
    constraints: &PlanConstraints,
    now: DateTime<Utc>,
) -> Result<Vec<Slice>, PlanError> {
    validate_window(params.duration_minutes, params.num_slices)?;

    let mut count = effective_slice_count(total, params.num_slices, constraints.min_slice_volume);
    let mut base = quantize_down(total / Decimal::from(count), constraints.lot_step);
    if base <= Decimal::ZERO {
        count = 1;
        base = total;
    }

    let interval = slice_interval(params.duration_minutes, count);
    let mut slices = Vec::with_capacity(count as usize);
    let mut scheduled = now;
    for _ in 1..count {
        slices.push(Slice::new(base, scheduled));
        scheduled += interval;
    }
    let allocated = base * Decimal::from(count - 1);
    slices.push(Slice::new(total - allocated, scheduled));
    Ok(slices)
}

/// Profile-weighted slices over the window. Early slices reserve
/// enough volume for every later slice to stay at or above the
/// minimum; the final slice takes the exact remainder.
fn plan_vwap(
    total: Decimal,
    params: &VwapParams,
    constraints: &PlanConstraints,
    now: DateTime<Utc>,
) -> Result<Vec<Slice>, PlanError> {
    validate_window(params.duration_minutes, params.num_slices)?;

    let count = effective_slice_count(total, params.num_slices, constraints.min_slice_volume);
    let weights = u_shaped_weights(count as usize);
    let min = constraints.min_slice_volume.max(Decimal::ZERO);
    let interval = slice_interval(params.duration_minutes, count);

    let mut slices = Vec::with_capacity(count as usize);
    let mut allocated = Decimal::ZERO;
    let mut scheduled = now;
    let last = weights.len() - 1;
    for (i, weight) in weights.iter().enumerate() {
        let remaining = total - allocated;
        let volume = if i == last {
            remaining
        } else {
            let reserve = min * Decimal::from(last - i);
            let desired = quantize_down(total * weight, constraints.lot_step).max(min);
            desired.min(quantize_down(remaining - reserve, constraints.lot_step))
        };
        slices.push(Slice::new(volume, scheduled));
        allocated += volume;
        scheduled += interval;
    }
    // Degenerate constraints can quantize an early slice to nothing.
    // Dropping it keeps the remainder with the final slice.
    slices.retain(|slice| slice.volume > Decimal::ZERO);
    Ok(slices)
}

/// Fixed visible peaks, all eligible immediately but revealed one at a
/// time by the scheduler. A remainder below the minimum folds into the
/// final peak instead of becoming its own slice.
fn plan_iceberg(
    total: Decimal,
    params: &IcebergParams,
    constraints: &PlanConstraints,
    now: DateTime<Utc>,
) -> Result<Vec<Slice>, PlanError> {
    if params.visible_volume <= Decimal::ZERO {
        return Err(PlanError::InvalidVisibleVolume {
            volume: params.visible_volume.to_string(),
        });
    }

    let min = constraints.min_slice_volume.max(Decimal::ZERO);
    let mut visible = quantize_down(params.visible_volume, constraints.lot_step).max(min);
    if visible <= Decimal::ZERO {
        visible = total;
    }
    if total <= visible {
        return Ok(vec![Slice::new(total, now)]);
    }

    let peaks = (total / visible).floor().to_u64().unwrap_or(1).max(1);
    let remainder = total - visible * Decimal::from(peaks);

    let mut slices = Vec::with_capacity(peaks as usize + 1);
    for _ in 0..peaks {
        slices.push(Slice::new(visible, now));
    }
    if remainder > Decimal::ZERO {
        if remainder < min {
            if let Some(last) = slices.last_mut() {
                last.volume += remainder;
            }
        } else {
            slices.push(Slice::new(remainder, now));
        }
    }
    Ok(slices)
}

fn validate_window(duration_minutes: u32, num_slices: u32) -> Result<(), PlanError> {
    if duration_minutes == 0 {
        return Err(PlanError::InvalidDuration { minutes: 0 });
    }
    if num_slices == 0 {
        return Err(PlanError::InvalidSliceCount { count: 0 });
    }
    Ok(())
}

/// Shrink the requested slice count so no slice plans below the
/// minimum volume. Orders below the minimum collapse to one slice.
fn effective_slice_count(total: Decimal, requested: u32, min_slice: Decimal) -> u32 {
    if min_slice <= Decimal::ZERO {
        return requested;
    }
    let by_volume = (total / min_slice).floor().to_u32().unwrap_or(u32::MAX);
    requested.min(by_volume.max(1))
}

/// Spacing between consecutive slices across the window.
fn slice_interval(duration_minutes: u32, count: u32) -> TimeDelta {
    let window_ms = i64::from(duration_minutes) * 60_000;
    TimeDelta::milliseconds(window_ms / i64::from(count.max(1)))
}

/// Largest multiple of `step` not exceeding `volume`.
fn quantize_down(volume: Decimal, step: Decimal) -> Decimal {
    if step <= Decimal::ZERO {
        return volume;
    }
    (volume / step).floor() * step
}
