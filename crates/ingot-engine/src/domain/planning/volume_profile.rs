//! Intraday volume profile weights.

use rust_decimal::Decimal;

/// Curvature of the U-shaped profile. End buckets carry three times
/// the weight of the middle bucket before normalization.
const WEIGHT_CURVATURE: Decimal = Decimal::TWO;

/// U-shaped weights for `num_slices` buckets, front- and back-loaded
/// to mirror typical session open and close volume concentration.
///
/// Weights sum to exactly one: the final weight absorbs any division
/// residue from normalization.
#[must_use]
pub fn u_shaped_weights(num_slices: usize) -> Vec<Decimal> {
    if num_slices == 0 {
        return Vec::new();
    }
    if num_slices == 1 {
        return vec![Decimal::ONE];
    }

    // Raw weight 1 + 2x^2 with x spanning [-1, 1] across buckets.
    let span = Decimal::from(num_slices - 1);
    let mut raw = Vec::with_capacity(num_slices);
    let mut total = Decimal::ZERO;
    for i in 0..num_slices {
        let x = (Decimal::from(2 * i) - span) / span;
        let weight = Decimal::ONE + WEIGHT_CURVATURE * x * x;
        total += weight;
        raw.push(weight);
    }

    let mut weights = Vec::with_capacity(num_slices);
    let mut allocated = Decimal::ZERO;
    for weight in raw.iter().take(num_slices - 1) {
        let normalized = weight / total;
        allocated += normalized;
        weights.push(normalized);
    }
    weights.push(Decimal::ONE - allocated);
    weights
}
