//! Execution metrics.
//!
//! Counter helpers for order and slice outcomes. The engine records
//! through the `metrics` facade; hosts install whatever recorder they
//! run (exporter wiring lives outside this crate).

use metrics::counter;

/// Record an admitted order.
pub fn record_order_submitted(algorithm: &str) {
    counter!(
        "orders_submitted_total",
        "algorithm" => algorithm.to_string()
    )
    .increment(1);
}

/// Record an order reaching the completion tolerance.
pub fn record_order_filled(algorithm: &str) {
    counter!(
        "orders_filled_total",
        "algorithm" => algorithm.to_string()
    )
    .increment(1);
}

/// Record a cancelled order.
pub fn record_order_cancelled() {
    counter!("orders_cancelled_total").increment(1);
}

/// Record a slice executed at the broker.
pub fn record_slice_executed(symbol: &str) {
    counter!(
        "slices_executed_total",
        "symbol" => symbol.to_string()
    )
    .increment(1);
}

/// Record a slice deferred to a later tick.
///
/// # Arguments
///
/// * `reason` - One of `no_quote`, `wide_spread`, or `rejected`.
pub fn record_slice_deferred(symbol: &str, reason: &str) {
    counter!(
        "slices_deferred_total",
        "symbol" => symbol.to_string(),
        "reason" => reason.to_string()
    )
    .increment(1);
}
