//! Scheduler Integration Tests
//!
//! End-to-end tests that drive orders through the full execution path:
//! submission, slice planning, tick-by-tick execution against the paper
//! broker, deferral under adverse conditions, and completion callbacks.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use chrono::{Duration as ChronoDuration, Utc};
use ingot_engine::{
    ExecutionScheduler, IcebergParams, OrderRequest, OrderSide, OrderStatus, PaperBroker,
    PlanParams, Quote, SchedulerConfig, Symbol, SymbolInfo, TwapParams, VwapParams,
};
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

fn gold() -> Symbol {
    Symbol::new("XAUUSD")
}

/// Opt-in log output: run with `RUST_LOG=debug cargo test` to see it.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Paper broker with XAUUSD registered and quoted at 2649.8/2650.0.
fn make_broker() -> Arc<PaperBroker> {
    let broker = PaperBroker::new();
    broker.register_symbol(gold(), SymbolInfo::new(dec!(0.1), dec!(0.01), dec!(100)));
    broker.set_quote(gold(), Quote::new(dec!(2649.8), dec!(2650.0)));
    Arc::new(broker)
}

fn make_scheduler(broker: Arc<PaperBroker>) -> ExecutionScheduler<PaperBroker> {
    init_tracing();
    ExecutionScheduler::new(broker, CancellationToken::new())
}

// ============================================
// Happy Path Execution
// ============================================

#[tokio::test]
async fn test_market_order_fills_on_first_tick() {
    let broker = make_broker();
    let scheduler = make_scheduler(Arc::clone(&broker));

    let id = scheduler
        .submit_order(OrderRequest::new(gold(), OrderSide::Buy, dec!(0.5)))
        .await
        .expect("submit market order");
    scheduler.run_tick().await;

    let snapshot = scheduler.order_status(&id).expect("order is known");
    assert_eq!(snapshot.status, OrderStatus::Filled);
    assert_eq!(snapshot.filled_volume, dec!(0.5));
    // Buy fills at the ask with no drift, so slippage is zero.
    assert_eq!(snapshot.average_price, Some(dec!(2650.0)));
    assert_eq!(snapshot.slippage, Some(dec!(0)));
    assert_eq!(broker.submissions().len(), 1);
}

#[tokio::test]
async fn test_twap_executes_one_slice_per_due_time() {
    let broker = make_broker();
    let scheduler = make_scheduler(Arc::clone(&broker));

    let request = OrderRequest::new(gold(), OrderSide::Buy, dec!(1.0))
        .with_params(PlanParams::Twap(TwapParams::new(10, 5)));
    let id = scheduler.submit_order(request).await.expect("submit twap");

    // First tick executes only the slice scheduled at submission time.
    scheduler.run_tick().await;
    let snapshot = scheduler.order_status(&id).unwrap();
    assert_eq!(snapshot.status, OrderStatus::PartialFill);
    assert_eq!(snapshot.filled_volume, dec!(0.2));
    assert_eq!(snapshot.remaining_slices, 4);
    assert_eq!(broker.submissions().len(), 1);

    // An immediate second tick finds nothing due.
    scheduler.run_tick().await;
    assert_eq!(broker.submissions().len(), 1);

    // Past the execution window every remaining slice is due.
    let after_window = Utc::now() + ChronoDuration::minutes(11);
    scheduler.tick_at(after_window).await;

    let snapshot = scheduler.order_status(&id).unwrap();
    assert_eq!(snapshot.status, OrderStatus::Filled);
    assert_eq!(snapshot.filled_volume, dec!(1.0));
    assert_eq!(snapshot.remaining_slices, 0);
    // Every slice filled at the same ask, so the average is that ask.
    assert_eq!(snapshot.average_price, Some(dec!(2650.0)));
    assert_eq!(broker.submissions().len(), 5);
}

#[tokio::test]
async fn test_vwap_conserves_volume_exactly() {
    let broker = make_broker();
    let scheduler = make_scheduler(Arc::clone(&broker));

    let request = OrderRequest::new(gold(), OrderSide::Buy, dec!(2.0))
        .with_params(PlanParams::Vwap(VwapParams::new(30, 8)));
    let id = scheduler.submit_order(request).await.expect("submit vwap");

    let after_window = Utc::now() + ChronoDuration::minutes(31);
    scheduler.tick_at(after_window).await;

    let snapshot = scheduler.order_status(&id).unwrap();
    assert_eq!(snapshot.status, OrderStatus::Filled);
    assert_eq!(snapshot.filled_volume, dec!(2.0));
    assert_eq!(snapshot.fill_percentage, dec!(100));
    assert_eq!(broker.submissions().len(), 8);
}

#[tokio::test]
async fn test_iceberg_reveals_one_peak_per_tick() {
    let broker = make_broker();
    let scheduler = make_scheduler(Arc::clone(&broker));

    let request = OrderRequest::new(gold(), OrderSide::Buy, dec!(1.0))
        .with_params(PlanParams::Iceberg(IcebergParams::new(dec!(0.3))));
    let id = scheduler.submit_order(request).await.expect("submit iceberg");

    // Peaks are 0.3 + 0.3 + 0.3 + 0.1; each tick shows exactly one.
    for expected_submissions in 1..=3 {
        scheduler.run_tick().await;
        assert_eq!(broker.submissions().len(), expected_submissions);
        let snapshot = scheduler.order_status(&id).unwrap();
        assert_eq!(snapshot.status, OrderStatus::PartialFill);
    }

    scheduler.run_tick().await;
    let snapshot = scheduler.order_status(&id).unwrap();
    assert_eq!(snapshot.status, OrderStatus::Filled);
    assert_eq!(snapshot.filled_volume, dec!(1.0));
    assert_eq!(broker.submissions().len(), 4);
}

#[tokio::test]
async fn test_average_price_is_volume_weighted_across_ticks() {
    let broker = make_broker();
    let scheduler = make_scheduler(Arc::clone(&broker));

    let request = OrderRequest::new(gold(), OrderSide::Buy, dec!(1.0))
        .with_params(PlanParams::Twap(TwapParams::new(1, 2)));
    let id = scheduler.submit_order(request).await.expect("submit twap");

    scheduler.run_tick().await;

    // Market moves 1.0 before the second slice executes.
    broker.set_quote(gold(), Quote::new(dec!(2650.8), dec!(2651.0)));
    let after_window = Utc::now() + ChronoDuration::minutes(2);
    scheduler.tick_at(after_window).await;

    let snapshot = scheduler.order_status(&id).unwrap();
    assert_eq!(snapshot.status, OrderStatus::Filled);
    // (0.5 * 2650.0 + 0.5 * 2651.0) / 1.0
    assert_eq!(snapshot.average_price, Some(dec!(2650.5)));
    assert_eq!(snapshot.slippage, Some(dec!(0.5)));
}

// ============================================
// Cancellation
// ============================================

#[tokio::test]
async fn test_cancel_keeps_filled_volume_and_stops_execution() {
    let broker = make_broker();
    let scheduler = make_scheduler(Arc::clone(&broker));

    let request = OrderRequest::new(gold(), OrderSide::Buy, dec!(1.0))
        .with_params(PlanParams::Twap(TwapParams::new(10, 5)));
    let id = scheduler.submit_order(request).await.expect("submit twap");

    // Two slices fill (0.4 of 1.0) before the cancel lands.
    scheduler.run_tick().await;
    scheduler
        .tick_at(Utc::now() + ChronoDuration::seconds(150))
        .await;
    assert!(scheduler.cancel_order(&id));

    let after_window = Utc::now() + ChronoDuration::minutes(11);
    scheduler.tick_at(after_window).await;

    let snapshot = scheduler.order_status(&id).unwrap();
    assert_eq!(snapshot.status, OrderStatus::Cancelled);
    assert_eq!(snapshot.filled_volume, dec!(0.4));
    // No slice was dispatched after the cancel.
    assert_eq!(broker.submissions().len(), 2);

    // A second cancel is a no-op on a terminal order.
    assert!(!scheduler.cancel_order(&id));
}

// ============================================
// Deferral Policy
// ============================================

#[tokio::test]
async fn test_missing_quote_defers_until_quote_returns() {
    let broker = make_broker();
    let scheduler = make_scheduler(Arc::clone(&broker));

    let id = scheduler
        .submit_order(OrderRequest::new(gold(), OrderSide::Buy, dec!(0.5)))
        .await
        .expect("submit market order");

    broker.clear_quote(&gold());
    scheduler.run_tick().await;
    scheduler.run_tick().await;

    let snapshot = scheduler.order_status(&id).unwrap();
    assert_eq!(snapshot.status, OrderStatus::Executing);
    assert_eq!(snapshot.filled_volume, dec!(0));
    assert_eq!(snapshot.deferrals, 2);
    // The slice stays scheduled while deferred.
    assert_eq!(snapshot.remaining_slices, 1);
    // The quote lookup failed, so nothing reached the broker.
    assert_eq!(broker.submissions().len(), 0);

    broker.set_quote(gold(), Quote::new(dec!(2649.8), dec!(2650.0)));
    scheduler.run_tick().await;

    let snapshot = scheduler.order_status(&id).unwrap();
    assert_eq!(snapshot.status, OrderStatus::Filled);
}

#[tokio::test]
async fn test_wide_spread_defers_slice() {
    let broker = make_broker();
    let scheduler = make_scheduler(Arc::clone(&broker));

    let id = scheduler
        .submit_order(OrderRequest::new(gold(), OrderSide::Buy, dec!(0.5)))
        .await
        .expect("submit market order");

    // 5.0 price units at point 0.1 is 50 pips, over the 40 pip limit
    // implied by the default 20 pip slippage budget.
    broker.set_quote(gold(), Quote::new(dec!(2645.0), dec!(2650.0)));
    scheduler.run_tick().await;

    let snapshot = scheduler.order_status(&id).unwrap();
    assert_eq!(snapshot.status, OrderStatus::Executing);
    assert_eq!(snapshot.deferrals, 1);
    assert_eq!(broker.submissions().len(), 0);

    // Spread tightens and the slice goes through.
    broker.set_quote(gold(), Quote::new(dec!(2649.8), dec!(2650.0)));
    scheduler.run_tick().await;

    let snapshot = scheduler.order_status(&id).unwrap();
    assert_eq!(snapshot.status, OrderStatus::Filled);
}

#[tokio::test]
async fn test_broker_rejection_defers_and_retries() {
    let broker = make_broker();
    let scheduler = make_scheduler(Arc::clone(&broker));

    let id = scheduler
        .submit_order(OrderRequest::new(gold(), OrderSide::Buy, dec!(0.5)))
        .await
        .expect("submit market order");

    broker.reject_submissions("no liquidity");
    scheduler.run_tick().await;

    let snapshot = scheduler.order_status(&id).unwrap();
    assert_eq!(snapshot.status, OrderStatus::Executing);
    assert_eq!(snapshot.deferrals, 1);

    broker.accept_submissions();
    scheduler.run_tick().await;

    let snapshot = scheduler.order_status(&id).unwrap();
    assert_eq!(snapshot.status, OrderStatus::Filled);
    assert_eq!(snapshot.filled_volume, dec!(0.5));
}

// ============================================
// Completion Callbacks
// ============================================

#[tokio::test]
async fn test_fill_callback_fires_exactly_once() {
    let broker = make_broker();
    let scheduler = make_scheduler(broker);

    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::new(parking_lot::Mutex::new(None));
    {
        let calls = Arc::clone(&calls);
        let seen = Arc::clone(&seen);
        scheduler.register_on_fill(move |notification| {
            calls.fetch_add(1, Ordering::SeqCst);
            *seen.lock() = Some(notification.clone());
        });
    }

    let id = scheduler
        .submit_order(OrderRequest::new(gold(), OrderSide::Sell, dec!(0.3)))
        .await
        .expect("submit market order");

    scheduler.run_tick().await;
    scheduler.run_tick().await;
    scheduler.run_tick().await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let notification = seen.lock().clone().expect("callback captured notification");
    assert_eq!(notification.order_id, id);
    assert_eq!(notification.symbol, gold());
    assert_eq!(notification.filled_volume, dec!(0.3));
    // Sell fills at the bid it was quoted at.
    assert_eq!(notification.average_price, dec!(2649.8));
    assert_eq!(notification.slippage, dec!(0));
}

// ============================================
// Background Loop
// ============================================

#[tokio::test]
async fn test_background_loop_fills_and_shuts_down() {
    let broker = make_broker();
    let shutdown = CancellationToken::new();
    let config = SchedulerConfig {
        tick_interval: Duration::from_millis(10),
        ..SchedulerConfig::default()
    };
    let scheduler = ExecutionScheduler::with_config(config, broker, shutdown.clone());

    scheduler.start();
    let id = scheduler
        .submit_order(OrderRequest::new(gold(), OrderSide::Buy, dec!(0.2)))
        .await
        .expect("submit market order");

    tokio::time::sleep(Duration::from_millis(300)).await;
    shutdown.cancel();

    let snapshot = scheduler.order_status(&id).expect("order is known");
    assert_eq!(snapshot.status, OrderStatus::Filled);
}
