use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use rust_decimal::prelude::ToPrimitive;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::info;

use crate::orderbook::error::{ErrorKind, OrderBookError};
use crate::orderbook::observer::BookObserver;
use crate::orderbook::types::{MarketEvent, Price};
use crate::utils::time::LatencyTimer;

pub mod collectors;
pub mod exporters;

/// Metrics collector for order book operations.
///
/// Also a [`BookObserver`], so it can be handed straight to a book.
#[derive(Debug)]
pub struct OrderBookMetrics {
    // Latency tracking
    update_latency: LatencyTracker,
    query_latency: LatencyTracker,

    // Throughput counters
    orders_added: AtomicU64,
    orders_cancelled: AtomicU64,
    orders_modified: AtomicU64,

    // Rejections by class
    rejected_malformed: AtomicU64,
    rejected_conflict: AtomicU64,
    inconsistencies: AtomicU64,
}

impl OrderBookMetrics {
    pub fn new() -> Self {
        // Register metric descriptions
        describe_counter!("orderbook_orders_total", "Total number of orders applied");
        describe_counter!(
            "orderbook_rejections_total",
            "Commands rejected, labelled by error kind"
        );
        describe_histogram!(
            "orderbook_operation_duration_seconds",
            "Duration of order book operations"
        );
        describe_gauge!(
            "orderbook_orders_current",
            "Current number of orders in the book"
        );
        describe_gauge!("orderbook_best_bid", "Best bid per ticker");
        describe_gauge!("orderbook_best_ask", "Best ask per ticker");

        Self {
            update_latency: LatencyTracker::new("update"),
            query_latency: LatencyTracker::new("best_bid_and_ask"),
            orders_added: AtomicU64::new(0),
            orders_cancelled: AtomicU64::new(0),
            orders_modified: AtomicU64::new(0),
            rejected_malformed: AtomicU64::new(0),
            rejected_conflict: AtomicU64::new(0),
            inconsistencies: AtomicU64::new(0),
        }
    }

    // Latency measurement methods
    pub fn time_update<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        self.update_latency.time(f)
    }

    pub fn time_query<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        self.query_latency.time(f)
    }

    // Counter methods
    pub fn increment_orders_added(&self) {
        self.orders_added.fetch_add(1, Ordering::Relaxed);
        counter!("orderbook_orders_total", "operation" => "add").increment(1);
    }

    pub fn increment_orders_cancelled(&self) {
        self.orders_cancelled.fetch_add(1, Ordering::Relaxed);
        counter!("orderbook_orders_total", "operation" => "cancel").increment(1);
    }

    pub fn increment_orders_modified(&self) {
        self.orders_modified.fetch_add(1, Ordering::Relaxed);
        counter!("orderbook_orders_total", "operation" => "update").increment(1);
    }

    pub fn increment_rejections(&self, kind: ErrorKind) {
        let counter = match kind {
            ErrorKind::MalformedCommand => &self.rejected_malformed,
            ErrorKind::LogicalConflict => &self.rejected_conflict,
            ErrorKind::InternalInconsistency => &self.inconsistencies,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        counter!("orderbook_rejections_total", "kind" => kind.as_str()).increment(1);
    }

    // Gauge methods
    pub fn set_total_orders(&self, count: u64) {
        gauge!("orderbook_orders_current").set(count as f64);
    }

    pub fn set_best_prices(&self, ticker: &str, bid: Price, ask: Price) {
        let ticker = ticker.to_string();
        gauge!("orderbook_best_bid", "ticker" => ticker.clone()).set(bid.to_f64().unwrap_or(0.0));
        gauge!("orderbook_best_ask", "ticker" => ticker).set(ask.to_f64().unwrap_or(0.0));
    }

    // Getters for current values
    pub fn get_orders_added(&self) -> u64 {
        self.orders_added.load(Ordering::Relaxed)
    }

    pub fn get_orders_cancelled(&self) -> u64 {
        self.orders_cancelled.load(Ordering::Relaxed)
    }

    pub fn get_orders_modified(&self) -> u64 {
        self.orders_modified.load(Ordering::Relaxed)
    }

    pub fn get_rejections(&self, kind: ErrorKind) -> u64 {
        match kind {
            ErrorKind::MalformedCommand => self.rejected_malformed.load(Ordering::Relaxed),
            ErrorKind::LogicalConflict => self.rejected_conflict.load(Ordering::Relaxed),
            ErrorKind::InternalInconsistency => self.inconsistencies.load(Ordering::Relaxed),
        }
    }

    pub fn get_latency_stats(&self) -> LatencyStats {
        LatencyStats {
            update: self.update_latency.get_stats(),
            query: self.query_latency.get_stats(),
        }
    }
}

impl Default for OrderBookMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl BookObserver for OrderBookMetrics {
    fn on_event(&self, event: &MarketEvent) {
        match event {
            MarketEvent::OrderAdded { .. } => self.increment_orders_added(),
            MarketEvent::OrderCancelled { .. } => self.increment_orders_cancelled(),
            MarketEvent::OrderModified { .. } => self.increment_orders_modified(),
        }
    }

    fn on_rejected(&self, _line: &str, error: &OrderBookError) {
        self.increment_rejections(error.kind());
    }

    fn on_inconsistency(&self, error: &OrderBookError) {
        self.increment_rejections(error.kind());
    }
}

/// Latency tracker for individual operations
#[derive(Debug)]
struct LatencyTracker {
    operation: &'static str,
    samples: AtomicU64,
    total_nanos: AtomicU64,
    min_nanos: AtomicU64,
    max_nanos: AtomicU64,
}

impl LatencyTracker {
    fn new(operation: &'static str) -> Self {
        Self {
            operation,
            samples: AtomicU64::new(0),
            total_nanos: AtomicU64::new(0),
            min_nanos: AtomicU64::new(u64::MAX),
            max_nanos: AtomicU64::new(0),
        }
    }

    fn time<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let timer = LatencyTimer::start();
        let result = f();
        self.record_latency(timer.stop());
        result
    }

    fn record_latency(&self, duration: Duration) {
        let nanos = duration.as_nanos() as u64;

        self.samples.fetch_add(1, Ordering::Relaxed);
        self.total_nanos.fetch_add(nanos, Ordering::Relaxed);
        self.min_nanos.fetch_min(nanos, Ordering::Relaxed);
        self.max_nanos.fetch_max(nanos, Ordering::Relaxed);

        // Record in metrics system
        histogram!("orderbook_operation_duration_seconds", "operation" => self.operation)
            .record(duration.as_secs_f64());
    }

    fn get_stats(&self) -> OperationLatencyStats {
        let samples = self.samples.load(Ordering::Relaxed);
        let total = self.total_nanos.load(Ordering::Relaxed);
        let min = self.min_nanos.load(Ordering::Relaxed);
        let max = self.max_nanos.load(Ordering::Relaxed);

        let avg = if samples > 0 { total / samples } else { 0 };

        OperationLatencyStats {
            operation: self.operation.to_string(),
            samples,
            avg_nanos: avg,
            min_nanos: if min == u64::MAX { 0 } else { min },
            max_nanos: max,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LatencyStats {
    pub update: OperationLatencyStats,
    pub query: OperationLatencyStats,
}

#[derive(Debug, Clone)]
pub struct OperationLatencyStats {
    pub operation: String,
    pub samples: u64,
    pub avg_nanos: u64,
    pub min_nanos: u64,
    pub max_nanos: u64,
}

impl OperationLatencyStats {
    pub fn avg_micros(&self) -> f64 {
        self.avg_nanos as f64 / 1_000.0
    }

    pub fn min_micros(&self) -> f64 {
        self.min_nanos as f64 / 1_000.0
    }

    pub fn max_micros(&self) -> f64 {
        self.max_nanos as f64 / 1_000.0
    }
}

/// Background metrics reporter
pub struct MetricsReporter {
    metrics: Arc<OrderBookMetrics>,
    interval: Duration,
}

impl MetricsReporter {
    pub fn new(metrics: Arc<OrderBookMetrics>, interval: Duration) -> Self {
        Self { metrics, interval }
    }

    pub async fn run(&self) {
        let mut interval = interval(self.interval);

        loop {
            interval.tick().await;
            self.report();
        }
    }

    /// Log one summary line
    pub fn report(&self) {
        let stats = self.metrics.get_latency_stats();

        info!(
            "OrderBook Metrics - Orders: +{} -{} ~{} | Rejected: malformed={} conflict={} inconsistent={} | Latency (μs): update={:.2} query={:.2}",
            self.metrics.get_orders_added(),
            self.metrics.get_orders_cancelled(),
            self.metrics.get_orders_modified(),
            self.metrics.get_rejections(ErrorKind::MalformedCommand),
            self.metrics.get_rejections(ErrorKind::LogicalConflict),
            self.metrics.get_rejections(ErrorKind::InternalInconsistency),
            stats.update.avg_micros(),
            stats.query.avg_micros(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orderbook::OrderBook;
    use rust_decimal_macros::dec;

    #[test]
    fn test_metrics_count_book_activity() {
        let metrics = Arc::new(OrderBookMetrics::new());
        let mut book = OrderBook::with_observer(metrics.clone());

        book.update("1|a1|a|AAPL|B|10.00000|5");
        book.update("2|a2|a|AAPL|S|11.00000|5");
        book.update("3|a1|u|7");
        book.update("4|a2|c");
        book.update("5|a1|a|AAPL|B|10.00000|5");
        book.update("6|a1|z");

        assert_eq!(metrics.get_orders_added(), 2);
        assert_eq!(metrics.get_orders_modified(), 1);
        assert_eq!(metrics.get_orders_cancelled(), 1);
        assert_eq!(metrics.get_rejections(ErrorKind::LogicalConflict), 1);
        assert_eq!(metrics.get_rejections(ErrorKind::MalformedCommand), 1);
        assert_eq!(metrics.get_rejections(ErrorKind::InternalInconsistency), 0);
    }

    #[test]
    fn test_latency_tracking() {
        let metrics = OrderBookMetrics::new();
        let mut book = OrderBook::new();

        let accepted = metrics.time_update(|| book.update("1|a1|a|AAPL|B|10.00000|5"));
        let quote = metrics.time_query(|| book.best_bid_and_ask("AAPL"));
        metrics.set_best_prices("AAPL", quote.0, quote.1);

        assert!(accepted);
        assert_eq!(quote.0, dec!(10));

        let stats = metrics.get_latency_stats();
        assert_eq!(stats.update.samples, 1);
        assert_eq!(stats.query.samples, 1);
        assert!(stats.update.min_nanos <= stats.update.max_nanos);
    }

    #[test]
    fn test_empty_latency_stats() {
        let stats = OrderBookMetrics::new().get_latency_stats();
        assert_eq!(stats.update.samples, 0);
        assert_eq!(stats.update.min_nanos, 0);
        assert_eq!(stats.update.avg_micros(), 0.0);
    }
}
