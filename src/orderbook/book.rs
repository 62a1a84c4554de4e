use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::orderbook::command::Command;
use crate::orderbook::error::{OrderBookError, OrderBookResult};
use crate::orderbook::observer::{BookObserver, TracingObserver};
use crate::orderbook::operations::OrderOperations;
use crate::orderbook::ticker_index::TickerIndex;
use crate::orderbook::types::{
    BookSnapshot, MarketEvent, Order, OrderId, Price, Side, TickerSnapshot,
};

/// In-memory book of resting orders across any number of tickers
#[derive(Debug, Clone)]
pub struct OrderBook {
    // Authoritative store: order id -> order
    orders: HashMap<OrderId, Order>,

    // Secondary index: ticker -> live order ids, insertion ordered
    index: TickerIndex,

    observer: Arc<dyn BookObserver>,

    // Statistics
    commands_applied: u64,
    commands_rejected: u64,
}

impl OrderBook {
    pub fn new() -> Self {
        Self::with_observer(Arc::new(TracingObserver))
    }

    pub fn with_observer(observer: Arc<dyn BookObserver>) -> Self {
        debug!("Creating new order book with observer {:?}", observer);

        Self {
            orders: HashMap::new(),
            index: TickerIndex::new(),
            observer,
            commands_applied: 0,
            commands_rejected: 0,
        }
    }

    /// Apply one raw command line, returning whether it was accepted
    pub fn update(&mut self, line: &str) -> bool {
        self.apply(line).is_ok()
    }

    /// Parse, validate and apply one raw command line.
    ///
    /// Validation completes before any mutation starts, so a rejected command
    /// leaves the book exactly as it was.
    pub fn apply(&mut self, line: &str) -> OrderBookResult<MarketEvent> {
        let result = Command::parse(line).and_then(|command| {
            OrderOperations::execute(command, &mut self.orders, &mut self.index)
        });
        self.record(line, result)
    }

    /// Apply an already parsed command
    pub fn execute(&mut self, command: Command) -> OrderBookResult<MarketEvent> {
        let line = command.to_string();
        let result = OrderOperations::execute(command, &mut self.orders, &mut self.index);
        self.record(&line, result)
    }

    /// Apply lines in order, counting outcomes
    pub fn process_batch<'a, I>(&mut self, lines: I) -> BatchSummary
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut summary = BatchSummary::default();
        for line in lines {
            if self.update(line) {
                summary.accepted += 1;
            } else {
                summary.rejected += 1;
            }
        }
        summary
    }

    pub fn get_order(&self, order_id: &str) -> Option<&Order> {
        self.orders.get(order_id)
    }

    /// Live order ids for a ticker, in insertion order
    pub fn ticker_orders(&self, ticker: &str) -> &[OrderId] {
        self.index.orders(ticker)
    }

    /// Best bid and ask for a ticker, each zero when that side is empty
    pub fn best_bid_and_ask(&self, ticker: &str) -> (Price, Price) {
        let (bid, ask) = self.quote(ticker);
        (bid.unwrap_or(Price::ZERO), ask.unwrap_or(Price::ZERO))
    }

    /// Highest resting buy price
    pub fn best_bid(&self, ticker: &str) -> Option<Price> {
        self.quote(ticker).0
    }

    /// Lowest resting sell price
    pub fn best_ask(&self, ticker: &str) -> Option<Price> {
        self.quote(ticker).1
    }

    pub fn spread(&self, ticker: &str) -> Option<Price> {
        match self.quote(ticker) {
            (Some(bid), Some(ask)) => Some(ask - bid),
            _ => None,
        }
    }

    /// Get total number of orders in the book
    pub fn total_orders(&self) -> usize {
        self.orders.len()
    }

    pub fn get_stats(&self) -> OrderBookStats {
        OrderBookStats {
            total_orders: self.total_orders(),
            tickers: self.index.ticker_count(),
            commands_applied: self.commands_applied,
            commands_rejected: self.commands_rejected,
        }
    }

    /// Generate a snapshot of every ticker, sorted by ticker
    pub fn snapshot(&self) -> BookSnapshot {
        let mut tickers: Vec<_> = self
            .index
            .iter()
            .map(|(ticker, ids)| {
                let (best_bid, best_ask) = self.best_bid_and_ask(ticker);
                TickerSnapshot {
                    ticker: ticker.to_string(),
                    best_bid,
                    best_ask,
                    orders: ids
                        .iter()
                        .filter_map(|id| self.orders.get(id))
                        .cloned()
                        .collect(),
                }
            })
            .collect();

        tickers.sort_by(|a, b| a.ticker.cmp(&b.ticker));

        BookSnapshot {
            timestamp: chrono::Utc::now(),
            tickers,
        }
    }

    /// Log every resting order
    pub fn log_book(&self) {
        let mut tickers: Vec<_> = self.index.tickers().collect();
        tickers.sort_unstable();

        for ticker in tickers {
            for order in self.ticker_orders(ticker).iter().filter_map(|id| self.get_order(id)) {
                info!("{}", order);
            }
        }
    }

    /// Verify the primary store and the ticker index agree
    pub fn check_consistency(&self) -> OrderBookResult<()> {
        for (ticker, ids) in self.index.iter() {
            for (pos, id) in ids.iter().enumerate() {
                let indexed_correctly = self
                    .orders
                    .get(id)
                    .is_some_and(|order| order.ticker() == ticker);
                if !indexed_correctly || ids[..pos].contains(id) {
                    return Err(OrderBookError::IndexInconsistency {
                        order_id: id.clone(),
                        ticker: ticker.to_string(),
                    });
                }
            }
        }

        for order in self.orders.values() {
            if !self.index.contains(order.ticker(), order.order_id()) {
                return Err(OrderBookError::IndexInconsistency {
                    order_id: order.order_id().to_string(),
                    ticker: order.ticker().to_string(),
                });
            }
        }

        Ok(())
    }

    // Private helper methods

    fn record(
        &mut self,
        line: &str,
        result: OrderBookResult<MarketEvent>,
    ) -> OrderBookResult<MarketEvent> {
        match &result {
            Ok(event) => {
                self.commands_applied += 1;
                self.observer.on_event(event);
            }
            Err(err) => {
                self.commands_rejected += 1;
                self.observer.on_rejected(line, err);
            }
        }
        result
    }

    /// Full scan of a ticker's live orders
    fn quote(&self, ticker: &str) -> (Option<Price>, Option<Price>) {
        let mut bid: Option<Price> = None;
        let mut ask: Option<Price> = None;

        for order_id in self.index.orders(ticker) {
            let Some(order) = self.orders.get(order_id) else {
                self.observer
                    .on_inconsistency(&OrderBookError::IndexInconsistency {
                        order_id: order_id.clone(),
                        ticker: ticker.to_string(),
                    });
                continue;
            };

            let price = order.price();
            match order.side() {
                Side::Buy => bid = Some(bid.map_or(price, |best| best.max(price))),
                Side::Sell => ask = Some(ask.map_or(price, |best| best.min(price))),
            }
        }

        (bid, ask)
    }
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderBookStats {
    pub total_orders: usize,
    pub tickers: usize,
    pub commands_applied: u64,
    pub commands_rejected: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub accepted: usize,
    pub rejected: usize,
}

/// An order book behind a single exclusive lock. Every update and query takes
/// the same lock, so the two indexes are never seen half updated.
#[derive(Debug, Clone, Default)]
pub struct SharedOrderBook {
    inner: Arc<Mutex<OrderBook>>,
}

impl SharedOrderBook {
    pub fn new(book: OrderBook) -> Self {
        Self {
            inner: Arc::new(Mutex::new(book)),
        }
    }

    pub fn update(&self, line: &str) -> bool {
        self.inner.lock().update(line)
    }

    pub fn apply(&self, line: &str) -> OrderBookResult<MarketEvent> {
        self.inner.lock().apply(line)
    }

    pub fn best_bid_and_ask(&self, ticker: &str) -> (Price, Price) {
        self.inner.lock().best_bid_and_ask(ticker)
    }

    pub fn get_order(&self, order_id: &str) -> Option<Order> {
        self.inner.lock().get_order(order_id).cloned()
    }

    /// Run a closure with the lock held
    pub fn with_book<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut OrderBook) -> R,
    {
        f(&mut *self.inner.lock())
    }
}
