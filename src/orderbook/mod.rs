//! Core order book implementation module
//!
//! This module contains the order and order book data structures, the
//! command parser, and the observer seam used for diagnostics.

pub mod book;
pub mod command;
pub mod error;
pub mod observer;
pub mod operations;
pub mod ticker_index;
pub mod types;

// Re-export main types for convenience
pub use book::{BatchSummary, OrderBook, OrderBookStats, SharedOrderBook};
pub use command::Command;
pub use error::{ErrorKind, OrderBookError, OrderBookResult};
pub use observer::{BookObserver, FanoutObserver, NullObserver, TracingObserver};
pub use ticker_index::TickerIndex;
pub use types::{
    BookSnapshot, MarketEvent, Order, OrderId, Price, Quantity, Side, Ticker, TickerSnapshot,
};
