//! Multi-Ticker Resting Order Book
//!
//! Keeps every outstanding order for any number of instruments, applies a
//! stream of pipe-delimited text commands to them, and answers best bid and
//! best ask queries per ticker.
//!
//! # Command format
//!
//! ```text
//! <header>|<order_id>|a|<ticker>|<B|S>|<price>|<size>   new order
//! <header>|<order_id>|c                                 cancel
//! <header>|<order_id>|u|<new_size>                      update size
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use ticker_orderbook::{get_best_bid_and_ask, process_order, OrderBook};
//! use rust_decimal::Decimal;
//!
//! let mut book = OrderBook::new();
//!
//! assert!(process_order(&mut book, "1568390243|abbb11|a|AAPL|B|209.00000|100"));
//! assert!(process_order(&mut book, "1568390244|abbb12|a|AAPL|S|202.00000|100"));
//! assert!(!process_order(&mut book, "1568390245|abbb11|c|extra"));
//!
//! let (bid, ask) = get_best_bid_and_ask(&book, "AAPL");
//! assert_eq!(bid, Decimal::new(209, 0));
//! assert_eq!(ask, Decimal::new(202, 0));
//! ```
//!
//! # Architecture
//!
//! The book keeps two structures that always change together:
//!
//! 1. **Orders**: `HashMap<OrderId, Order>`, the authoritative store
//! 2. **Ticker index**: ticker to the ids of its live orders, in arrival order
//!
//! Commands are parsed into a closed [`Command`] enum before anything is
//! touched, so a rejected line never leaves partial state behind. Diagnostics
//! go to an injected [`BookObserver`] rather than global state.

pub mod feed;
pub mod metrics;
pub mod orderbook;
pub mod utils;

pub use orderbook::{
    BookObserver, Command, Order, OrderBook, OrderBookError, OrderBookResult, Price, Side,
    SharedOrderBook,
};

/// Add, update or cancel an order in the book from one command line
pub fn process_order(book: &mut OrderBook, line: &str) -> bool {
    book.update(line)
}

/// Best bid and ask for a ticker; zero for a side with no orders
pub fn get_best_bid_and_ask(book: &OrderBook, ticker: &str) -> (Price, Price) {
    book.best_bid_and_ask(ticker)
}

/// Point lookup of a resting order by id
pub fn get_order<'a>(book: &'a OrderBook, order_id: &str) -> Option<&'a Order> {
    book.get_order(order_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_top_level_entry_points() {
        let mut book = OrderBook::new();

        assert!(process_order(&mut book, "1568390243|abbb11|a|AAPL|B|209.00000|100"));
        assert!(process_order(&mut book, "1568390244|abbb12|a|AAPL|S|202.00000|100"));
        assert!(process_order(&mut book, "1568390245|abbb13|a|AAPL|B|210.00000|100"));

        assert_eq!(get_best_bid_and_ask(&book, "AAPL"), (dec!(210.0), dec!(202.0)));
        assert_eq!(get_best_bid_and_ask(&book, "IBM"), (Price::ZERO, Price::ZERO));
        assert_eq!(get_order(&book, "abbb12").unwrap().side(), Side::Sell);
        assert!(get_order(&book, "nope").is_none());
    }
}
