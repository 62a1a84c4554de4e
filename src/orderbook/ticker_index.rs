use std::collections::HashMap;

use crate::orderbook::types::{OrderId, Ticker};

/// Secondary index from ticker to the ids of its live orders.
/// Ids keep insertion order within a ticker and never repeat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickerIndex {
    tickers: HashMap<Ticker, Vec<OrderId>>,
}

impl TickerIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an id to a ticker, creating the ticker entry on first use.
    /// Returns false if the id is already listed there.
    pub fn insert(&mut self, ticker: &str, order_id: &str) -> bool {
        let orders = self.tickers.entry(ticker.to_string()).or_default();
        if orders.iter().any(|id| id == order_id) {
            return false;
        }
        orders.push(order_id.to_string());
        true
    }

    /// Remove an id from a ticker. The ticker entry stays even when it
    /// becomes empty.
    pub fn remove(&mut self, ticker: &str, order_id: &str) -> bool {
        let Some(orders) = self.tickers.get_mut(ticker) else {
            return false;
        };

        match orders.iter().position(|id| id == order_id) {
            Some(pos) => {
                orders.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, ticker: &str, order_id: &str) -> bool {
        self.orders(ticker).iter().any(|id| id == order_id)
    }

    /// Ids for a ticker; unknown tickers yield an empty slice and are not
    /// added to the index.
    pub fn orders(&self, ticker: &str) -> &[OrderId] {
        self.tickers.get(ticker).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn tickers(&self) -> impl Iterator<Item = &str> {
        self.tickers.keys().map(String::as_str)
    }

    pub fn ticker_count(&self) -> usize {
        self.tickers.len()
    }

    /// Total ids across all tickers
    pub fn order_count(&self) -> usize {
        self.tickers.values().map(Vec::len).sum()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&str, &[OrderId])> {
        self.tickers
            .iter()
            .map(|(ticker, ids)| (ticker.as_str(), ids.as_slice()))
    }
}
