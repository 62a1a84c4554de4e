use std::collections::HashMap;
use tracing::debug;

use crate::orderbook::command::Command;
use crate::orderbook::error::{OrderBookError, OrderBookResult};
use crate::orderbook::ticker_index::TickerIndex;
use crate::orderbook::types::{
    MarketEvent, Order, OrderId, Price, Quantity, Side, Ticker, PRICE_SCALE,
};

/// Order operations over the primary store and the ticker index.
///
/// Each operation either fails without touching either map or updates both.
pub struct OrderOperations;

impl OrderOperations {
    /// Apply a validated command
    pub fn execute(
        command: Command,
        orders: &mut HashMap<OrderId, Order>,
        index: &mut TickerIndex,
    ) -> OrderBookResult<MarketEvent> {
        match command {
            Command::New {
                order_id,
                ticker,
                side,
                price,
                size,
                ..
            } => Self::add_order(order_id, ticker, side, price, size, orders, index),
            Command::Cancel { order_id, .. } => Self::cancel_order(&order_id, orders, index),
            Command::Update { order_id, size, .. } => {
                Self::modify_order_size(&order_id, size, orders)
            }
        }
    }

    /// Add a new order to the book. Commands built by hand skip the parser,
    /// so price precision and size are checked again here.
    pub fn add_order(
        order_id: OrderId,
        ticker: Ticker,
        side: Side,
        price: Price,
        size: Quantity,
        orders: &mut HashMap<OrderId, Order>,
        index: &mut TickerIndex,
    ) -> OrderBookResult<MarketEvent> {
        if price.scale() > PRICE_SCALE {
            return Err(OrderBookError::PriceTooPrecise(price.to_string()));
        }
        if size <= 0 {
            return Err(OrderBookError::InvalidQuantity(size.to_string()));
        }
        if orders.contains_key(&order_id) {
            return Err(OrderBookError::DuplicateOrder(order_id));
        }

        let order = Order::new(order_id, ticker, side, price, size);
        debug!("Adding order: {}", order);

        if !index.insert(order.ticker(), order.order_id()) {
            return Err(OrderBookError::IndexInconsistency {
                order_id: order.order_id().to_string(),
                ticker: order.ticker().to_string(),
            });
        }
        orders.insert(order.order_id().to_string(), order.clone());

        Ok(MarketEvent::OrderAdded { order })
    }

    /// Cancel an existing order
    pub fn cancel_order(
        order_id: &str,
        orders: &mut HashMap<OrderId, Order>,
        index: &mut TickerIndex,
    ) -> OrderBookResult<MarketEvent> {
        debug!("Cancelling order: {}", order_id);

        let ticker = orders
            .get(order_id)
            .map(|order| order.ticker().to_string())
            .ok_or_else(|| OrderBookError::OrderNotFound(order_id.to_string()))?;

        // Removing from the index first leaves both maps untouched on failure
        if !index.remove(&ticker, order_id) {
            return Err(OrderBookError::IndexInconsistency {
                order_id: order_id.to_string(),
                ticker,
            });
        }

        let order = orders
            .remove(order_id)
            .ok_or_else(|| OrderBookError::OrderNotFound(order_id.to_string()))?;

        Ok(MarketEvent::OrderCancelled { order })
    }

    /// Replace the size of an existing order. The new size is taken as is,
    /// zero and negative values included.
    pub fn modify_order_size(
        order_id: &str,
        new_size: Quantity,
        orders: &mut HashMap<OrderId, Order>,
    ) -> OrderBookResult<MarketEvent> {
        debug!("Modifying order {} to size {}", order_id, new_size);

        let order = orders
            .get_mut(order_id)
            .ok_or_else(|| OrderBookError::OrderNotFound(order_id.to_string()))?;
        let old_size = order.set_size(new_size);

        Ok(MarketEvent::OrderModified {
            order_id: order_id.to_string(),
            ticker: order.ticker().to_string(),
            old_size,
            new_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn add(
        id: &str,
        side: Side,
        orders: &mut HashMap<OrderId, Order>,
        index: &mut TickerIndex,
    ) -> OrderBookResult<MarketEvent> {
        OrderOperations::add_order(
            id.to_string(),
            "TEST".to_string(),
            side,
            dec!(100.5),
            100,
            orders,
            index,
        )
    }

    #[test]
    fn test_add_order() {
        let mut orders = HashMap::new();
        let mut index = TickerIndex::new();

        let event = add("o1", Side::Buy, &mut orders, &mut index).unwrap();

        assert!(matches!(event, MarketEvent::OrderAdded { .. }));
        assert_eq!(orders.len(), 1);
        assert_eq!(index.orders("TEST"), ["o1".to_string()]);
    }

    #[test]
    fn test_add_rejects_unchecked_fields() {
        let mut orders = HashMap::new();
        let mut index = TickerIndex::new();

        let err = OrderOperations::add_order(
            "o1".to_string(),
            "TEST".to_string(),
            Side::Buy,
            dec!(1.1234567),
            10,
            &mut orders,
            &mut index,
        )
        .unwrap_err();
        assert_eq!(err, OrderBookError::PriceTooPrecise("1.1234567".to_string()));

        let err = OrderOperations::add_order(
            "o1".to_string(),
            "TEST".to_string(),
            Side::Buy,
            dec!(1.5),
            0,
            &mut orders,
            &mut index,
        )
        .unwrap_err();
        assert_eq!(err, OrderBookError::InvalidQuantity("0".to_string()));

        assert!(orders.is_empty());
        assert_eq!(index, TickerIndex::new());
    }

    #[test]
    fn test_add_duplicate_order() {
        let mut orders = HashMap::new();
        let mut index = TickerIndex::new();

        add("o1", Side::Buy, &mut orders, &mut index).unwrap();
        let err = add("o1", Side::Sell, &mut orders, &mut index).unwrap_err();

        assert_eq!(err, OrderBookError::DuplicateOrder("o1".to_string()));
        assert_eq!(orders["o1"].side(), Side::Buy);
        assert_eq!(index.order_count(), 1);
    }

    #[test]
    fn test_cancel_order() {
        let mut orders = HashMap::new();
        let mut index = TickerIndex::new();

        add("o1", Side::Buy, &mut orders, &mut index).unwrap();
        let event = OrderOperations::cancel_order("o1", &mut orders, &mut index).unwrap();

        if let MarketEvent::OrderCancelled { order } = event {
            assert_eq!(order.order_id(), "o1");
            assert_eq!(order.size(), 100);
        } else {
            panic!("Expected cancel event");
        }

        assert!(orders.is_empty());
        assert!(index.orders("TEST").is_empty());
    }

    #[test]
    fn test_cancel_unknown_order() {
        let mut orders = HashMap::new();
        let mut index = TickerIndex::new();

        let err = OrderOperations::cancel_order("nope", &mut orders, &mut index).unwrap_err();
        assert_eq!(err, OrderBookError::OrderNotFound("nope".to_string()));
    }

    #[test]
    fn test_cancel_detects_missing_index_entry() {
        let mut orders = HashMap::new();
        let mut index = TickerIndex::new();

        add("o1", Side::Buy, &mut orders, &mut index).unwrap();
        index.remove("TEST", "o1");

        let err = OrderOperations::cancel_order("o1", &mut orders, &mut index).unwrap_err();
        assert_eq!(
            err,
            OrderBookError::IndexInconsistency {
                order_id: "o1".to_string(),
                ticker: "TEST".to_string()
            }
        );
        assert!(orders.contains_key("o1"));
    }

    #[test]
    fn test_modify_order_size() {
        let mut orders = HashMap::new();
        let mut index = TickerIndex::new();

        add("o1", Side::Buy, &mut orders, &mut index).unwrap();
        let event = OrderOperations::modify_order_size("o1", 150, &mut orders).unwrap();

        assert_eq!(
            event,
            MarketEvent::OrderModified {
                order_id: "o1".to_string(),
                ticker: "TEST".to_string(),
                old_size: 100,
                new_size: 150,
            }
        );
        assert_eq!(orders["o1"].size(), 150);
        assert_eq!(orders["o1"].price(), dec!(100.5));
    }

    #[test]
    fn test_execute_dispatches_on_variant() {
        let mut orders = HashMap::new();
        let mut index = TickerIndex::new();

        let commands = [
            "1|o1|a|TEST|S|99.1|10",
            "2|o1|u|0",
            "3|o1|c",
        ];
        let events: Vec<_> = commands
            .iter()
            .map(|line| {
                let command = Command::parse(line).unwrap();
                OrderOperations::execute(command, &mut orders, &mut index).unwrap()
            })
            .collect();

        assert!(matches!(events[0], MarketEvent::OrderAdded { .. }));
        assert!(matches!(
            events[1],
            MarketEvent::OrderModified { new_size: 0, .. }
        ));
        assert!(matches!(events[2], MarketEvent::OrderCancelled { .. }));
        assert!(orders.is_empty());
    }
}
