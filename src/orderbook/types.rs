use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::orderbook::command::{ACTION_NEW_ORDER, DELIMITER};
use crate::orderbook::error::{OrderBookError, OrderBookResult};
use crate::utils::format_price;

pub type OrderId = String;
pub type Ticker = String;
pub type Price = Decimal; // Fixed precision, at most PRICE_SCALE fractional digits
pub type Quantity = i64;

/// Maximum number of fractional digits accepted in a price
pub const PRICE_SCALE: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Single letter code used on the wire
    pub fn code(&self) -> &'static str {
        match self {
            Side::Buy => "B",
            Side::Sell => "S",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Side {
    type Err = OrderBookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "B" => Ok(Side::Buy),
            "S" => Ok(Side::Sell),
            other => Err(OrderBookError::InvalidSide(other.to_string())),
        }
    }
}

/// A single resting order. Only the size can change after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    order_id: OrderId,
    ticker: Ticker,
    side: Side,
    price: Price,
    size: Quantity,
}

impl Order {
    pub fn new(order_id: OrderId, ticker: Ticker, side: Side, price: Price, size: Quantity) -> Self {
        Self {
            order_id,
            ticker,
            side,
            price,
            size,
        }
    }

    /// Build an order from the textual price and size fields
    pub fn parse(
        order_id: OrderId,
        ticker: Ticker,
        side: Side,
        price: &str,
        size: &str,
    ) -> OrderBookResult<Self> {
        let price = Decimal::from_str(price.trim())
            .map_err(|_| OrderBookError::InvalidPrice(price.to_string()))?;
        let size = size
            .trim()
            .parse::<Quantity>()
            .map_err(|_| OrderBookError::InvalidQuantity(size.to_string()))?;

        Ok(Self::new(order_id, ticker, side, price, size))
    }

    pub fn order_id(&self) -> &str {
        &self.order_id
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn price(&self) -> Price {
        self.price
    }

    pub fn size(&self) -> Quantity {
        self.size
    }

    /// Replace the size, returning the previous value
    pub fn set_size(&mut self, size: Quantity) -> Quantity {
        std::mem::replace(&mut self.size, size)
    }

    /// Render this order as the new-order command that would create it
    pub fn to_command(&self, header: &str) -> String {
        format!(
            "{header}{d}{}{d}{ACTION_NEW_ORDER}{d}{}{d}{}{d}{}{d}{}",
            self.order_id,
            self.ticker,
            self.side,
            format_price(self.price),
            self.size,
            d = DELIMITER
        )
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{d}{}{d}{}{d}{}{d}{}",
            self.order_id,
            self.ticker,
            self.side,
            format_price(self.price),
            self.size,
            d = DELIMITER
        )
    }
}

// Book change events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MarketEvent {
    OrderAdded {
        order: Order,
    },
    OrderCancelled {
        order: Order,
    },
    OrderModified {
        order_id: OrderId,
        ticker: Ticker,
        old_size: Quantity,
        new_size: Quantity,
    },
}

impl MarketEvent {
    pub fn order_id(&self) -> &str {
        match self {
            MarketEvent::OrderAdded { order } | MarketEvent::OrderCancelled { order } => {
                order.order_id()
            }
            MarketEvent::OrderModified { order_id, .. } => order_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickerSnapshot {
    pub ticker: Ticker,
    pub best_bid: Price,
    pub best_ask: Price,
    pub orders: Vec<Order>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookSnapshot {
    pub timestamp: DateTime<Utc>,
    pub tickers: Vec<TickerSnapshot>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_order_creation() {
        let order = Order::new(
            "abbb11".to_string(),
            "AAPL".to_string(),
            Side::Buy,
            dec!(209.00000),
            100,
        );

        assert_eq!(order.order_id(), "abbb11");
        assert_eq!(order.ticker(), "AAPL");
        assert_eq!(order.side(), Side::Buy);
        assert_eq!(order.price(), dec!(209));
        assert_eq!(order.size(), 100);
    }

    #[test]
    fn test_order_parse_conversions() {
        let order = Order::parse(
            "id1".to_string(),
            "MSFT".to_string(),
            Side::Sell,
            "101.25",
            "40",
        )
        .unwrap();
        assert_eq!(order.price(), dec!(101.25));
        assert_eq!(order.size(), 40);

        let err = Order::parse("id1".into(), "MSFT".into(), Side::Sell, "1o1", "40").unwrap_err();
        assert_eq!(err, OrderBookError::InvalidPrice("1o1".to_string()));

        let err = Order::parse("id1".into(), "MSFT".into(), Side::Sell, "101", "4.5").unwrap_err();
        assert_eq!(err, OrderBookError::InvalidQuantity("4.5".to_string()));
    }

    #[test]
    fn test_set_size_only_touches_size() {
        let mut order = Order::new("id".into(), "AAPL".into(), Side::Buy, dec!(1.5), 10);
        let old = order.set_size(-3);

        assert_eq!(old, 10);
        assert_eq!(order.size(), -3);
        assert_eq!(order.price(), dec!(1.5));
        assert_eq!(order.side(), Side::Buy);
    }

    #[test]
    fn test_order_display() {
        let order = Order::new("abbb11".into(), "AAPL".into(), Side::Sell, dec!(202), 7);
        assert_eq!(order.to_string(), "abbb11|AAPL|S|202.00000|7");
        assert_eq!(
            order.to_command("1568390243"),
            "1568390243|abbb11|a|AAPL|S|202.00000|7"
        );
    }

    #[test]
    fn test_side_codes() {
        assert_eq!("B".parse::<Side>().unwrap(), Side::Buy);
        assert_eq!("S".parse::<Side>().unwrap(), Side::Sell);
        assert!("b".parse::<Side>().is_err());
        assert!("BUY".parse::<Side>().is_err());
    }
}
