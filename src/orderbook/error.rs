use serde::{Deserialize, Serialize};
use std::fmt;

use crate::orderbook::types::{OrderId, Ticker};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderBookError {
    /// Command does not have 3, 4 or 7 fields
    WrongFieldCount(usize),

    /// Action code does not match the command shape
    InvalidAction { expected: String, found: String },

    /// Side is neither `B` nor `S`
    InvalidSide(String),

    /// Price is not a decimal number
    InvalidPrice(String),

    /// Price carries more fractional digits than allowed
    PriceTooPrecise(String),

    /// Size is not an integer, or not positive on a new order
    InvalidQuantity(String),

    /// Order already exists
    DuplicateOrder(OrderId),

    /// Order not found in the book
    OrderNotFound(OrderId),

    /// Primary map and ticker index disagree about an order
    IndexInconsistency { order_id: OrderId, ticker: Ticker },
}

/// Broad classes of failure, used by observers to pick a severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    MalformedCommand,
    LogicalConflict,
    InternalInconsistency,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::MalformedCommand => "malformed",
            ErrorKind::LogicalConflict => "conflict",
            ErrorKind::InternalInconsistency => "inconsistency",
        }
    }
}

impl OrderBookError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            OrderBookError::WrongFieldCount(_)
            | OrderBookError::InvalidAction { .. }
            | OrderBookError::InvalidSide(_)
            | OrderBookError::InvalidPrice(_)
            | OrderBookError::PriceTooPrecise(_)
            | OrderBookError::InvalidQuantity(_) => ErrorKind::MalformedCommand,
            OrderBookError::DuplicateOrder(_) | OrderBookError::OrderNotFound(_) => {
                ErrorKind::LogicalConflict
            }
            OrderBookError::IndexInconsistency { .. } => ErrorKind::InternalInconsistency,
        }
    }
}

impl fmt::Display for OrderBookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderBookError::WrongFieldCount(count) => write!(f, "Wrong order length {}", count),
            OrderBookError::InvalidAction { expected, found } => {
                write!(f, "Invalid action {:?}, expected {:?}", found, expected)
            }
            OrderBookError::InvalidSide(side) => write!(f, "Invalid side {:?}", side),
            OrderBookError::InvalidPrice(price) => write!(f, "Invalid price {:?}", price),
            OrderBookError::PriceTooPrecise(price) => {
                write!(f, "Price {:?} has too many decimal places", price)
            }
            OrderBookError::InvalidQuantity(size) => write!(f, "Invalid size {:?}", size),
            OrderBookError::DuplicateOrder(id) => write!(f, "Order {} already exists", id),
            OrderBookError::OrderNotFound(id) => write!(f, "Order {} not found", id),
            OrderBookError::IndexInconsistency { order_id, ticker } => write!(
                f,
                "Order {} is not consistently indexed under ticker {}",
                order_id, ticker
            ),
        }
    }
}

impl std::error::Error for OrderBookError {}

/// Result type for order book operations
pub type OrderBookResult<T> = Result<T, OrderBookError>;
