//! Parsing and validation of pipe-delimited book commands.
//!
//! A command is accepted only when every check passes; a parsed [`Command`]
//! carries fully typed fields, so dispatch never re-reads the raw text.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::orderbook::error::{OrderBookError, OrderBookResult};
use crate::orderbook::types::{OrderId, Price, Quantity, Side, Ticker, PRICE_SCALE};
use crate::utils::format_price;

pub const DELIMITER: &str = "|";

// Field counts per command shape
pub const CANCEL_ORDER_LEN: usize = 3;
pub const UPDATE_ORDER_LEN: usize = 4;
pub const NEW_ORDER_LEN: usize = 7;

// Field positions
pub const ORDER_ID_INDEX: usize = 1;
pub const ACTION_INDEX: usize = 2;
pub const TICKER_INDEX: usize = 3;
pub const SIDE_INDEX: usize = 4;
pub const PRICE_INDEX: usize = 5;
pub const NEW_ORDER_SIZE_INDEX: usize = 6;
pub const UPDATE_ORDER_SIZE_INDEX: usize = 3;

pub const ACTION_NEW_ORDER: &str = "a";
pub const ACTION_CANCEL_ORDER: &str = "c";
pub const ACTION_UPDATE_ORDER: &str = "u";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    New {
        header: String,
        order_id: OrderId,
        ticker: Ticker,
        side: Side,
        price: Price,
        size: Quantity,
    },
    Cancel {
        header: String,
        order_id: OrderId,
    },
    Update {
        header: String,
        order_id: OrderId,
        size: Quantity,
    },
}

impl Command {
    /// Split and validate a raw command line.
    ///
    /// Checks run in order and stop at the first failure: field count, action
    /// code for that count, then the side, price and size of new orders.
    pub fn parse(line: &str) -> OrderBookResult<Self> {
        let fields: Vec<&str> = line
            .trim_end_matches(['\r', '\n'])
            .split(DELIMITER)
            .map(str::trim)
            .collect();

        let expected_action = match fields.len() {
            CANCEL_ORDER_LEN => ACTION_CANCEL_ORDER,
            UPDATE_ORDER_LEN => ACTION_UPDATE_ORDER,
            NEW_ORDER_LEN => ACTION_NEW_ORDER,
            count => return Err(OrderBookError::WrongFieldCount(count)),
        };

        let action = fields[ACTION_INDEX];
        if action != expected_action {
            return Err(OrderBookError::InvalidAction {
                expected: expected_action.to_string(),
                found: action.to_string(),
            });
        }

        let header = fields[0].to_string();
        let order_id = fields[ORDER_ID_INDEX].to_string();

        match fields.len() {
            CANCEL_ORDER_LEN => Ok(Command::Cancel { header, order_id }),
            UPDATE_ORDER_LEN => Ok(Command::Update {
                header,
                order_id,
                size: parse_size(fields[UPDATE_ORDER_SIZE_INDEX])?,
            }),
            _ => {
                let side = fields[SIDE_INDEX].parse::<Side>()?;
                let price = parse_price(fields[PRICE_INDEX])?;
                let size = parse_size(fields[NEW_ORDER_SIZE_INDEX])?;
                if size <= 0 {
                    return Err(OrderBookError::InvalidQuantity(
                        fields[NEW_ORDER_SIZE_INDEX].to_string(),
                    ));
                }

                Ok(Command::New {
                    header,
                    order_id,
                    ticker: fields[TICKER_INDEX].to_string(),
                    side,
                    price,
                    size,
                })
            }
        }
    }

    pub fn order_id(&self) -> &str {
        match self {
            Command::New { order_id, .. }
            | Command::Cancel { order_id, .. }
            | Command::Update { order_id, .. } => order_id,
        }
    }

    pub fn header(&self) -> &str {
        match self {
            Command::New { header, .. }
            | Command::Cancel { header, .. }
            | Command::Update { header, .. } => header,
        }
    }

    pub fn action(&self) -> &'static str {
        match self {
            Command::New { .. } => ACTION_NEW_ORDER,
            Command::Cancel { .. } => ACTION_CANCEL_ORDER,
            Command::Update { .. } => ACTION_UPDATE_ORDER,
        }
    }
}

/// Decimal price with at most `PRICE_SCALE` fractional digits; extra precision
/// is rejected rather than rounded.
fn parse_price(field: &str) -> OrderBookResult<Price> {
    let price =
        Decimal::from_str(field).map_err(|_| OrderBookError::InvalidPrice(field.to_string()))?;
    if price.scale() > PRICE_SCALE {
        return Err(OrderBookError::PriceTooPrecise(field.to_string()));
    }
    Ok(price)
}

fn parse_size(field: &str) -> OrderBookResult<Quantity> {
    field
        .parse::<Quantity>()
        .map_err(|_| OrderBookError::InvalidQuantity(field.to_string()))
}

impl FromStr for Command {
    type Err = OrderBookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Command::parse(s)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = DELIMITER;
        match self {
            Command::New {
                header,
                order_id,
                ticker,
                side,
                price,
                size,
            } => write!(
                f,
                "{header}{d}{order_id}{d}{ACTION_NEW_ORDER}{d}{ticker}{d}{side}{d}{}{d}{size}",
                format_price(*price)
            ),
            Command::Cancel { header, order_id } => {
                write!(f, "{header}{d}{order_id}{d}{ACTION_CANCEL_ORDER}")
            }
            Command::Update {
                header,
                order_id,
                size,
            } => write!(f, "{header}{d}{order_id}{d}{ACTION_UPDATE_ORDER}{d}{size}"),
        }
    }
}
