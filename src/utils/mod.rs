pub mod time;

use crate::orderbook::types::{Price, PRICE_SCALE};

/// Render a price with exactly `PRICE_SCALE` fractional digits
pub fn format_price(price: Price) -> String {
    format!("{:.*}", PRICE_SCALE as usize, price)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(dec!(209)), "209.00000");
        assert_eq!(format_price(dec!(125.5)), "125.50000");
        assert_eq!(format_price(dec!(0.00001)), "0.00001");
        assert_eq!(format_price(Price::ZERO), "0.00000");
    }
}
