//! The product entity.

use rust_decimal::{Decimal, RoundingStrategy};

/// Scale of the `price` column.
pub const PRICE_SCALE: u32 = 2;

/// Lowest accepted price, inclusive.
pub fn min_price() -> Decimal {
    Decimal::new(1, 2)
}

/// Highest accepted price, inclusive.
pub fn max_price() -> Decimal {
    Decimal::new(10_000, 0)
}

/// A stored product row.
#[derive(Clone, Debug, PartialEq, Eq, sqlx::FromRow)]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub price: Decimal,
}

/// Validated name and price, ready to insert or to replace an existing row's values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProductInput {
    pub name: String,
    pub price: Decimal,
}

impl ProductInput {
    /// Price rounded the way the `NUMERIC(18,2)` column stores it.
    pub fn stored_price(&self) -> Decimal {
        self.price
            .round_dp_with_strategy(PRICE_SCALE, RoundingStrategy::MidpointAwayFromZero)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn stored_price_rounds_half_away_from_zero() {
        let input = ProductInput {
            name: "Widget".into(),
            price: Decimal::from_str("19.995").unwrap(),
        };
        assert_eq!(input.stored_price(), Decimal::from_str("20.00").unwrap());

        let input = ProductInput {
            name: "Widget".into(),
            price: Decimal::from_str("12.5").unwrap(),
        };
        assert_eq!(input.stored_price(), Decimal::from_str("12.50").unwrap());
    }
}
