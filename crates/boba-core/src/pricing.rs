//! # Pricing Engine
//!
//! Deterministic unit price for a drink configuration.
//!
//! ```text
//! unitPrice = basePrice + size + sweetness + 0.75 × toppings
//!                           │        │                │
//!               small  0.00 │  125% +0.20   once per drink, not per
//!               medium 0.20 │  else  0.00   quantity: the line total
//!               large  0.40 ┘               multiplies the whole unit
//!
//! lineTotal = unitPrice × quantity
//! ```
//!
//! There are no error conditions. A negative base price is clamped to zero
//! so a unit price is never negative.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::drink::{DrinkConfiguration, Toppings};
use crate::money::Money;
use crate::types::TOPPING_PRICE;

/// The components of a unit price. Always sums to the unit price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PriceBreakdown {
    pub base: Money,
    pub size: Money,
    pub sweetness: Money,
    pub toppings: Money,
}

impl PriceBreakdown {
    pub fn total(&self) -> Money {
        self.base + self.size + self.sweetness + self.toppings
    }
}

/// A priced configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PriceQuote {
    pub unit_price: Money,
    pub breakdown: PriceBreakdown,
}

impl PriceQuote {
    /// Unit price times quantity.
    pub fn line_total(&self, quantity: i64) -> Money {
        self.unit_price.multiply_quantity(quantity)
    }
}

/// Surcharge for a set of toppings, per drink.
pub fn toppings_cost(toppings: &Toppings) -> Money {
    TOPPING_PRICE * toppings.count() as i64
}

/// Prices a configuration.
///
/// ## Example
/// ```rust
/// use boba_core::{price, DrinkConfiguration, Money, Size, Sweetness};
///
/// let mut config = DrinkConfiguration::new("Brown Sugar Milk", Money::from_cents(450))
///     .with_toppings(["Pearls", "Pudding"]);
/// config.size = Size::Medium;
/// config.sweetness = Sweetness::Extra;
///
/// let quote = price(&config);
/// assert_eq!(quote.unit_price.to_string(), "$6.40");
/// assert_eq!(quote.line_total(3).to_string(), "$19.20");
/// ```
pub fn price(config: &DrinkConfiguration) -> PriceQuote {
    let breakdown = PriceBreakdown {
        base: config.base_price.non_negative(),
        size: config.size.surcharge(),
        sweetness: config.sweetness.surcharge(),
        toppings: toppings_cost(&config.toppings),
    };
    PriceQuote {
        unit_price: breakdown.total(),
        breakdown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Size, Sweetness};

    #[test]
    fn test_baseline_is_base_price() {
        let config = DrinkConfiguration::new("Classic Milk Tea", Money::from_cents(400));
        let quote = price(&config);
        assert_eq!(quote.unit_price.cents(), 400);
        assert_eq!(quote.breakdown.toppings, Money::zero());
    }

    #[test]
    fn test_formula_over_all_sizes_and_sweetness() {
        let base = Money::from_cents(375);
        for size in [Size::Small, Size::Medium, Size::Large] {
            for sweetness in Sweetness::ALL {
                for n in 0..4usize {
                    let toppings: Vec<String> = (0..n).map(|i| format!("t{i}")).collect();
                    let mut config = DrinkConfiguration::new("Drink", base).with_toppings(toppings);
                    config.size = size;
                    config.sweetness = sweetness;

                    let quote = price(&config);
                    let expected =
                        base + size.surcharge() + sweetness.surcharge() + TOPPING_PRICE * n as i64;
                    assert_eq!(quote.unit_price, expected);
                    assert_eq!(quote.breakdown.total(), quote.unit_price);
                }
            }
        }
    }

    #[test]
    fn test_toppings_scale_with_count_not_quantity() {
        let config = DrinkConfiguration::new("Taro", Money::from_cents(200))
            .with_toppings(["Pearls"]);
        let quote = price(&config);
        assert_eq!(quote.unit_price.cents(), 275);
        assert_eq!(quote.line_total(2).cents(), 550);
    }

    #[test]
    fn test_negative_base_price_clamped() {
        let config = DrinkConfiguration::new("Broken", Money::from_cents(-500));
        let quote = price(&config);
        assert_eq!(quote.unit_price, Money::zero());
        assert!(!quote.unit_price.is_negative());
    }
}
