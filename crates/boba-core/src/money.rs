//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Cents Inside, Dollars on the Wire
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Persisted cart / HTTP JSON        boba-core                            │
//! │                                                                         │
//! │  { "basePrice": 4.4 }  ──parse──►  Money(440)  ──math in i64──►        │
//! │                                                                         │
//! │  Money(953)  ──serialize──►  9.53       ──display──►  "$9.53"          │
//! │                                                                         │
//! │  0.75 + 0.75 + 0.20 is 1.7 exactly, because it is 75 + 75 + 20 cents   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use boba_core::money::Money;
//!
//! let base = Money::from_cents(400);          // $4.00
//! let large = base + Money::from_cents(40);   // $4.40
//! assert_eq!((large * 2).to_string(), "$8.80");
//!
//! // Dollar amounts only enter through the wire parsers.
//! assert_eq!(Money::from_dollars(2.75).cents(), 275);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::types::TaxRate;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in cents.
///
/// ## Where Money Flows
/// ```text
/// Catalog price ──► DrinkConfiguration.base_price ──► price() ──► unit price
///                                                                    │
///                        CartLineItem.line_total ◄── × quantity ◄────┘
///                                 │
///                                 ▼
///               Cart subtotal ──► tax (825 bps) ──► total
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Converts a dollar amount read from a JSON payload to cents.
    ///
    /// Rounds half away from zero on the cent. The value is first scaled to
    /// micro-dollars so that binary artifacts like `2.675 * 100 = 267.4999…`
    /// still land on the cent the writer meant. Non-finite input is zero.
    ///
    /// ## Example
    /// ```rust
    /// use boba_core::money::Money;
    ///
    /// assert_eq!(Money::from_dollars(9.526).cents(), 953);
    /// assert_eq!(Money::from_dollars(2.675).cents(), 268);
    /// assert_eq!(Money::from_dollars(-1.005).cents(), -101);
    /// assert_eq!(Money::from_dollars(f64::NAN).cents(), 0);
    /// ```
    pub fn from_dollars(dollars: f64) -> Self {
        if !dollars.is_finite() {
            return Money::zero();
        }
        let micros = (dollars * 1_000_000.0).round() as i128;
        let half = if micros < 0 { -5_000 } else { 5_000 };
        Money(((micros + half) / 10_000) as i64)
    }

    /// Returns the value in dollars, for JSON encoding only.
    #[inline]
    pub fn to_dollars(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole-dollar portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the cents portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Clamps negative amounts to zero.
    ///
    /// Prices never go below zero, whatever a stored payload claims.
    #[inline]
    pub const fn non_negative(self) -> Self {
        if self.0 < 0 {
            Money(0)
        } else {
            self
        }
    }

    /// Calculates tax, rounding half up to the cent.
    ///
    /// ## Implementation
    /// Integer math: `(amount * bps + 5000) / 10000`.
    ///
    /// ## Example
    /// ```rust
    /// use boba_core::money::Money;
    /// use boba_core::types::TaxRate;
    ///
    /// // $8.80 × 8.25% = $0.726 → $0.73
    /// let tax = Money::from_cents(880).calculate_tax(TaxRate::from_bps(825));
    /// assert_eq!(tax.cents(), 73);
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        let tax_cents = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_cents(tax_cents as i64)
    }

    /// Multiplies money by a quantity.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Divides evenly across `parts`, rounding half away from zero.
    ///
    /// Used to recover a unit price from a stored line total. Returns the
    /// amount unchanged when `parts` is not positive.
    ///
    /// ## Example
    /// ```rust
    /// use boba_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(550).divide_rounded(2).cents(), 275);
    /// assert_eq!(Money::from_cents(1000).divide_rounded(3).cents(), 333);
    /// assert_eq!(Money::from_cents(500).divide_rounded(3).cents(), 167);
    /// ```
    pub fn divide_rounded(&self, parts: i64) -> Money {
        if parts <= 0 {
            return *self;
        }
        let doubled = self.0 as i128 * 2;
        let divisor = parts as i128 * 2;
        let rounded = if doubled < 0 {
            (doubled - parts as i128) / divisor
        } else {
            (doubled + parts as i128) / divisor
        };
        Money(rounded as i64)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows money as the kiosk displays it: `$9.53`, `-$0.20`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Dollar Wire Format
// =============================================================================

/// Serde adapter that writes `Money` as a dollar number (`4.4`) and reads
/// any JSON number back into cents.
///
/// ## Usage
/// ```rust
/// use boba_core::money::Money;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Line {
///     #[serde(with = "boba_core::money::dollars")]
///     price: Money,
/// }
///
/// let line: Line = serde_json::from_str(r#"{"price": 4.4}"#).unwrap();
/// assert_eq!(line.price.cents(), 440);
/// assert_eq!(serde_json::to_string(&line).unwrap(), r#"{"price":4.4}"#);
/// ```
pub mod dollars {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::Money;

    pub fn serialize<S: Serializer>(value: &Money, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.to_dollars())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Money, D::Error> {
        f64::deserialize(deserializer).map(Money::from_dollars)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.dollars(), 10);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(953).to_string(), "$9.53");
        assert_eq!(Money::from_cents(75).to_string(), "$0.75");
        assert_eq!(Money::from_cents(-20).to_string(), "-$0.20");
        assert_eq!(Money::zero().to_string(), "$0.00");
    }

    #[test]
    fn test_from_dollars_rounding() {
        assert_eq!(Money::from_dollars(4.0).cents(), 400);
        assert_eq!(Money::from_dollars(0.1 + 0.2).cents(), 30);
        assert_eq!(Money::from_dollars(1.005).cents(), 101);
        assert_eq!(Money::from_dollars(f64::INFINITY).cents(), 0);
    }

    #[test]
    fn test_tax_scenario() {
        // Large milk tea x2: subtotal $8.80, 8.25% → $0.726 → $0.73
        let subtotal = Money::from_cents(880);
        let tax = subtotal.calculate_tax(TaxRate::from_bps(825));
        assert_eq!(tax.cents(), 73);
        assert_eq!((subtotal + tax).to_string(), "$9.53");
    }

    #[test]
    fn test_non_negative() {
        assert_eq!(Money::from_cents(-40).non_negative(), Money::zero());
        assert_eq!(Money::from_cents(40).non_negative().cents(), 40);
    }

    #[test]
    fn test_sum() {
        let total: Money = [75, 75, 20].into_iter().map(Money::from_cents).sum();
        assert_eq!(total.cents(), 170);
    }

    /// $10.00 stored as a 3-drink line total comes back as 3 × $3.33.
    #[test]
    fn test_division_precision_loss_documented() {
        let line_total = Money::from_cents(1000);
        let unit = line_total.divide_rounded(3);
        assert_eq!(unit.cents(), 333);
        assert_eq!((unit * 3).cents(), 999);
    }

    #[test]
    fn test_divide_rounded_negative_and_degenerate() {
        assert_eq!(Money::from_cents(-550).divide_rounded(2).cents(), -275);
        assert_eq!(Money::from_cents(-500).divide_rounded(3).cents(), -167);
        assert_eq!(Money::from_cents(550).divide_rounded(0).cents(), 550);
    }
}
