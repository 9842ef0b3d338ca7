//! # Cart Model
//!
//! An ordered list of priced lines. Pure data: persistence and change
//! notification live in the kiosk's `CartStore`.
//!
//! ## Positions and Generations
//! ```text
//! lines:       [ Taro ]  [ Matcha ]  [ Mango ]      generation 4
//!                 0          1           2
//!
//! remove(0) ─────────────────────────────────────────────────────
//!
//! lines:       [ Matcha ]  [ Mango ]                generation 5
//!                  0           1
//!
//! LineRef { index: 2, generation: 4 }  → StaleLineReference
//! LineRef { index: 1, generation: 5 }  → Mango
//! ```
//!
//! Lines are never merged: adding the same configuration twice yields two
//! lines. Appending never shifts positions, so `add` does not bump the
//! generation; `remove`, `clear` and reloads do.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use ts_rs::TS;

use crate::drink::DrinkConfiguration;
use crate::error::{CoreError, CoreResult};
use crate::legacy::{self, NormalizeReport};
use crate::money::Money;
use crate::pricing::price;
use crate::types::TaxRate;
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

// =============================================================================
// Cart Line Item
// =============================================================================

/// A drink configuration with a quantity and its derived prices.
///
/// `line_total` is always `unit_price × quantity`; it is recomputed on every
/// change and never read back from storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLineItem {
    config: DrinkConfiguration,
    quantity: i64,
    unit_price: Money,
    toppings_cost: Money,
    line_total: Money,
}

impl CartLineItem {
    /// Prices a configuration at the given quantity (clamped to 1..=999).
    pub fn new(mut config: DrinkConfiguration, quantity: i64) -> Self {
        config.normalize();
        let quote = price(&config);
        CartLineItem::from_parts(config, quantity, quote.unit_price, quote.breakdown.toppings)
    }

    /// Builds a line around an already-known unit price.
    pub(crate) fn from_parts(
        config: DrinkConfiguration,
        quantity: i64,
        unit_price: Money,
        toppings_cost: Money,
    ) -> Self {
        let quantity = clamp_quantity(quantity);
        let unit_price = unit_price.non_negative();
        CartLineItem {
            config,
            quantity,
            unit_price,
            toppings_cost: toppings_cost.non_negative(),
            line_total: unit_price.multiply_quantity(quantity),
        }
    }

    pub fn config(&self) -> &DrinkConfiguration {
        &self.config
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn unit_price(&self) -> Money {
        self.unit_price
    }

    pub fn toppings_cost(&self) -> Money {
        self.toppings_cost
    }

    pub fn line_total(&self) -> Money {
        self.line_total
    }

    fn set_quantity(&mut self, quantity: i64) {
        self.quantity = clamp_quantity(quantity);
        self.line_total = self.unit_price.multiply_quantity(self.quantity);
    }
}

fn clamp_quantity(quantity: i64) -> i64 {
    quantity.clamp(1, MAX_ITEM_QUANTITY)
}

/// Canonical stored form of a line.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StoredLine<'a> {
    #[serde(flatten)]
    config: &'a DrinkConfiguration,
    quantity: i64,
    #[serde(with = "crate::money::dollars")]
    unit_price: Money,
    #[serde(with = "crate::money::dollars")]
    toppings_cost: Money,
    #[serde(with = "crate::money::dollars")]
    line_total: Money,
}

impl Serialize for CartLineItem {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        StoredLine {
            config: &self.config,
            quantity: self.quantity,
            unit_price: self.unit_price,
            toppings_cost: self.toppings_cost,
            line_total: self.line_total,
        }
        .serialize(serializer)
    }
}

/// Reads any historic shape through the legacy normalizer.
impl<'de> Deserialize<'de> for CartLineItem {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        legacy::normalize_entry(&raw)
            .ok_or_else(|| serde::de::Error::custom("cart entry has no drink name"))
    }
}

// =============================================================================
// Line Reference
// =============================================================================

/// A position in the cart, valid only for the generation it was taken at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LineRef {
    pub index: usize,
    pub generation: u64,
}

// =============================================================================
// Totals
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartTotals {
    pub line_count: usize,
    pub total_quantity: i64,
    #[serde(with = "crate::money::dollars")]
    #[ts(type = "number")]
    pub subtotal: Money,
    #[serde(with = "crate::money::dollars")]
    #[ts(type = "number")]
    pub tax: Money,
    #[serde(with = "crate::money::dollars")]
    #[ts(type = "number")]
    pub total: Money,
}

// =============================================================================
// Cart
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    lines: Vec<CartLineItem>,
    generation: u64,
}

impl Cart {
    pub fn new() -> Self {
        Cart::default()
    }

    /// Rebuilds a cart from a stored document of any historic shape.
    pub fn from_document(document: &Value) -> (Self, NormalizeReport) {
        let (lines, report) = legacy::normalize_document(document);
        (
            Cart {
                lines,
                generation: 0,
            },
            report,
        )
    }

    pub fn lines(&self) -> &[CartLineItem] {
        &self.lines
    }

    pub fn get(&self, index: usize) -> Option<&CartLineItem> {
        self.lines.get(index)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Appends a new line. Identical configurations are not merged.
    ///
    /// ## Errors
    /// `CartTooLarge` when the cart already holds the maximum number of lines.
    pub fn add(&mut self, config: DrinkConfiguration, quantity: i64) -> CoreResult<LineRef> {
        if self.lines.len() >= MAX_CART_ITEMS {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_ITEMS,
            });
        }
        self.lines.push(CartLineItem::new(config, quantity));
        Ok(LineRef {
            index: self.lines.len() - 1,
            generation: self.generation,
        })
    }

    /// Sets a line's quantity. Zero removes the line; anything else is
    /// clamped to 1..=999.
    pub fn set_quantity(&mut self, index: usize, quantity: i64) -> CoreResult<()> {
        self.check_index(index)?;
        if quantity == 0 {
            self.remove(index)?;
            return Ok(());
        }
        self.lines[index].set_quantity(quantity);
        Ok(())
    }

    /// Removes a line, shifting later lines down by one.
    pub fn remove(&mut self, index: usize) -> CoreResult<CartLineItem> {
        self.check_index(index)?;
        let removed = self.lines.remove(index);
        self.generation += 1;
        Ok(removed)
    }

    /// Takes a reference to a line at the current generation.
    pub fn line_ref(&self, index: usize) -> CoreResult<LineRef> {
        self.check_index(index)?;
        Ok(LineRef {
            index,
            generation: self.generation,
        })
    }

    /// Resolves a reference to an index, rejecting stale ones.
    pub fn resolve(&self, line: LineRef) -> CoreResult<usize> {
        if line.generation != self.generation {
            return Err(CoreError::StaleLineReference {
                held: line.generation,
                current: self.generation,
            });
        }
        self.check_index(line.index)?;
        Ok(line.index)
    }

    pub fn set_quantity_at(&mut self, line: LineRef, quantity: i64) -> CoreResult<()> {
        let index = self.resolve(line)?;
        self.set_quantity(index, quantity)
    }

    pub fn remove_at(&mut self, line: LineRef) -> CoreResult<CartLineItem> {
        let index = self.resolve(line)?;
        self.remove(index)
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.generation += 1;
    }

    /// Swaps in lines reloaded from storage. Outstanding refs become stale.
    pub fn replace_lines(&mut self, lines: Vec<CartLineItem>) {
        self.lines = lines;
        self.generation += 1;
    }

    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(CartLineItem::line_total).sum()
    }

    /// Sum of quantities, shown on the cart badge.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(CartLineItem::quantity).sum()
    }

    /// Subtotal, tax and total, always recomputed from the lines.
    pub fn totals(&self, tax_rate: TaxRate) -> CartTotals {
        let subtotal = self.subtotal();
        let tax = subtotal.calculate_tax(tax_rate);
        CartTotals {
            line_count: self.lines.len(),
            total_quantity: self.total_quantity(),
            subtotal,
            tax,
            total: subtotal + tax,
        }
    }

    /// The whole-document form written to storage.
    pub fn to_document(&self) -> CoreResult<Value> {
        Ok(serde_json::to_value(&self.lines)?)
    }

    fn check_index(&self, index: usize) -> CoreResult<()> {
        if index >= self.lines.len() {
            return Err(CoreError::LineNotFound {
                index,
                len: self.lines.len(),
            });
        }
        Ok(())
    }
}

impl Serialize for Cart {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.lines.serialize(serializer)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Size;

    const DEFAULT_RATE: TaxRate = TaxRate::from_bps(825);

    fn drink(name: &str, cents: i64) -> DrinkConfiguration {
        DrinkConfiguration::new(name, Money::from_cents(cents))
    }

    #[test]
    fn test_milk_tea_scenario() {
        let mut config = drink("Milk Tea", 400);
        config.size = Size::Large;

        let mut cart = Cart::new();
        cart.add(config, 2).unwrap();

        let line = &cart.lines()[0];
        assert_eq!(line.unit_price().cents(), 440);
        assert_eq!(line.line_total().cents(), 880);

        let totals = cart.totals(DEFAULT_RATE);
        assert_eq!(totals.subtotal.cents(), 880);
        assert_eq!(totals.tax.cents(), 73);
        assert_eq!(totals.total.cents(), 953);
        assert_eq!(totals.total_quantity, 2);
    }

    #[test]
    fn test_identical_add_twice_yields_two_lines() {
        let mut cart = Cart::new();
        cart.add(drink("Taro", 400), 1).unwrap();
        cart.add(drink("Taro", 400), 1).unwrap();
        assert_eq!(cart.len(), 2);
        assert_eq!(cart.total_quantity(), 2);
    }

    #[test]
    fn test_add_then_remove_restores_cart() {
        let mut cart = Cart::new();
        cart.add(drink("Taro", 400), 1).unwrap();
        let before = cart.lines().to_vec();
        let before_totals = cart.totals(DEFAULT_RATE);

        let added = cart.add(drink("Matcha", 500), 3).unwrap();
        cart.remove(added.index).unwrap();

        assert_eq!(cart.lines(), before.as_slice());
        assert_eq!(cart.totals(DEFAULT_RATE), before_totals);
    }

    #[test]
    fn test_set_quantity_zero_is_remove() {
        let mut a = Cart::new();
        a.add(drink("Taro", 400), 1).unwrap();
        a.add(drink("Matcha", 500), 2).unwrap();
        let mut b = a.clone();

        a.set_quantity(0, 0).unwrap();
        b.remove(0).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_remove_shifts_later_lines() {
        let mut cart = Cart::new();
        cart.add(drink("A", 100), 1).unwrap();
        cart.add(drink("B", 100), 1).unwrap();
        cart.add(drink("C", 100), 1).unwrap();

        cart.remove(1).unwrap();
        assert_eq!(cart.get(0).unwrap().name(), "A");
        assert_eq!(cart.get(1).unwrap().name(), "C");
        assert!(matches!(
            cart.remove(2),
            Err(CoreError::LineNotFound { index: 2, len: 2 })
        ));
    }

    #[test]
    fn test_stale_line_ref_is_rejected() {
        let mut cart = Cart::new();
        cart.add(drink("A", 100), 1).unwrap();
        let b = cart.add(drink("B", 100), 1).unwrap();
        cart.add(drink("C", 100), 1).unwrap();

        cart.remove(0).unwrap();
        let before = cart.clone();
        assert!(matches!(
            cart.set_quantity_at(b, 5),
            Err(CoreError::StaleLineReference { .. })
        ));
        assert_eq!(cart, before);

        let fresh = cart.line_ref(0).unwrap();
        cart.set_quantity_at(fresh, 5).unwrap();
        assert_eq!(cart.get(0).unwrap().quantity(), 5);
    }

    #[test]
    fn test_quantity_clamping() {
        let mut cart = Cart::new();
        cart.add(drink("A", 100), -3).unwrap();
        assert_eq!(cart.get(0).unwrap().quantity(), 1);

        cart.set_quantity(0, 5000).unwrap();
        assert_eq!(cart.get(0).unwrap().quantity(), MAX_ITEM_QUANTITY);

        cart.set_quantity(0, -2).unwrap();
        assert_eq!(cart.get(0).unwrap().quantity(), 1);
        assert_eq!(cart.get(0).unwrap().line_total().cents(), 100);
    }

    #[test]
    fn test_cart_too_large() {
        let mut cart = Cart::new();
        for i in 0..MAX_CART_ITEMS {
            cart.add(drink(&format!("Drink {i}"), 100), 1).unwrap();
        }
        assert!(matches!(
            cart.add(drink("One More", 100), 1),
            Err(CoreError::CartTooLarge { .. })
        ));
    }

    #[test]
    fn test_document_round_trip_is_canonical() {
        let mut cart = Cart::new();
        cart.add(drink("Taro", 200).with_toppings(["Pearls"]), 2).unwrap();

        let document = cart.to_document().unwrap();
        let entry = &document[0];
        assert_eq!(entry["unitPrice"], 2.75);
        assert_eq!(entry["lineTotal"], 5.5);
        assert_eq!(entry["toppingsCost"], 0.75);
        assert_eq!(entry["quantity"], 2);

        let (reloaded, report) = Cart::from_document(&document);
        assert_eq!(reloaded.lines(), cart.lines());
        assert_eq!(report.dropped, 0);
    }
}
