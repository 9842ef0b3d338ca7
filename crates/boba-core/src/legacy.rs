//! # Legacy Cart Normalization
//!
//! The persisted cart has been written by several generations of the kiosk.
//! Every one of them must still load.
//!
//! ## Stored Shapes
//! ```text
//! ┌──────────────────┬──────────────────────────────────────┬───────────────────────────┐
//! │ Shape            │ Recognized by                        │ Unit price                │
//! ├──────────────────┼──────────────────────────────────────┼───────────────────────────┤
//! │ Canonical        │ unitPrice present                    │ unitPrice                 │
//! │ LineTotalOnly    │ lineTotal, no unitPrice              │ lineTotal / quantity      │
//! │ Components       │ basePrice, no unitPrice or lineTotal │ basePrice + toppingsCost  │
//! │ Unpriced         │ none of the above                    │ 0                         │
//! └──────────────────┴──────────────────────────────────────┴───────────────────────────┘
//!
//! quantity: `quantity` if positive, else `qty` if positive, else 1
//! unitPrice: never below the size and sweetness surcharges
//! basePrice: kept when the components add up to unitPrice, else
//!            unitPrice − size − sweetness − toppingsCost
//! lineTotal: always recomputed as unitPrice × quantity
//! ```
//!
//! Numbers may arrive as JSON numbers or numeric strings; anything else is
//! treated as absent. Entries that are not objects, or carry no name, are
//! dropped and counted in the [`NormalizeReport`].
//!
//! Normalizing a normalized entry is a no-op on `unitPrice` and `lineTotal`.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::cart::CartLineItem;
use crate::drink::{catalog_id_from_name, DrinkConfiguration, Toppings};
use crate::money::Money;
use crate::pricing::toppings_cost;
use crate::types::{
    deserialize_tea_type, loose_number, IceLevel, Loose, Size, Sweetness, TeaType, Temperature,
};
use crate::MAX_ITEM_QUANTITY;

// =============================================================================
// Raw Entry
// =============================================================================

/// A stored cart entry read as leniently as possible.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawStoredLine {
    #[serde(deserialize_with = "loose_text")]
    pub catalog_id: Option<String>,
    #[serde(deserialize_with = "loose_text")]
    pub id: Option<String>,
    #[serde(deserialize_with = "loose_text")]
    pub name: Option<String>,
    pub size: Size,
    pub ice_level: IceLevel,
    pub sweetness: Sweetness,
    pub temperature: Temperature,
    #[serde(deserialize_with = "deserialize_tea_type")]
    pub tea_type: Option<TeaType>,
    pub toppings: Toppings,
    #[serde(deserialize_with = "loose_number")]
    pub base_price: Option<f64>,
    #[serde(deserialize_with = "loose_number")]
    pub toppings_cost: Option<f64>,
    #[serde(deserialize_with = "loose_number")]
    pub unit_price: Option<f64>,
    #[serde(deserialize_with = "loose_number")]
    pub line_total: Option<f64>,
    #[serde(deserialize_with = "loose_number")]
    pub quantity: Option<f64>,
    #[serde(deserialize_with = "loose_number")]
    pub qty: Option<f64>,
}

fn loose_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Loose::deserialize(deserializer)? {
        Loose::Text(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Loose::Number(n) if n.is_finite() => Some(n.to_string()),
        _ => None,
    })
}

/// How a stored entry was priced when it was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoredShape {
    Canonical,
    LineTotalOnly,
    Components,
    Unpriced,
}

impl RawStoredLine {
    /// Classifies the entry, first match wins.
    pub fn shape(&self) -> StoredShape {
        if self.unit_price.is_some() {
            StoredShape::Canonical
        } else if self.line_total.is_some() {
            StoredShape::LineTotalOnly
        } else if self.base_price.is_some() {
            StoredShape::Components
        } else {
            StoredShape::Unpriced
        }
    }

    /// `quantity` if positive, else `qty` if positive, else 1. At most 999.
    pub fn resolved_quantity(&self) -> i64 {
        let positive = |q: Option<f64>| q.map(f64::floor).filter(|q| *q >= 1.0);
        positive(self.quantity)
            .or_else(|| positive(self.qty))
            .map(|q| q.min(MAX_ITEM_QUANTITY as f64) as i64)
            .unwrap_or(1)
    }

    fn stored_toppings_cost(&self) -> Option<Money> {
        self.toppings_cost.map(Money::from_dollars)
    }

    /// Unit price according to the shape's rule.
    pub fn resolved_unit_price(&self) -> Money {
        let quantity = self.resolved_quantity();
        match self.shape() {
            StoredShape::Canonical => self.unit_price.map(Money::from_dollars),
            StoredShape::LineTotalOnly => self
                .line_total
                .map(|total| Money::from_dollars(total).divide_rounded(quantity)),
            StoredShape::Components => self.base_price.map(|base| {
                Money::from_dollars(base) + self.stored_toppings_cost().unwrap_or_default()
            }),
            StoredShape::Unpriced => None,
        }
        .unwrap_or_default()
        .non_negative()
    }

    fn resolved_toppings_cost(&self) -> Money {
        match (self.stored_toppings_cost(), self.shape()) {
            (Some(cost), _) => cost,
            (None, StoredShape::Components) => Money::zero(),
            (None, _) => toppings_cost(&self.toppings),
        }
        .non_negative()
    }

    /// Converts to a canonical line, or `None` when the entry has no name.
    pub fn into_line(self) -> Option<CartLineItem> {
        let name = self.name.clone()?;
        let quantity = self.resolved_quantity();
        let surcharges = self.size.surcharge() + self.sweetness.surcharge();
        let unit_price = self.resolved_unit_price().max(surcharges);
        let toppings = self.resolved_toppings_cost().min(unit_price - surcharges);

        // Components must add up to the unit price; a stored base price that
        // does not is replaced by the remainder.
        let base_price = match self.base_price.map(Money::from_dollars) {
            Some(base) if base + surcharges + toppings == unit_price => base,
            _ => unit_price - surcharges - toppings,
        };
        let catalog_id = self
            .catalog_id
            .or(self.id)
            .unwrap_or_else(|| catalog_id_from_name(&name));

        let mut config = DrinkConfiguration {
            catalog_id,
            name,
            base_price,
            size: self.size,
            ice_level: self.ice_level,
            sweetness: self.sweetness,
            temperature: self.temperature,
            tea_type: self.tea_type,
            toppings: self.toppings,
        };
        config.normalize();

        Some(CartLineItem::from_parts(config, quantity, unit_price, toppings))
    }
}

// =============================================================================
// Entry Points
// =============================================================================

/// What happened while loading a stored document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    /// Entries in the stored document.
    pub stored: usize,
    /// Entries that could not be turned into a line.
    pub dropped: usize,
    /// Entries whose stored form differs from the normalized line.
    pub rewritten: usize,
    /// The document itself was not an array.
    pub malformed: bool,
}

impl NormalizeReport {
    /// Whether the stored document differs from what would be written back.
    pub fn needs_rewrite(&self) -> bool {
        self.malformed || self.dropped > 0 || self.rewritten > 0
    }
}

/// Normalizes a single stored entry.
pub fn normalize_entry(entry: &Value) -> Option<CartLineItem> {
    if !entry.is_object() {
        return None;
    }
    RawStoredLine::deserialize(entry).ok()?.into_line()
}

/// Normalizes a whole stored cart document.
///
/// A `null` document is an empty cart. Anything else that is not an array
/// is also read as empty, with `malformed` set.
pub fn normalize_document(document: &Value) -> (Vec<CartLineItem>, NormalizeReport) {
    let entries = match document {
        Value::Array(entries) => entries.as_slice(),
        Value::Null => return (Vec::new(), NormalizeReport::default()),
        _ => {
            return (
                Vec::new(),
                NormalizeReport {
                    malformed: true,
                    ..Default::default()
                },
            )
        }
    };

    let mut report = NormalizeReport {
        stored: entries.len(),
        ..Default::default()
    };
    let mut lines = Vec::with_capacity(entries.len());
    for entry in entries {
        let Some(line) = normalize_entry(entry) else {
            report.dropped += 1;
            continue;
        };
        if serde_json::to_value(&line).ok().as_ref() != Some(entry) {
            report.rewritten += 1;
        }
        lines.push(line);
    }
    (lines, report)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawStoredLine {
        RawStoredLine::deserialize(&value).unwrap()
    }

    fn renormalize(line: &CartLineItem) -> CartLineItem {
        let stored = serde_json::to_value(line).unwrap();
        normalize_entry(&stored).unwrap()
    }

    #[test]
    fn test_canonical_shape() {
        let entry = json!({
            "catalogId": "matcha_latte", "name": "Matcha Latte", "basePrice": 4.5,
            "size": "medium", "toppings": ["Pearls"], "toppingsCost": 0.75,
            "quantity": 2, "unitPrice": 5.45, "lineTotal": 99.0
        });
        assert_eq!(raw(entry.clone()).shape(), StoredShape::Canonical);

        let line = normalize_entry(&entry).unwrap();
        assert_eq!(line.unit_price().cents(), 545);
        assert_eq!(line.line_total().cents(), 1090);
        assert_eq!(line.config().catalog_id, "matcha_latte");
    }

    #[test]
    fn test_taro_line_total_only_scenario() {
        let entry = json!({"name": "Taro", "lineTotal": 5.50, "quantity": 2});
        assert_eq!(raw(entry.clone()).shape(), StoredShape::LineTotalOnly);

        let line = normalize_entry(&entry).unwrap();
        assert_eq!(line.unit_price().cents(), 275);
        assert_eq!(line.line_total().cents(), 550);
        assert_eq!(line.config().base_price.cents(), 275);

        let again = renormalize(&line);
        assert_eq!(again.unit_price().cents(), 275);
        assert_eq!(again, line);
    }

    #[test]
    fn test_components_shape_with_qty_alias() {
        let entry = json!({"name": "Brown Sugar Milk", "basePrice": "4.25", "toppingsCost": 1.5, "qty": 3});
        assert_eq!(raw(entry.clone()).shape(), StoredShape::Components);

        let line = normalize_entry(&entry).unwrap();
        assert_eq!(line.quantity(), 3);
        assert_eq!(line.unit_price().cents(), 575);
        assert_eq!(line.line_total().cents(), 1725);
        assert_eq!(line.config().catalog_id, "brown_sugar_milk");
    }

    #[test]
    fn test_components_shape_without_toppings_cost() {
        let entry = json!({"name": "Oolong", "basePrice": 3.0, "toppings": ["Pudding"]});
        let line = normalize_entry(&entry).unwrap();
        assert_eq!(line.unit_price().cents(), 300);
        assert_eq!(line.toppings_cost(), Money::zero());
    }

    #[test]
    fn test_base_price_missing_surcharges_is_backfilled() {
        let entry = json!({"name": "Milk Tea", "basePrice": 4.0, "sweetness": "125%",
                           "toppingsCost": 0, "lineTotal": 4.0, "qty": 1});
        let line = normalize_entry(&entry).unwrap();
        assert_eq!(line.unit_price().cents(), 400);
        assert_eq!(line.config().base_price.cents(), 380);

        let entry = json!({"name": "Milk Tea", "basePrice": 4.0, "size": "medium", "qty": 2});
        let line = normalize_entry(&entry).unwrap();
        assert_eq!(line.unit_price().cents(), 400);
        assert_eq!(line.line_total().cents(), 800);
        assert_eq!(line.config().base_price.cents(), 380);
    }

    #[test]
    fn test_unit_price_covers_surcharges() {
        let entry = json!({"name": "Mystery", "size": "large", "toppings": ["Pearls"]});
        let line = normalize_entry(&entry).unwrap();
        assert_eq!(line.unit_price().cents(), 40);
        assert_eq!(line.toppings_cost(), Money::zero());
        assert_eq!(line.config().base_price, Money::zero());
    }

    #[test]
    fn test_unpriced_shape() {
        let entry = json!({"name": "Mystery", "quantity": "abc"});
        assert_eq!(raw(entry.clone()).shape(), StoredShape::Unpriced);

        let line = normalize_entry(&entry).unwrap();
        assert_eq!(line.quantity(), 1);
        assert_eq!(line.unit_price(), Money::zero());
    }

    #[test]
    fn test_quantity_resolution() {
        assert_eq!(raw(json!({"quantity": 0, "qty": 4})).resolved_quantity(), 4);
        assert_eq!(raw(json!({"quantity": -2})).resolved_quantity(), 1);
        assert_eq!(raw(json!({"quantity": "3"})).resolved_quantity(), 3);
        assert_eq!(raw(json!({"quantity": 12345})).resolved_quantity(), 999);
    }

    #[test]
    fn test_legacy_id_field() {
        let line = normalize_entry(&json!({"id": "taro_slush", "name": "Taro", "unitPrice": 4})).unwrap();
        assert_eq!(line.config().catalog_id, "taro_slush");
    }

    #[test]
    fn test_normalization_is_idempotent_across_shapes() {
        let entries = [
            json!({"name": "A", "lineTotal": 10.0, "quantity": 3}),
            json!({"name": "B", "basePrice": 4.0, "toppings": "Pearls, Pudding", "qty": 2}),
            json!({"name": "C", "unitPrice": 3.1, "size": "large", "sweetness": 125}),
            json!({"name": "D"}),
        ];
        for entry in entries {
            let once = normalize_entry(&entry).unwrap();
            let twice = renormalize(&once);
            assert_eq!(once.unit_price(), twice.unit_price());
            assert_eq!(once.line_total(), twice.line_total());
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_document_drops_unusable_entries() {
        let document = json!([
            {"name": "Taro", "lineTotal": 5.5, "quantity": 2},
            "garbage",
            {"lineTotal": 3.0},
            null
        ]);
        let (lines, report) = normalize_document(&document);
        assert_eq!(lines.len(), 1);
        assert_eq!(report.stored, 4);
        assert_eq!(report.dropped, 3);
        assert_eq!(report.rewritten, 1);
        assert!(report.needs_rewrite());
    }

    #[test]
    fn test_stale_stored_total_needs_rewrite() {
        let document = json!([{"name": "Milk Tea", "basePrice": 4.0, "unitPrice": 4.0,
                               "toppingsCost": 0, "quantity": 2, "lineTotal": 99.0}]);
        let (lines, report) = normalize_document(&document);
        assert_eq!(lines[0].line_total().cents(), 800);
        assert_eq!(report.rewritten, 1);
        assert!(report.needs_rewrite());

        let normalized = serde_json::to_value(&lines).unwrap();
        let (again, report) = normalize_document(&normalized);
        assert_eq!(again, lines);
        assert!(!report.needs_rewrite());
    }

    #[test]
    fn test_non_array_document() {
        let (lines, report) = normalize_document(&json!({"items": []}));
        assert!(lines.is_empty());
        assert!(report.malformed);

        let (lines, report) = normalize_document(&Value::Null);
        assert!(lines.is_empty());
        assert!(!report.needs_rewrite());
    }
}
