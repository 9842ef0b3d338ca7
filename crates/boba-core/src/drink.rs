//! # Drink Configuration
//!
//! The value object for one customized drink, before quantity.
//!
//! ## Where Configurations Come From
//! ```text
//! ┌──────────────────────┐      ┌──────────────────────┐
//! │ Catalog pick +       │      │ Persisted cart entry │
//! │ popup answers        │      │ (any historic shape) │
//! └──────────┬───────────┘      └──────────┬───────────┘
//!            │ from_catalog()              │ legacy::normalize_entry()
//!            │ (capability checks)         │ (lenient, never fails)
//!            ▼                             ▼
//!        ┌──────────────────────────────────────┐
//!        │          DrinkConfiguration          │
//!        │  catalogId, name, basePrice, size,   │
//!        │  iceLevel, sweetness, temperature,   │
//!        │  teaType, toppings                   │
//!        └──────────────────────────────────────┘
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use ts_rs::TS;

use crate::catalog::CatalogEntry;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{
    deserialize_tea_type, is_known_topping, IceLevel, Size, Sweetness, TeaType, Temperature,
};

// =============================================================================
// Toppings
// =============================================================================

/// Toppings on a drink.
///
/// Order is kept for display and for the `", "`-joined storage form;
/// equality ignores order. Duplicates are dropped keeping the first one.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Toppings(Vec<String>);

impl Toppings {
    pub fn new<I, S>(toppings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut kept: Vec<String> = Vec::new();
        for topping in toppings {
            let topping = topping.as_ref().trim();
            if topping.is_empty() || kept.iter().any(|k| k.eq_ignore_ascii_case(topping)) {
                continue;
            }
            kept.push(topping.to_string());
        }
        Toppings(kept)
    }

    /// Parses the `"Pearls, Pudding"` form stored in order rows.
    pub fn from_joined(joined: &str) -> Self {
        Toppings::new(joined.split(','))
    }

    /// Joins in original order, as stored and as compared by favorites.
    pub fn joined(&self) -> String {
        self.0.join(", ")
    }

    pub fn count(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Lowercased and sorted, for order-insensitive comparison.
    pub fn canonical(&self) -> Vec<String> {
        let mut items: Vec<String> = self.0.iter().map(|t| t.to_ascii_lowercase()).collect();
        items.sort();
        items
    }

    /// First topping not on the menu, if any.
    pub fn first_unknown(&self) -> Option<&str> {
        self.iter().find(|t| !is_known_topping(t))
    }
}

impl PartialEq for Toppings {
    fn eq(&self, other: &Self) -> bool {
        self.canonical() == other.canonical()
    }
}

impl Eq for Toppings {}

impl<'de> Deserialize<'de> for Toppings {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Array(items) => Toppings::new(
                items
                    .iter()
                    .filter_map(|item| item.as_str().map(str::to_string)),
            ),
            Value::String(joined) => Toppings::from_joined(&joined),
            _ => Toppings::default(),
        })
    }
}

// =============================================================================
// Drink Configuration
// =============================================================================

/// One customized drink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct DrinkConfiguration {
    /// Catalog key; derived from `name` when absent.
    pub catalog_id: String,

    pub name: String,

    /// Catalog price before upcharges.
    #[serde(with = "crate::money::dollars")]
    #[ts(type = "number")]
    pub base_price: Money,

    pub size: Size,

    pub ice_level: IceLevel,

    pub sweetness: Sweetness,

    pub temperature: Temperature,

    #[serde(deserialize_with = "deserialize_tea_type")]
    pub tea_type: Option<TeaType>,

    #[ts(type = "string[]")]
    pub toppings: Toppings,
}

impl Default for DrinkConfiguration {
    fn default() -> Self {
        DrinkConfiguration {
            catalog_id: String::new(),
            name: String::new(),
            base_price: Money::zero(),
            size: Size::default(),
            ice_level: IceLevel::default(),
            sweetness: Sweetness::default(),
            temperature: Temperature::default(),
            tea_type: None,
            toppings: Toppings::default(),
        }
    }
}

impl DrinkConfiguration {
    /// A baseline drink: small, regular ice, 100%, iced, no toppings.
    pub fn new(name: impl Into<String>, base_price: Money) -> Self {
        let name = name.into();
        DrinkConfiguration {
            catalog_id: catalog_id_from_name(&name),
            name,
            base_price,
            ..Default::default()
        }
    }

    pub fn with_toppings<I, S>(mut self, toppings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.toppings = Toppings::new(toppings);
        self
    }

    /// Builds a configuration from a catalog pick and the popup's answers.
    ///
    /// ## Errors
    /// - `OutOfStock` when the entry has no remaining quantity
    /// - `UnsupportedOption` for hot on a cold-only drink, a tea type on a
    ///   drink without tea options, or a topping not on the menu
    pub fn from_catalog(entry: &CatalogEntry, answers: Customization) -> CoreResult<Self> {
        if !entry.is_available() {
            return Err(CoreError::OutOfStock {
                name: entry.name.clone(),
            });
        }
        if answers.temperature == Temperature::Hot && !entry.supports_hot {
            return Err(CoreError::unsupported(&entry.name, "hot"));
        }
        if let Some(tea) = answers.tea_type {
            if !entry.supports_tea {
                return Err(CoreError::unsupported(
                    &entry.name,
                    format!("{} tea", tea.as_str()),
                ));
            }
        }
        if let Some(unknown) = answers.toppings.first_unknown() {
            return Err(CoreError::unsupported(&entry.name, unknown));
        }

        let mut config = DrinkConfiguration {
            catalog_id: entry.catalog_id.clone(),
            name: entry.name.clone(),
            base_price: entry.base_price,
            size: answers.size,
            ice_level: answers.ice_level,
            sweetness: answers.sweetness,
            temperature: answers.temperature,
            tea_type: answers.tea_type,
            toppings: answers.toppings,
        };
        config.normalize();
        Ok(config)
    }

    /// Fills the catalog id and resets ice on hot drinks.
    pub fn normalize(&mut self) {
        if self.catalog_id.trim().is_empty() {
            self.catalog_id = catalog_id_from_name(&self.name);
        }
        if self.temperature == Temperature::Hot {
            self.ice_level = IceLevel::Regular;
        }
    }

    pub fn is_hot(&self) -> bool {
        self.temperature == Temperature::Hot
    }
}

/// Derives a catalog id: lowercase, whitespace runs become `_`, anything
/// outside `[a-z0-9_]` is dropped.
///
/// ```rust
/// use boba_core::drink::catalog_id_from_name;
///
/// assert_eq!(catalog_id_from_name("Classic Milk Tea"), "classic_milk_tea");
/// assert_eq!(catalog_id_from_name("  Brown Sugar  (Boba)!"), "brown_sugar_boba");
/// ```
pub fn catalog_id_from_name(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_')
        .collect()
}

// =============================================================================
// Customization Answers
// =============================================================================

/// What the customization popup collected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Customization {
    pub size: Size,
    pub ice_level: IceLevel,
    pub sweetness: Sweetness,
    pub temperature: Temperature,
    #[serde(deserialize_with = "deserialize_tea_type")]
    pub tea_type: Option<TeaType>,
    pub toppings: Toppings,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(supports_hot: bool, supports_tea: bool) -> CatalogEntry {
        CatalogEntry {
            catalog_id: "mango_smoothie".into(),
            name: "Mango Smoothie".into(),
            series: "Ice Blended Series".into(),
            base_price: Money::from_cents(525),
            supports_hot,
            supports_tea,
            qty_remaining: Some(10),
            image_url: None,
        }
    }

    #[test]
    fn test_toppings_dedupe_and_order_insensitive_eq() {
        let a = Toppings::new(["Pearls", "Pudding", "pearls"]);
        assert_eq!(a.count(), 2);
        assert_eq!(a.joined(), "Pearls, Pudding");

        let b = Toppings::from_joined("Pudding, Pearls");
        assert_eq!(a, b);
        assert_ne!(a.joined(), b.joined());
    }

    #[test]
    fn test_toppings_lenient_deserialize() {
        let t: Toppings = serde_json::from_str(r#"["Pearls", 3, "Lychee Jelly"]"#).unwrap();
        assert_eq!(t.count(), 2);
        let t: Toppings = serde_json::from_str(r#""Pearls, , Pudding""#).unwrap();
        assert_eq!(t.count(), 2);
        let t: Toppings = serde_json::from_str("null").unwrap();
        assert!(t.is_empty());
    }

    #[test]
    fn test_hot_on_cold_only_rejected() {
        let answers = Customization {
            temperature: Temperature::Hot,
            ..Default::default()
        };
        let err = DrinkConfiguration::from_catalog(&entry(false, false), answers).unwrap_err();
        assert!(matches!(err, CoreError::UnsupportedOption { ref option, .. } if option == "hot"));
    }

    #[test]
    fn test_tea_type_requires_tea_options() {
        let answers = Customization {
            tea_type: Some(TeaType::Green),
            ..Default::default()
        };
        assert!(DrinkConfiguration::from_catalog(&entry(true, false), answers.clone()).is_err());
        let config = DrinkConfiguration::from_catalog(&entry(true, true), answers).unwrap();
        assert_eq!(config.tea_type, Some(TeaType::Green));
    }

    #[test]
    fn test_hot_resets_ice_level() {
        let answers = Customization {
            temperature: Temperature::Hot,
            ice_level: IceLevel::NoIce,
            ..Default::default()
        };
        let config = DrinkConfiguration::from_catalog(&entry(true, false), answers).unwrap();
        assert_eq!(config.ice_level, IceLevel::Regular);
        assert_eq!(config.catalog_id, "mango_smoothie");
    }

    #[test]
    fn test_out_of_stock_rejected() {
        let mut sold_out = entry(true, true);
        sold_out.qty_remaining = Some(0);
        let err = DrinkConfiguration::from_catalog(&sold_out, Customization::default()).unwrap_err();
        assert!(matches!(err, CoreError::OutOfStock { .. }));
    }

    #[test]
    fn test_unknown_topping_rejected() {
        let answers = Customization {
            toppings: Toppings::new(["Gold Flakes"]),
            ..Default::default()
        };
        assert!(DrinkConfiguration::from_catalog(&entry(true, true), answers).is_err());
    }

    #[test]
    fn test_configuration_wire_shape() {
        let config = DrinkConfiguration::new("Taro Milk Tea", Money::from_cents(400))
            .with_toppings(["Pearls"]);
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["catalogId"], "taro_milk_tea");
        assert_eq!(json["basePrice"], 4.0);
        assert_eq!(json["sweetness"], "100%");
        assert_eq!(json["iceLevel"], "regular");
        assert_eq!(json["toppings"][0], "Pearls");
    }
}
