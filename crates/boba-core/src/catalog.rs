//! # Catalog Lookup
//!
//! The menu as the server publishes it, and the flattened lookup the kiosk
//! and the order validator work against.
//!
//! ```text
//! GET /api/menu                              Catalog
//! { ok, series: {                            ┌──────────────────────────────┐
//!     "Milky Series": [ MenuDrink, .. ],  ─► │ catalogId → CatalogEntry     │
//!     "Other":        [ MenuDrink, .. ]      │ (name, series, basePrice,    │
//! } }                                        │  supportsHot, supportsTea)   │
//!                                            └──────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::drink::{catalog_id_from_name, DrinkConfiguration};
use crate::error::{CoreError, CoreResult};
use crate::money::Money;

/// Series name for drinks without one.
pub const DEFAULT_SERIES: &str = "Other";

/// Image shown for drinks without a picture.
pub const PLACEHOLDER_IMAGE: &str = "/Images/placeholder.png";

/// Public image path for a stored file name.
pub fn image_url(file_name: Option<&str>) -> String {
    match file_name.map(str::trim).filter(|f| !f.is_empty()) {
        Some(file) => format!("/Images/{file}"),
        None => PLACEHOLDER_IMAGE.to_string(),
    }
}

// =============================================================================
// Wire Shapes
// =============================================================================

/// One row of `GET /api/menu`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuDrink {
    #[serde(default)]
    pub catalog_id: Option<String>,
    pub drink_name: String,
    #[serde(default)]
    pub series_name: Option<String>,
    #[serde(default)]
    pub qty_remaining: Option<i64>,
    #[serde(with = "crate::money::dollars")]
    pub drink_price: Money,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub hot_option: bool,
    #[serde(default)]
    pub tea_options: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuResponse {
    pub ok: bool,
    pub series: BTreeMap<String, Vec<MenuDrink>>,
}

impl MenuResponse {
    /// Groups rows by series, `"Other"` for rows without one.
    pub fn group(rows: Vec<MenuDrink>) -> Self {
        let mut series: BTreeMap<String, Vec<MenuDrink>> = BTreeMap::new();
        for row in rows {
            let key = row
                .series_name
                .clone()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_SERIES.to_string());
            series.entry(key).or_default().push(row);
        }
        MenuResponse { ok: true, series }
    }
}

/// One drink of `GET /api/drinks`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrinkListing {
    pub name: String,
    #[serde(default)]
    pub series: Option<String>,
    #[serde(with = "crate::money::dollars")]
    pub price: Money,
    #[serde(default)]
    pub hot_option: bool,
    #[serde(default)]
    pub tea_options: bool,
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrinksResponse {
    pub drinks: Vec<DrinkListing>,
}

// =============================================================================
// Catalog Entry
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub catalog_id: String,
    pub name: String,
    pub series: String,
    #[serde(with = "crate::money::dollars")]
    pub base_price: Money,
    pub supports_hot: bool,
    pub supports_tea: bool,
    /// `None` when stock is not tracked.
    pub qty_remaining: Option<i64>,
    pub image_url: Option<String>,
}

impl CatalogEntry {
    pub fn is_available(&self) -> bool {
        self.qty_remaining.map_or(true, |qty| qty > 0)
    }

    fn from_menu_drink(series: &str, drink: &MenuDrink) -> Self {
        CatalogEntry {
            catalog_id: drink
                .catalog_id
                .clone()
                .unwrap_or_else(|| catalog_id_from_name(&drink.drink_name)),
            name: drink.drink_name.clone(),
            series: series.to_string(),
            base_price: drink.drink_price,
            supports_hot: drink.hot_option,
            supports_tea: drink.tea_options,
            qty_remaining: drink.qty_remaining,
            image_url: Some(image_url(drink.file_name.as_deref())),
        }
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// Flattened catalog, in menu order, keyed by catalog id.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
    by_id: HashMap<String, usize>,
}

impl Catalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        let by_id = entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (entry.catalog_id.clone(), i))
            .collect();
        Catalog { entries, by_id }
    }

    pub fn from_menu(menu: &MenuResponse) -> Self {
        Catalog::new(
            menu.series
                .iter()
                .flat_map(|(series, drinks)| {
                    drinks
                        .iter()
                        .map(move |drink| CatalogEntry::from_menu_drink(series, drink))
                })
                .collect(),
        )
    }

    /// Listings carry no stock, so every entry is treated as available.
    pub fn from_listings(listings: &[DrinkListing]) -> Self {
        Catalog::new(
            listings
                .iter()
                .map(|listing| CatalogEntry {
                    catalog_id: catalog_id_from_name(&listing.name),
                    name: listing.name.clone(),
                    series: listing
                        .series
                        .clone()
                        .unwrap_or_else(|| DEFAULT_SERIES.to_string()),
                    base_price: listing.price,
                    supports_hot: listing.hot_option,
                    supports_tea: listing.tea_options,
                    qty_remaining: None,
                    image_url: Some(listing.image_url.clone()),
                })
                .collect(),
        )
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, catalog_id: &str) -> Option<&CatalogEntry> {
        self.by_id.get(catalog_id).map(|&i| &self.entries[i])
    }

    pub fn find_by_name(&self, name: &str) -> Option<&CatalogEntry> {
        let name = name.trim();
        self.entries
            .iter()
            .find(|entry| entry.name.eq_ignore_ascii_case(name))
    }

    /// Finds the entry for a configuration, by id first, then by name.
    pub fn lookup(&self, config: &DrinkConfiguration) -> Option<&CatalogEntry> {
        self.get(&config.catalog_id)
            .or_else(|| self.find_by_name(&config.name))
    }

    /// Re-checks a configuration against the catalog's capability flags.
    pub fn check(&self, config: &DrinkConfiguration) -> CoreResult<&CatalogEntry> {
        let entry = self
            .lookup(config)
            .ok_or_else(|| CoreError::DrinkNotFound(config.name.clone()))?;
        if !entry.is_available() {
            return Err(CoreError::OutOfStock {
                name: entry.name.clone(),
            });
        }
        if config.is_hot() && !entry.supports_hot {
            return Err(CoreError::unsupported(&entry.name, "hot"));
        }
        if let Some(tea) = config.tea_type {
            if !entry.supports_tea {
                return Err(CoreError::unsupported(
                    &entry.name,
                    format!("{} tea", tea.as_str()),
                ));
            }
        }
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{TeaType, Temperature};

    fn menu() -> MenuResponse {
        let json = r#"{
            "ok": true,
            "series": {
                "Milky Series": [
                    {"drink_name": "Classic Milk Tea", "series_name": "Milky Series",
                     "qty_remaining": 20, "drink_price": 4.0, "file_name": "milk.png",
                     "hot_option": true, "tea_options": true}
                ],
                "Ice Blended Series": [
                    {"drink_name": "Mango Smoothie", "series_name": "Ice Blended Series",
                     "qty_remaining": 0, "drink_price": 5.25}
                ]
            }
        }"#;
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_flatten_menu() {
        let catalog = Catalog::from_menu(&menu());
        assert_eq!(catalog.len(), 2);

        let milk = catalog.get("classic_milk_tea").unwrap();
        assert_eq!(milk.base_price.cents(), 400);
        assert_eq!(milk.image_url.as_deref(), Some("/Images/milk.png"));
        assert!(milk.supports_hot);

        let mango = catalog.find_by_name("mango smoothie").unwrap();
        assert!(!mango.is_available());
        assert_eq!(mango.image_url.as_deref(), Some(PLACEHOLDER_IMAGE));
    }

    #[test]
    fn test_group_uses_other_for_missing_series() {
        let rows = vec![MenuDrink {
            catalog_id: None,
            drink_name: "Mystery Tea".into(),
            series_name: None,
            qty_remaining: None,
            drink_price: Money::from_cents(300),
            file_name: None,
            hot_option: false,
            tea_options: false,
        }];
        let menu = MenuResponse::group(rows);
        assert_eq!(menu.series["Other"].len(), 1);
    }

    #[test]
    fn test_check_capabilities() {
        let catalog = Catalog::from_menu(&menu());

        let mut config = DrinkConfiguration::new("Classic Milk Tea", Money::from_cents(400));
        config.temperature = Temperature::Hot;
        config.tea_type = Some(TeaType::Oolong);
        assert!(catalog.check(&config).is_ok());

        let config = DrinkConfiguration::new("Mango Smoothie", Money::from_cents(525));
        assert!(matches!(catalog.check(&config), Err(CoreError::OutOfStock { .. })));

        let config = DrinkConfiguration::new("Unicorn Frappe", Money::from_cents(525));
        assert!(matches!(catalog.check(&config), Err(CoreError::DrinkNotFound(_))));
    }
}
