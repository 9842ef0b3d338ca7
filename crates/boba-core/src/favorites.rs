//! # Favorites Reconciliation
//!
//! Decides whether a drink is already among a customer's saved favorites.
//!
//! ## Duplicate Projection
//! ```text
//!                    Legacy (default)      AllCustomizations
//! name                     ✓                      ✓
//! iceLevel                 ✓                      ✓
//! sweetness                ✓                      ✓
//! toppings           joined, in order       as a set
//! temperature              -                      ✓
//! teaType                  -                      ✓
//! ```
//!
//! `Legacy` reproduces the check favorites have always been saved under,
//! so a customer's existing list keeps behaving the same way.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::drink::DrinkConfiguration;

// =============================================================================
// Records
// =============================================================================

/// A saved favorite. Size and quantity are not part of a favorite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteRecord {
    /// Server-assigned.
    pub id: i64,
    pub customer_name: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(flatten)]
    pub config: DrinkConfiguration,
}

/// A favorite about to be saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFavorite {
    pub customer_name: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(flatten)]
    pub config: DrinkConfiguration,
}

impl NewFavorite {
    pub fn new(customer_name: impl Into<String>, config: DrinkConfiguration) -> Self {
        NewFavorite {
            customer_name: customer_name.into(),
            label: None,
            config,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// `GET /api/favorites?customer=`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoritesResponse {
    pub ok: bool,
    pub favorites: Vec<FavoriteRecord>,
}

/// `POST /api/favorites`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteSaved {
    pub ok: bool,
    pub favorite: FavoriteRecord,
}

// =============================================================================
// Policy
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum DuplicatePolicy {
    /// Name, ice, sweetness and toppings in their saved order.
    #[default]
    Legacy,
    /// Every customization, toppings compared as a set.
    AllCustomizations,
}

impl fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DuplicatePolicy::Legacy => f.write_str("legacy"),
            DuplicatePolicy::AllCustomizations => f.write_str("all_customizations"),
        }
    }
}

impl FromStr for DuplicatePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "legacy" => Ok(DuplicatePolicy::Legacy),
            "all_customizations" | "all" => Ok(DuplicatePolicy::AllCustomizations),
            other => Err(format!("unknown duplicate policy: {other}")),
        }
    }
}

// =============================================================================
// Duplicate Check
// =============================================================================

fn same_under(policy: DuplicatePolicy, a: &DrinkConfiguration, b: &DrinkConfiguration) -> bool {
    let common = a.name == b.name && a.ice_level == b.ice_level && a.sweetness == b.sweetness;
    match policy {
        DuplicatePolicy::Legacy => common && a.toppings.joined() == b.toppings.joined(),
        DuplicatePolicy::AllCustomizations => {
            common
                && a.toppings == b.toppings
                && a.temperature == b.temperature
                && a.tea_type == b.tea_type
        }
    }
}

/// Whether `candidate` matches any existing favorite, under the default policy.
pub fn is_duplicate(candidate: &DrinkConfiguration, existing: &[FavoriteRecord]) -> bool {
    is_duplicate_with(DuplicatePolicy::default(), candidate, existing)
}

pub fn is_duplicate_with(
    policy: DuplicatePolicy,
    candidate: &DrinkConfiguration,
    existing: &[FavoriteRecord],
) -> bool {
    existing
        .iter()
        .any(|favorite| same_under(policy, candidate, &favorite.config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::types::{IceLevel, Sweetness, TeaType, Temperature};

    fn matcha() -> DrinkConfiguration {
        let mut config =
            DrinkConfiguration::new("Matcha", Money::from_cents(500)).with_toppings(["pearls"]);
        config.ice_level = IceLevel::Less;
        config.sweetness = Sweetness::Fifty;
        config
    }

    fn saved(config: DrinkConfiguration) -> FavoriteRecord {
        FavoriteRecord {
            id: 1,
            customer_name: "Ana".into(),
            label: None,
            config,
        }
    }

    #[test]
    fn test_matcha_differing_temperature_is_duplicate() {
        let mut existing = matcha();
        existing.temperature = Temperature::Hot;
        let favorites = vec![saved(existing)];

        assert!(is_duplicate(&matcha(), &favorites));
        assert!(!is_duplicate_with(
            DuplicatePolicy::AllCustomizations,
            &matcha(),
            &favorites
        ));
    }

    #[test]
    fn test_legacy_toppings_order_matters() {
        let a = matcha().with_toppings(["Pearls", "Pudding"]);
        let b = matcha().with_toppings(["Pudding", "Pearls"]);
        let favorites = vec![saved(a)];

        assert!(!is_duplicate(&b, &favorites));
        assert!(is_duplicate_with(DuplicatePolicy::AllCustomizations, &b, &favorites));
    }

    #[test]
    fn test_tea_type_only_counts_under_all_customizations() {
        let mut green = matcha();
        green.tea_type = Some(TeaType::Green);
        let favorites = vec![saved(matcha())];

        assert!(is_duplicate(&green, &favorites));
        assert!(!is_duplicate_with(DuplicatePolicy::AllCustomizations, &green, &favorites));
    }

    #[test]
    fn test_different_name_is_not_duplicate() {
        let mut other = matcha();
        other.name = "Hojicha".into();
        assert!(!is_duplicate(&other, &[saved(matcha())]));
        assert!(!is_duplicate(&matcha(), &[]));
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("legacy".parse::<DuplicatePolicy>(), Ok(DuplicatePolicy::Legacy));
        assert_eq!(
            "All-Customizations".parse::<DuplicatePolicy>(),
            Ok(DuplicatePolicy::AllCustomizations)
        );
        assert!("strict".parse::<DuplicatePolicy>().is_err());
    }
}
