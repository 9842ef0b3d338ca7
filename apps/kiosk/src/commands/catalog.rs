//! # Catalog Commands
//!
//! Menu listing and live price quotes for the customization popup.

use boba_core::{
    price, CatalogEntry, Customization, DrinkConfiguration, Money, PriceQuote, KNOWN_TOPPINGS,
    TOPPING_PRICE,
};
use serde::Serialize;
use tracing::debug;

use crate::error::ApiError;
use crate::state::CatalogState;

/// One checkbox in the popup's toppings list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToppingOption {
    pub id: &'static str,
    pub label: &'static str,
    #[serde(with = "boba_core::money::dollars")]
    pub price: Money,
}

/// Every drink, in menu order (series, then name).
pub async fn list_catalog(catalog: &CatalogState) -> Result<Vec<CatalogEntry>, ApiError> {
    debug!("list_catalog command");
    Ok(catalog.snapshot().await?.entries().to_vec())
}

/// Re-fetches the menu; returns how many drinks it has.
pub async fn refresh_catalog(catalog: &CatalogState) -> Result<usize, ApiError> {
    debug!("refresh_catalog command");
    Ok(catalog.refresh().await?)
}

/// Prices the popup's current answers without touching the cart.
///
/// ```text
/// Brown Sugar Milk  $4.50
///   + Medium        $0.20
///   + 125% sweet    $0.20
///   + 2 toppings    $1.50
///   ─────────────────────
///   unit price      $6.40
/// ```
pub async fn quote_drink(
    catalog: &CatalogState,
    drink: &str,
    customization: Customization,
) -> Result<PriceQuote, ApiError> {
    debug!(drink = %drink, "quote_drink command");

    let entry = catalog
        .entry(drink)
        .await?
        .ok_or_else(|| ApiError::not_found("Drink", drink))?;
    let config = DrinkConfiguration::from_catalog(&entry, customization)?;
    Ok(price(&config))
}

pub fn toppings_menu() -> Vec<ToppingOption> {
    KNOWN_TOPPINGS
        .iter()
        .map(|&(id, label)| ToppingOption {
            id,
            label,
            price: TOPPING_PRICE,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::remote::{MockCatalogSource, RemoteError};
    use boba_core::catalog::{MenuDrink, MenuResponse};
    use boba_core::{Size, Sweetness, Temperature, Toppings};
    use std::sync::Arc;

    fn catalog() -> CatalogState {
        let mut source = MockCatalogSource::new();
        source.expect_menu().returning(|| {
            Ok(MenuResponse::group(vec![MenuDrink {
                catalog_id: None,
                drink_name: "Brown Sugar Milk".into(),
                series_name: Some("Milky Series".into()),
                qty_remaining: Some(4),
                drink_price: Money::from_cents(450),
                file_name: Some("brown_sugar.png".into()),
                hot_option: false,
                tea_options: false,
            }]))
        });
        CatalogState::new(Arc::new(source))
    }

    #[tokio::test]
    async fn test_quote_matches_breakdown() {
        let answers = Customization {
            size: Size::Medium,
            sweetness: Sweetness::Extra,
            toppings: Toppings::new(["Pearls", "Pudding"]),
            ..Default::default()
        };

        let quote = quote_drink(&catalog(), "brown_sugar_milk", answers).await.unwrap();
        assert_eq!(quote.unit_price.cents(), 640);
        assert_eq!(quote.breakdown.toppings.cents(), 150);
        assert_eq!(quote.breakdown.total(), quote.unit_price);
    }

    #[tokio::test]
    async fn test_quote_rejects_hot_on_cold_only_drink() {
        let answers = Customization {
            temperature: Temperature::Hot,
            ..Default::default()
        };
        let err = quote_drink(&catalog(), "Brown Sugar Milk", answers)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::BusinessLogic);
    }

    #[tokio::test]
    async fn test_list_catalog() {
        let drinks = list_catalog(&catalog()).await.unwrap();
        assert_eq!(drinks.len(), 1);
        assert_eq!(drinks[0].image_url.as_deref(), Some("/Images/brown_sugar.png"));
    }

    #[tokio::test]
    async fn test_unreachable_server_surfaces_remote_error() {
        let mut source = MockCatalogSource::new();
        source
            .expect_menu()
            .returning(|| Err(RemoteError::UnexpectedResponse("502".into())));
        let catalog = CatalogState::new(Arc::new(source));

        let err = refresh_catalog(&catalog).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::RemoteError);
    }

    #[test]
    fn test_toppings_menu_prices() {
        let menu = toppings_menu();
        assert_eq!(menu.len(), KNOWN_TOPPINGS.len());
        assert!(menu.iter().all(|t| t.price.cents() == 75));
        assert_eq!(menu[0].id, "pearls");
    }
}
