//! # Favorites Commands
//!
//! Saved drinks per customer, kept on the order server.
//!
//! ## Save Flow
//! ```text
//! save_favorite(name, label, drink)
//!      │
//!      ├── validate name / label
//!      ├── list customer's favorites
//!      ├── is_duplicate_with(policy) ── yes ──► Duplicate (nothing written)
//!      │
//!      ▼
//! POST /api/favorites ── 409 ──► Duplicate
//!      │
//!      ▼
//!    Saved(record)
//! ```

use boba_core::favorites::is_duplicate_with;
use boba_core::validation::{validate_display_name, validate_label};
use boba_core::{
    Customization, DrinkConfiguration, DuplicatePolicy, FavoriteRecord, NewFavorite, Size,
};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::remote::{FavoritesStore, RemoteError};
use crate::state::{CartSnapshot, CartStore, CatalogState};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "favorite", rename_all = "camelCase")]
pub enum FavoriteOutcome {
    Saved(FavoriteRecord),
    /// Already saved under the active duplicate policy; nothing was written.
    Duplicate,
}

pub async fn save_favorite(
    favorites: &dyn FavoritesStore,
    policy: DuplicatePolicy,
    customer_name: &str,
    label: Option<&str>,
    mut config: DrinkConfiguration,
) -> Result<FavoriteOutcome, ApiError> {
    let customer_name = validate_display_name("customer_name", customer_name)?;
    let label = validate_label(label)?;
    config.normalize();
    // Favorites have no size.
    config.size = Size::default();
    debug!(customer = %customer_name, drink = %config.name, %policy, "save_favorite command");

    let existing = favorites.list(&customer_name).await?;
    if is_duplicate_with(policy, &config, &existing) {
        info!(customer = %customer_name, drink = %config.name, "Favorite already saved");
        return Ok(FavoriteOutcome::Duplicate);
    }

    let favorite = NewFavorite {
        customer_name,
        label,
        config,
    };
    match favorites.save(&favorite).await {
        Ok(record) => {
            info!(id = record.id, customer = %record.customer_name, "Favorite saved");
            Ok(FavoriteOutcome::Saved(record))
        }
        Err(RemoteError::Conflict(message)) => {
            info!(customer = %favorite.customer_name, %message, "Server reported duplicate favorite");
            Ok(FavoriteOutcome::Duplicate)
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn list_favorites(
    favorites: &dyn FavoritesStore,
    customer_name: &str,
) -> Result<Vec<FavoriteRecord>, ApiError> {
    let customer_name = validate_display_name("customer_name", customer_name)?;
    debug!(customer = %customer_name, "list_favorites command");
    Ok(favorites.list(&customer_name).await?)
}

pub async fn delete_favorite(favorites: &dyn FavoritesStore, id: i64) -> Result<(), ApiError> {
    debug!(id, "delete_favorite command");
    favorites.delete(id).await?;
    info!(id, "Favorite deleted");
    Ok(())
}

/// Adds each favorite to the cart as one small drink at today's price.
///
/// Every favorite is checked against the current catalog first; if any is
/// gone, out of stock or no longer offers a saved option, nothing is added.
pub async fn reorder(
    cart: &CartStore,
    catalog: &CatalogState,
    picks: &[FavoriteRecord],
) -> Result<CartSnapshot, ApiError> {
    debug!(favorites = picks.len(), "reorder command");

    let mut configs = Vec::with_capacity(picks.len());
    for favorite in picks {
        let saved = &favorite.config;
        let entry = match catalog.entry(&saved.catalog_id).await? {
            Some(entry) => entry,
            None => catalog
                .entry(&saved.name)
                .await?
                .ok_or_else(|| ApiError::not_found("Drink", &saved.name))?,
        };
        let answers = Customization {
            size: Size::default(),
            ice_level: saved.ice_level,
            sweetness: saved.sweetness,
            temperature: saved.temperature,
            tea_type: saved.tea_type,
            toppings: saved.toppings.clone(),
        };
        configs.push(DrinkConfiguration::from_catalog(&entry, answers)?);
    }

    cart.add_all(configs).await?;
    Ok(cart.snapshot().await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::remote::{MockCatalogSource, MockFavoritesStore};
    use crate::state::MemoryDocumentStore;
    use boba_core::catalog::{MenuDrink, MenuResponse};
    use boba_core::{IceLevel, Money, Sweetness, TaxRate, Temperature};
    use std::sync::Arc;

    fn matcha() -> DrinkConfiguration {
        let mut config =
            DrinkConfiguration::new("Matcha", Money::from_cents(500)).with_toppings(["pearls"]);
        config.ice_level = IceLevel::Less;
        config.sweetness = Sweetness::Fifty;
        config
    }

    fn record(id: i64, config: DrinkConfiguration) -> FavoriteRecord {
        FavoriteRecord {
            id,
            customer_name: "Ana".into(),
            label: None,
            config,
        }
    }

    #[tokio::test]
    async fn test_matcha_with_other_temperature_is_duplicate() {
        let mut hot = matcha();
        hot.temperature = Temperature::Hot;
        let saved = record(1, hot);

        let mut store = MockFavoritesStore::new();
        store
            .expect_list()
            .withf(|name| name == "Ana")
            .returning(move |_| Ok(vec![saved.clone()]));
        store.expect_save().never();

        let mut iced = matcha();
        iced.temperature = Temperature::Iced;
        let outcome = save_favorite(&store, DuplicatePolicy::Legacy, " Ana ", None, iced)
            .await
            .unwrap();
        assert_eq!(outcome, FavoriteOutcome::Duplicate);
    }

    #[tokio::test]
    async fn test_saves_new_favorite_without_size() {
        let mut store = MockFavoritesStore::new();
        store.expect_list().returning(|_| Ok(vec![]));
        store
            .expect_save()
            .withf(|favorite| {
                favorite.config.size == Size::Small
                    && favorite.label.as_deref() == Some("Monday usual")
            })
            .returning(|favorite| Ok(record(7, favorite.config.clone())));

        let mut config = matcha();
        config.size = boba_core::Size::Large;
        let outcome = save_favorite(
            &store,
            DuplicatePolicy::Legacy,
            "Ana",
            Some(" Monday usual "),
            config,
        )
        .await
        .unwrap();

        assert!(matches!(outcome, FavoriteOutcome::Saved(r) if r.id == 7));
    }

    #[tokio::test]
    async fn test_server_conflict_is_duplicate() {
        let mut store = MockFavoritesStore::new();
        store.expect_list().returning(|_| Ok(vec![]));
        store
            .expect_save()
            .returning(|_| Err(RemoteError::Conflict("Matcha is already a favorite".into())));

        let outcome = save_favorite(&store, DuplicatePolicy::AllCustomizations, "Ana", None, matcha())
            .await
            .unwrap();
        assert_eq!(outcome, FavoriteOutcome::Duplicate);
    }

    #[tokio::test]
    async fn test_blank_customer_is_rejected() {
        let mut store = MockFavoritesStore::new();
        store.expect_list().never();

        let err = save_favorite(&store, DuplicatePolicy::Legacy, "  ", None, matcha())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let mut store = MockFavoritesStore::new();
        store
            .expect_delete()
            .returning(|id| Err(RemoteError::NotFound(format!("Favorite not found: {id}"))));

        let err = delete_favorite(&store, 42).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    fn catalog(matcha_price: i64, matcha_stock: Option<i64>) -> CatalogState {
        let mut source = MockCatalogSource::new();
        source.expect_menu().returning(move || {
            Ok(MenuResponse::group(vec![MenuDrink {
                catalog_id: None,
                drink_name: "Matcha".into(),
                series_name: Some("Matcha Series".into()),
                qty_remaining: matcha_stock,
                drink_price: Money::from_cents(matcha_price),
                file_name: None,
                hot_option: true,
                tea_options: false,
            }]))
        });
        CatalogState::new(Arc::new(source))
    }

    async fn cart() -> CartStore {
        CartStore::open(Arc::new(MemoryDocumentStore::new()), "cart", TaxRate::from_bps(825))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_reorder_uses_current_price() {
        let cart = cart().await;
        let picks = vec![record(1, matcha()), record(2, matcha())];

        let snapshot = reorder(&cart, &catalog(550, None), &picks).await.unwrap();

        assert_eq!(snapshot.items.len(), 2);
        // 5.50 + one topping
        assert_eq!(snapshot.items[0].unit_price().cents(), 625);
        assert_eq!(snapshot.items[0].quantity(), 1);
    }

    #[tokio::test]
    async fn test_reorder_is_all_or_nothing() {
        let cart = cart().await;
        let mut gone = matcha();
        gone.name = "Hojicha".into();
        gone.catalog_id = "hojicha".into();
        let picks = vec![record(1, matcha()), record(2, gone)];

        let err = reorder(&cart, &catalog(500, None), &picks).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert!(cart.cart().await.is_empty());

        let err = reorder(&cart, &catalog(500, Some(0)), &picks[..1]).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::OutOfStock);
        assert!(cart.cart().await.is_empty());
    }
}
