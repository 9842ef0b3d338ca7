//! # Catalog State
//!
//! The menu as last fetched from the order server. Commands resolve catalog
//! picks against it; an empty catalog is fetched on first use.

use boba_core::{Catalog, CatalogEntry};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::remote::{CatalogSource, RemoteResult};

pub struct CatalogState {
    source: Arc<dyn CatalogSource>,
    catalog: RwLock<Catalog>,
}

impl std::fmt::Debug for CatalogState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogState").finish_non_exhaustive()
    }
}

impl CatalogState {
    pub fn new(source: Arc<dyn CatalogSource>) -> Self {
        CatalogState {
            source,
            catalog: RwLock::new(Catalog::default()),
        }
    }

    /// Fetches the menu and replaces the cached catalog. Returns the entry count.
    pub async fn refresh(&self) -> RemoteResult<usize> {
        let menu = self.source.menu().await?;
        let catalog = Catalog::from_menu(&menu);
        let count = catalog.len();

        *self.catalog.write().await = catalog;
        info!(drinks = count, series = menu.series.len(), "Catalog refreshed");
        Ok(count)
    }

    async fn ensure_loaded(&self) -> RemoteResult<()> {
        if self.catalog.read().await.is_empty() {
            debug!("Catalog empty, fetching menu");
            self.refresh().await?;
        }
        Ok(())
    }

    /// Looks up a drink by catalog id, falling back to its display name.
    pub async fn entry(&self, id_or_name: &str) -> RemoteResult<Option<CatalogEntry>> {
        self.ensure_loaded().await?;
        let catalog = self.catalog.read().await;
        Ok(catalog
            .get(id_or_name)
            .or_else(|| catalog.find_by_name(id_or_name))
            .cloned())
    }

    pub async fn snapshot(&self) -> RemoteResult<Catalog> {
        self.ensure_loaded().await?;
        Ok(self.catalog.read().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::MockCatalogSource;
    use boba_core::catalog::{MenuDrink, MenuResponse};
    use boba_core::Money;

    fn menu() -> MenuResponse {
        MenuResponse::group(vec![
            MenuDrink {
                catalog_id: None,
                drink_name: "Classic Milk Tea".into(),
                series_name: Some("Milky Series".into()),
                qty_remaining: Some(12),
                drink_price: Money::from_cents(400),
                file_name: None,
                hot_option: true,
                tea_options: true,
            },
            MenuDrink {
                catalog_id: None,
                drink_name: "Mango Smoothie".into(),
                series_name: Some("Ice Blended Series".into()),
                qty_remaining: None,
                drink_price: Money::from_cents(525),
                file_name: Some("mango.png".into()),
                hot_option: false,
                tea_options: false,
            },
        ])
    }

    #[tokio::test]
    async fn test_fetches_once_on_first_lookup() {
        let mut source = MockCatalogSource::new();
        source.expect_menu().times(1).returning(|| Ok(menu()));
        let state = CatalogState::new(Arc::new(source));

        let milk = state.entry("classic_milk_tea").await.unwrap().unwrap();
        assert_eq!(milk.base_price.cents(), 400);

        let mango = state.entry("mango smoothie").await.unwrap().unwrap();
        assert_eq!(mango.catalog_id, "mango_smoothie");

        assert!(state.entry("unicorn_frappe").await.unwrap().is_none());
        assert_eq!(state.snapshot().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_refresh_replaces_catalog() {
        let mut source = MockCatalogSource::new();
        source.expect_menu().times(2).returning(|| Ok(menu()));
        let state = CatalogState::new(Arc::new(source));

        assert_eq!(state.refresh().await.unwrap(), 2);
        assert_eq!(state.refresh().await.unwrap(), 2);
    }
}
