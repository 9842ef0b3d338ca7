//! # Drink Repository
//!
//! The menu: catalog rows, grouping by series, stock.
//!
//! ```text
//! drinks table ──► list_menu()   ──► MenuResponse::group  (GET /api/menu)
//!              ──► list_drinks() ──► DrinkListing         (GET /api/drinks)
//!              ──► catalog()     ──► Catalog              (order validation)
//! ```

use boba_core::catalog::{image_url, Catalog, CatalogEntry, DrinkListing, MenuDrink, MenuResponse, DEFAULT_SERIES};
use boba_core::drink::catalog_id_from_name;
use boba_core::Money;
use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use crate::error::DbResult;

const SELECT_DRINKS: &str = r#"
    SELECT catalog_id, drink_name, series_name, drink_price_cents,
           qty_remaining, file_name, hot_option, tea_options
    FROM drinks
"#;

const ORDER_BY_MENU: &str = " ORDER BY series_name IS NULL, series_name, drink_name";

#[derive(Debug, Clone, FromRow)]
struct DrinkRow {
    catalog_id: String,
    drink_name: String,
    series_name: Option<String>,
    drink_price_cents: i64,
    qty_remaining: Option<i64>,
    file_name: Option<String>,
    hot_option: bool,
    tea_options: bool,
}

impl DrinkRow {
    fn into_menu_drink(self) -> MenuDrink {
        MenuDrink {
            catalog_id: Some(self.catalog_id),
            drink_name: self.drink_name,
            series_name: self.series_name,
            qty_remaining: self.qty_remaining,
            drink_price: Money::from_cents(self.drink_price_cents),
            file_name: self.file_name,
            hot_option: self.hot_option,
            tea_options: self.tea_options,
        }
    }

    fn into_listing(self) -> DrinkListing {
        DrinkListing {
            image_url: image_url(self.file_name.as_deref()),
            name: self.drink_name,
            series: self.series_name,
            price: Money::from_cents(self.drink_price_cents),
            hot_option: self.hot_option,
            tea_options: self.tea_options,
        }
    }

    fn into_entry(self) -> CatalogEntry {
        CatalogEntry {
            image_url: Some(image_url(self.file_name.as_deref())),
            catalog_id: self.catalog_id,
            name: self.drink_name,
            series: self
                .series_name
                .unwrap_or_else(|| DEFAULT_SERIES.to_string()),
            base_price: Money::from_cents(self.drink_price_cents),
            supports_hot: self.hot_option,
            supports_tea: self.tea_options,
            qty_remaining: self.qty_remaining,
        }
    }
}

/// A drink to put on the menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDrink {
    pub catalog_id: String,
    pub name: String,
    pub series: Option<String>,
    pub price: Money,
    pub qty_remaining: Option<i64>,
    pub file_name: Option<String>,
    pub hot_option: bool,
    pub tea_options: bool,
}

impl NewDrink {
    pub fn new(name: impl Into<String>, series: impl Into<String>, price: Money) -> Self {
        let name = name.into();
        NewDrink {
            catalog_id: catalog_id_from_name(&name),
            name,
            series: Some(series.into()),
            price,
            qty_remaining: None,
            file_name: None,
            hot_option: false,
            tea_options: false,
        }
    }

    pub fn stock(mut self, qty: i64) -> Self {
        self.qty_remaining = Some(qty);
        self
    }

    pub fn image(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    pub fn hot(mut self) -> Self {
        self.hot_option = true;
        self
    }

    pub fn tea_options(mut self) -> Self {
        self.tea_options = true;
        self
    }
}

/// Repository for the drinks table.
#[derive(Debug, Clone)]
pub struct DrinkRepository {
    pool: SqlitePool,
}

impl DrinkRepository {
    pub fn new(pool: SqlitePool) -> Self {
        DrinkRepository { pool }
    }

    async fn fetch(&self, series: Option<&str>) -> DbResult<Vec<DrinkRow>> {
        let rows = match series {
            Some(series) => {
                let sql = format!("{SELECT_DRINKS} WHERE series_name = ?1{ORDER_BY_MENU}");
                sqlx::query_as::<_, DrinkRow>(&sql)
                    .bind(series)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!("{SELECT_DRINKS}{ORDER_BY_MENU}");
                sqlx::query_as::<_, DrinkRow>(&sql)
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(rows)
    }

    /// All menu rows, ordered by series then drink name.
    pub async fn list_menu(&self) -> DbResult<Vec<MenuDrink>> {
        debug!("Listing menu");
        let rows = self.fetch(None).await?;
        Ok(rows.into_iter().map(DrinkRow::into_menu_drink).collect())
    }

    /// The menu grouped by series.
    pub async fn menu(&self) -> DbResult<MenuResponse> {
        Ok(MenuResponse::group(self.list_menu().await?))
    }

    /// Drinks for the listing page, optionally filtered to one series.
    pub async fn list_drinks(&self, series: Option<&str>) -> DbResult<Vec<DrinkListing>> {
        debug!(series = ?series, "Listing drinks");
        let rows = self.fetch(series).await?;
        Ok(rows.into_iter().map(DrinkRow::into_listing).collect())
    }

    /// The flattened catalog used to validate orders and favorites.
    pub async fn catalog(&self) -> DbResult<Catalog> {
        let rows = self.fetch(None).await?;
        Ok(Catalog::new(rows.into_iter().map(DrinkRow::into_entry).collect()))
    }

    pub async fn get(&self, catalog_id: &str) -> DbResult<Option<CatalogEntry>> {
        let sql = format!("{SELECT_DRINKS} WHERE catalog_id = ?1");
        let row = sqlx::query_as::<_, DrinkRow>(&sql)
            .bind(catalog_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(DrinkRow::into_entry))
    }

    /// Inserts a drink, or updates it when the catalog id already exists.
    pub async fn upsert(&self, drink: &NewDrink) -> DbResult<()> {
        debug!(catalog_id = %drink.catalog_id, name = %drink.name, "Upserting drink");

        sqlx::query(
            r#"
            INSERT INTO drinks (
                catalog_id, drink_name, series_name, drink_price_cents,
                qty_remaining, file_name, hot_option, tea_options
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT (catalog_id) DO UPDATE SET
                drink_name = excluded.drink_name,
                series_name = excluded.series_name,
                drink_price_cents = excluded.drink_price_cents,
                qty_remaining = excluded.qty_remaining,
                file_name = excluded.file_name,
                hot_option = excluded.hot_option,
                tea_options = excluded.tea_options
            "#,
        )
        .bind(&drink.catalog_id)
        .bind(&drink.name)
        .bind(&drink.series)
        .bind(drink.price.cents())
        .bind(drink.qty_remaining)
        .bind(&drink.file_name)
        .bind(drink.hot_option)
        .bind(drink.tea_options)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM drinks")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
