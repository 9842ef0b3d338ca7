//! # Favorite Repository
//!
//! Saved drinks per customer name. Size and quantity are never stored: a
//! favorite re-enters the cart at the base size and a quantity of one.

use boba_core::favorites::{FavoriteRecord, NewFavorite};
use boba_core::types::{OptionLabel, TeaType};
use boba_core::{DrinkConfiguration, IceLevel, Money, Size, Sweetness, Temperature, Toppings};
use sqlx::{FromRow, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};

const SELECT_FAVORITES: &str = r#"
    SELECT id, customer_name, label, catalog_id, drink_name, base_price_cents,
           ice_level, sweetness_level, temperature, tea_type, topping_used
    FROM favorites
"#;

#[derive(Debug, Clone, FromRow)]
struct FavoriteRow {
    id: i64,
    customer_name: String,
    label: Option<String>,
    catalog_id: String,
    drink_name: String,
    base_price_cents: i64,
    ice_level: String,
    sweetness_level: String,
    temperature: String,
    tea_type: Option<String>,
    topping_used: String,
}

impl FavoriteRow {
    fn into_record(self) -> FavoriteRecord {
        FavoriteRecord {
            id: self.id,
            customer_name: self.customer_name,
            label: self.label,
            config: DrinkConfiguration {
                catalog_id: self.catalog_id,
                name: self.drink_name,
                base_price: Money::from_cents(self.base_price_cents),
                size: Size::default(),
                ice_level: IceLevel::from_label(&self.ice_level),
                sweetness: Sweetness::from_label(&self.sweetness_level),
                temperature: Temperature::from_label(&self.temperature),
                tea_type: self.tea_type.as_deref().and_then(TeaType::parse),
                toppings: Toppings::from_joined(&self.topping_used),
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct FavoriteRepository {
    pool: SqlitePool,
}

impl FavoriteRepository {
    pub fn new(pool: SqlitePool) -> Self {
        FavoriteRepository { pool }
    }

    /// A customer's favorites, oldest first.
    pub async fn list_for_customer(&self, customer_name: &str) -> DbResult<Vec<FavoriteRecord>> {
        let sql = format!("{SELECT_FAVORITES} WHERE customer_name = ?1 ORDER BY id");
        let rows = sqlx::query_as::<_, FavoriteRow>(&sql)
            .bind(customer_name)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(FavoriteRow::into_record).collect())
    }

    pub async fn get(&self, id: i64) -> DbResult<Option<FavoriteRecord>> {
        let sql = format!("{SELECT_FAVORITES} WHERE id = ?1");
        let row = sqlx::query_as::<_, FavoriteRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(FavoriteRow::into_record))
    }

    /// Stores a favorite. Duplicate detection is the caller's job.
    pub async fn insert(&self, favorite: &NewFavorite) -> DbResult<FavoriteRecord> {
        let mut config = favorite.config.clone();
        config.normalize();
        config.size = Size::default();

        debug!(customer = %favorite.customer_name, drink = %config.name, "Saving favorite");

        let result = sqlx::query(
            r#"
            INSERT INTO favorites (
                customer_name, label, catalog_id, drink_name, base_price_cents,
                ice_level, sweetness_level, temperature, tea_type, topping_used
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&favorite.customer_name)
        .bind(&favorite.label)
        .bind(&config.catalog_id)
        .bind(&config.name)
        .bind(config.base_price.cents())
        .bind(config.ice_level.as_str())
        .bind(config.sweetness.as_str())
        .bind(config.temperature.as_str())
        .bind(config.tea_type.map(|t| t.as_str()))
        .bind(config.toppings.joined())
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        info!(id, customer = %favorite.customer_name, "Favorite saved");

        Ok(FavoriteRecord {
            id,
            customer_name: favorite.customer_name.clone(),
            label: favorite.label.clone(),
            config,
        })
    }

    pub async fn delete(&self, id: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM favorites WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Favorite", id.to_string()));
        }

        info!(id, "Favorite removed");
        Ok(())
    }
}
