//! # Order Repository
//!
//! Accepted orders and their lines.
//!
//! ## Placing an Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN                                                                  │
//! │    INSERT orders        (uuid, names, payment, subtotal/tax/total)     │
//! │    INSERT order_lines   × N   (canonical labels, cents)                │
//! │    UPDATE drinks        qty_remaining -= quantity  (tracked only)      │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  Any failure rolls the whole order back: no partial orders.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use boba_core::order::{OrderEntry, OrderRequest};
use boba_core::types::{OptionLabel, TeaType};
use boba_core::{IceLevel, Money, PaymentMethod, Size, Sweetness, TaxRate, Temperature, Toppings};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};

/// An accepted order, without its lines.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct StoredOrder {
    pub id: String,
    pub employee_name: Option<String>,
    pub customer_name: Option<String>,
    pub payment_method: PaymentMethod,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
    pub want_receipt: bool,
    pub receipt_email: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl StoredOrder {
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }

    pub fn tax(&self) -> Money {
        Money::from_cents(self.tax_cents)
    }

    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// One stored line, labels as written.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct StoredOrderLine {
    pub line_no: i64,
    pub catalog_id: String,
    pub drink_name: String,
    pub size: String,
    pub ice_level: String,
    pub sweetness_level: String,
    pub temperature: String,
    pub tea_type: Option<String>,
    pub topping_used: String,
    pub quantity: i64,
    pub drink_price_cents: i64,
    pub topping_price_cents: i64,
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
}

impl StoredOrderLine {
    /// Reads the line back into the wire shape.
    pub fn to_entry(&self) -> OrderEntry {
        OrderEntry {
            catalog_id: self.catalog_id.clone(),
            name: self.drink_name.clone(),
            size: Size::from_label(&self.size),
            ice_level: IceLevel::from_label(&self.ice_level),
            sweetness: Sweetness::from_label(&self.sweetness_level),
            temperature: Temperature::from_label(&self.temperature),
            tea_type: self.tea_type.as_deref().and_then(TeaType::parse),
            toppings: Toppings::from_joined(&self.topping_used),
            base_price: Money::from_cents(self.drink_price_cents),
            toppings_cost: Money::from_cents(self.topping_price_cents),
            quantity: self.quantity,
            unit_price: Money::from_cents(self.unit_price_cents),
            line_total: Money::from_cents(self.line_total_cents),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Stores a validated order and its lines in one transaction.
    ///
    /// Totals are computed here from the line totals; the request carries
    /// none. Stock is decremented for tracked drinks; a line asking for more
    /// than is left fails with `InsufficientStock` and nothing is stored.
    pub async fn insert_order(
        &self,
        request: &OrderRequest,
        tax_rate: TaxRate,
    ) -> DbResult<StoredOrder> {
        let subtotal = request.subtotal();
        let tax = subtotal.calculate_tax(tax_rate);
        let meta = &request.metadata;

        let order = StoredOrder {
            id: Uuid::new_v4().to_string(),
            employee_name: meta.employee_name.clone(),
            customer_name: meta.customer_name.clone(),
            payment_method: meta.payment_method,
            subtotal_cents: subtotal.cents(),
            tax_cents: tax.cents(),
            total_cents: (subtotal + tax).cents(),
            want_receipt: meta.want_receipt,
            receipt_email: meta.receipt_email.clone(),
            created_at: Utc::now(),
        };

        debug!(id = %order.id, lines = request.orders.len(), "Inserting order");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, employee_name, customer_name, payment_method,
                subtotal_cents, tax_cents, total_cents,
                want_receipt, receipt_email, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&order.id)
        .bind(&order.employee_name)
        .bind(&order.customer_name)
        .bind(order.payment_method)
        .bind(order.subtotal_cents)
        .bind(order.tax_cents)
        .bind(order.total_cents)
        .bind(order.want_receipt)
        .bind(&order.receipt_email)
        .bind(order.created_at)
        .execute(&mut *tx)
        .await?;

        for (i, entry) in request.orders.iter().enumerate() {
            let config = entry.config();
            sqlx::query(
                r#"
                INSERT INTO order_lines (
                    order_id, line_no, catalog_id, drink_name,
                    size, ice_level, sweetness_level, temperature, tea_type,
                    topping_used, quantity,
                    drink_price_cents, topping_price_cents, unit_price_cents, line_total_cents
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
                "#,
            )
            .bind(&order.id)
            .bind((i + 1) as i64)
            .bind(&config.catalog_id)
            .bind(&config.name)
            .bind(config.size.as_str())
            .bind(config.ice_level.as_str())
            .bind(config.sweetness.as_str())
            .bind(config.temperature.as_str())
            .bind(config.tea_type.map(|t| t.as_str()))
            .bind(config.toppings.joined())
            .bind(entry.quantity)
            .bind(entry.base_price.cents())
            .bind(entry.toppings_cost.cents())
            .bind(entry.unit_price.cents())
            .bind(entry.line_total.cents())
            .execute(&mut *tx)
            .await?;

            let decremented = sqlx::query(
                r#"
                UPDATE drinks
                SET qty_remaining = qty_remaining - ?1
                WHERE qty_remaining IS NOT NULL
                  AND qty_remaining >= ?1
                  AND (catalog_id = ?2 OR drink_name = ?3)
                "#,
            )
            .bind(entry.quantity)
            .bind(&config.catalog_id)
            .bind(&config.name)
            .execute(&mut *tx)
            .await?
            .rows_affected();

            if decremented == 0 {
                let remaining: Option<i64> = sqlx::query_scalar(
                    r#"
                    SELECT qty_remaining FROM drinks
                    WHERE qty_remaining IS NOT NULL
                      AND (catalog_id = ?1 OR drink_name = ?2)
                    "#,
                )
                .bind(&config.catalog_id)
                .bind(&config.name)
                .fetch_optional(&mut *tx)
                .await?;

                // Untracked drinks have no row to decrement.
                if let Some(remaining) = remaining {
                    warn!(id = %order.id, drink = %config.name, remaining, requested = entry.quantity, "Not enough stock, order rolled back");
                    return Err(DbError::InsufficientStock {
                        drink: config.name,
                        requested: entry.quantity,
                        remaining,
                    });
                }
            }
        }

        tx.commit().await?;

        info!(
            id = %order.id,
            total = %order.total(),
            "Order stored"
        );

        Ok(order)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<StoredOrder>> {
        let order = sqlx::query_as::<_, StoredOrder>(
            r#"
            SELECT id, employee_name, customer_name, payment_method,
                   subtotal_cents, tax_cents, total_cents,
                   want_receipt, receipt_email, created_at
            FROM orders
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    pub async fn lines(&self, order_id: &str) -> DbResult<Vec<StoredOrderLine>> {
        let lines = sqlx::query_as::<_, StoredOrderLine>(
            r#"
            SELECT line_no, catalog_id, drink_name, size, ice_level, sweetness_level,
                   temperature, tea_type, topping_used, quantity,
                   drink_price_cents, topping_price_cents, unit_price_cents, line_total_cents
            FROM order_lines
            WHERE order_id = ?1
            ORDER BY line_no
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
