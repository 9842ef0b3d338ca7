//! # Order Acceptance
//!
//! ```text
//! POST /api/orders
//!      │
//!      ├── no / empty `orders`          ──► 400 "No orders provided"
//!      ├── body does not decode         ──► 400
//!      ├── names / receipt email        ──► 400
//!      ├── unknown drink, not enough stock,
//!      │   unsupported option, bad math ──► 422
//!      │
//!      ▼
//! reprice every line from the catalog
//!      │
//!      ▼
//! one transaction: order row + lines + stock decrement
//!      │
//!      ▼
//! 200 { ok, orderId, lineCount, subtotal, tax, total, receiptQueued }
//! ```
//!
//! Totals are recomputed from the catalog prices; the kiosk's own totals
//! are never stored.

use axum::extract::State;
use axum::Json;
use boba_core::{OrderReceipt, OrderRequest};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::ServerError;
use crate::AppState;

fn has_orders(body: &Value) -> bool {
    body.get("orders")
        .and_then(Value::as_array)
        .is_some_and(|orders| !orders.is_empty())
}

pub async fn place_order(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<OrderReceipt>, ServerError> {
    if !has_orders(&body) {
        return Err(ServerError::BadRequest("No orders provided".to_string()));
    }

    let submitted: OrderRequest = serde_json::from_value(body)
        .map_err(|e| ServerError::BadRequest(format!("Invalid order: {e}")))?;
    debug!(lines = submitted.orders.len(), "Order received");

    let catalog = state.db.drinks().catalog().await?;
    let request = match submitted.priced_from_catalog(&catalog) {
        Ok(request) => request,
        Err(e) => {
            warn!(error = %e, "Order rejected");
            return Err(e.into());
        }
    };
    if request.subtotal() != submitted.subtotal() {
        warn!(
            submitted = %submitted.subtotal(),
            charged = %request.subtotal(),
            "Order repriced from the catalog"
        );
    }

    let order = state.db.orders().insert_order(&request, state.tax_rate).await?;

    if order.want_receipt {
        info!(order_id = %order.id, "Receipt queued");
    }

    Ok(Json(OrderReceipt {
        ok: true,
        line_count: request.orders.len(),
        subtotal: order.subtotal(),
        tax: order.tax(),
        total: order.total(),
        receipt_queued: order.want_receipt,
        order_id: order.id,
    }))
}
