//! # Order Submission
//!
//! Sends the cart to the order server.
//!
//! ## Submission Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  submit_order(cart, sink, metadata)                                    │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  snapshot cart ──► OrderRequest::from_cart                             │
//! │                     ├── empty cart      → EmptyCart                     │
//! │                     ├── no names        → Required                      │
//! │                     └── receipt w/o @   → InvalidFormat                 │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  sink.place_order ──── Err ──► log, cart untouched, error to operator  │
//! │         │                                                               │
//! │         Ok(receipt)                                                     │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  clear cart if nobody changed it meanwhile ──► receipt                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing stops a second submit while one is in flight, and a sent order
//! cannot be cancelled.

use boba_core::{OrderMetadata, OrderReceipt, OrderRequest};
use tracing::{debug, error, info, warn};

use crate::error::ApiError;
use crate::remote::OrderSink;
use crate::state::CartStore;

pub async fn submit_order(
    cart: &CartStore,
    sink: &dyn OrderSink,
    metadata: OrderMetadata,
) -> Result<OrderReceipt, ApiError> {
    let submitted = cart.cart().await;
    debug!(lines = submitted.len(), payment = %metadata.payment_method, "submit_order command");

    let request = OrderRequest::from_cart(&submitted, metadata)?;

    let receipt = match sink.place_order(&request).await {
        Ok(receipt) => receipt,
        Err(e) => {
            error!(error = %e, lines = request.orders.len(), "Order submission failed, cart kept");
            return Err(e.into());
        }
    };

    info!(
        order_id = %receipt.order_id,
        lines = receipt.line_count,
        total = %receipt.total,
        receipt_queued = receipt.receipt_queued,
        "Order placed"
    );

    match cart.clear_if_unchanged(&submitted).await {
        Ok(true) => {}
        Ok(false) => warn!(order_id = %receipt.order_id, "Cart changed during submission, kept"),
        Err(e) => error!(order_id = %receipt.order_id, error = %e, "Could not clear cart after order"),
    }

    Ok(receipt)
}
