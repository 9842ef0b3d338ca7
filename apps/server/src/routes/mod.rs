//! # Routes
//!
//! ```text
//! GET    /healthz                 health::healthz
//! GET    /api/menu                menu::menu
//! GET    /api/drinks?series=      menu::drinks
//! POST   /api/orders              orders::place_order
//! GET    /api/favorites?customer= favorites::list
//! POST   /api/favorites           favorites::save
//! DELETE /api/favorites/{id}      favorites::delete
//! ```

pub mod favorites;
pub mod health;
pub mod menu;
pub mod orders;

use axum::routing::{delete, get, post};
use axum::Router;

use crate::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health::healthz))
        .route("/api/menu", get(menu::menu))
        .route("/api/drinks", get(menu::drinks))
        .route("/api/orders", post(orders::place_order))
        .route("/api/favorites", get(favorites::list).post(favorites::save))
        .route("/api/favorites/{id}", delete(favorites::delete))
        .with_state(state)
}
