//! Menu endpoints: the grouped menu the kiosk builds its catalog from, and
//! the flat drink listing for the menu board.

use axum::extract::{Query, State};
use axum::Json;
use boba_core::catalog::{DrinksResponse, MenuResponse};
use serde::Deserialize;
use tracing::debug;

use crate::error::ServerError;
use crate::AppState;

pub async fn menu(State(state): State<AppState>) -> Result<Json<MenuResponse>, ServerError> {
    let menu = state.db.drinks().menu().await?;
    debug!(series = menu.series.len(), "Serving menu");
    Ok(Json(menu))
}

#[derive(Debug, Deserialize)]
pub struct DrinksQuery {
    pub series: Option<String>,
}

pub async fn drinks(
    State(state): State<AppState>,
    Query(query): Query<DrinksQuery>,
) -> Result<Json<DrinksResponse>, ServerError> {
    let series = query.series.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let drinks = state.db.drinks().list_drinks(series).await?;
    Ok(Json(DrinksResponse { drinks }))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{app, get};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_menu_grouped_by_series() {
        let (app, _) = app().await;
        let (status, body) = get(&app, "/api/menu").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
        let milky = body["series"]["Milky Series"].as_array().unwrap();
        assert_eq!(milky.len(), 2);
        assert_eq!(milky[0]["drink_name"], "Classic Milk Tea");
        assert_eq!(milky[0]["drink_price"], 4.0);
        assert_eq!(milky[0]["hot_option"], true);
        assert_eq!(body["series"]["Ice Blended Series"][0]["qty_remaining"], 1);
    }

    #[tokio::test]
    async fn test_drinks_filtered_by_series() {
        let (app, _) = app().await;

        let (status, body) = get(&app, "/api/drinks?series=Milky%20Series").await;
        assert_eq!(status, StatusCode::OK);
        let drinks = body["drinks"].as_array().unwrap();
        assert_eq!(drinks.len(), 2);
        assert_eq!(drinks[0]["imageUrl"], "/Images/milk.png");
        assert_eq!(drinks[1]["imageUrl"], "/Images/placeholder.png");
        assert_eq!(drinks[1]["price"], 2.75);

        let (_, body) = get(&app, "/api/drinks").await;
        assert_eq!(body["drinks"].as_array().unwrap().len(), 4);
    }
}
