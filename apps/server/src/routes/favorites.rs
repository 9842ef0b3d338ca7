//! Favorites per customer, keyed by the display name the kiosk supplies.
//!
//! Saving repeats the kiosk's duplicate check under the default policy, so
//! two kiosks racing on the same drink still store it once.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use boba_core::favorites::is_duplicate;
use boba_core::validation::{validate_display_name, validate_label};
use boba_core::{CoreError, FavoriteSaved, FavoritesResponse, NewFavorite};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::error::ServerError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct FavoritesQuery {
    #[serde(default)]
    pub customer: String,
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<FavoritesQuery>,
) -> Result<Json<FavoritesResponse>, ServerError> {
    let customer = validate_display_name("customer", &query.customer)?;
    let favorites = state.db.favorites().list_for_customer(&customer).await?;
    debug!(customer = %customer, count = favorites.len(), "Listing favorites");
    Ok(Json(FavoritesResponse {
        ok: true,
        favorites,
    }))
}

pub async fn save(
    State(state): State<AppState>,
    Json(mut favorite): Json<NewFavorite>,
) -> Result<(StatusCode, Json<FavoriteSaved>), ServerError> {
    favorite.customer_name = validate_display_name("customer_name", &favorite.customer_name)?;
    favorite.label = validate_label(favorite.label.as_deref())?;
    favorite.config.normalize();

    let catalog = state.db.drinks().catalog().await?;
    let entry = catalog
        .lookup(&favorite.config)
        .ok_or_else(|| CoreError::DrinkNotFound(favorite.config.name.clone()))?;
    favorite.config.catalog_id = entry.catalog_id.clone();
    favorite.config.name = entry.name.clone();
    if let Some(unknown) = favorite.config.toppings.first_unknown() {
        return Err(CoreError::unsupported(&entry.name, unknown).into());
    }

    let favorites = state.db.favorites();
    let existing = favorites.list_for_customer(&favorite.customer_name).await?;
    if is_duplicate(&favorite.config, &existing) {
        return Err(CoreError::DuplicateFavorite {
            name: favorite.config.name,
        }
        .into());
    }

    let record = favorites.insert(&favorite).await?;
    info!(id = record.id, customer = %record.customer_name, drink = %record.config.name, "Favorite saved");

    Ok((
        StatusCode::CREATED,
        Json(FavoriteSaved {
            ok: true,
            favorite: record,
        }),
    ))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ServerError> {
    state.db.favorites().delete(id).await?;
    info!(id, "Favorite deleted");
    Ok(Json(json!({ "ok": true })))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{app, delete, get, post_json};
    use axum::http::StatusCode;
    use serde_json::json;

    fn matcha(temperature: &str) -> serde_json::Value {
        json!({
            "customerName": "Ana",
            "name": "Matcha Latte",
            "basePrice": 5.0,
            "iceLevel": "regular",
            "sweetness": "50%",
            "temperature": temperature,
            "toppings": ["Pearls"]
        })
    }

    #[tokio::test]
    async fn test_save_list_delete() {
        let (app, _) = app().await;

        let (status, saved) = post_json(&app, "/api/favorites", &matcha("iced")).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(saved["favorite"]["catalogId"], "matcha_latte");
        let id = saved["favorite"]["id"].as_i64().unwrap();

        let (status, body) = get(&app, "/api/favorites?customer=Ana").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["favorites"].as_array().unwrap().len(), 1);

        let (status, _) = delete(&app, &format!("/api/favorites/{id}")).await;
        assert_eq!(status, StatusCode::OK);

        let (status, error) = delete(&app, &format!("/api/favorites/{id}")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(error["ok"], false);
    }

    #[tokio::test]
    async fn test_duplicate_is_conflict() {
        let (app, _) = app().await;

        let (status, _) = post_json(&app, "/api/favorites", &matcha("hot")).await;
        assert_eq!(status, StatusCode::CREATED);

        // Temperature is not part of the duplicate projection.
        let (status, error) = post_json(&app, "/api/favorites", &matcha("iced")).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(error["error"].as_str().unwrap().contains("already a favorite"));
    }

    #[tokio::test]
    async fn test_rejections() {
        let (app, _) = app().await;

        let (status, _) = get(&app, "/api/favorites").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let mut unknown = matcha("iced");
        unknown["name"] = json!("Unicorn Frappe");
        let (status, _) = post_json(&app, "/api/favorites", &unknown).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let mut blank = matcha("iced");
        blank["customerName"] = json!("  ");
        let (status, _) = post_json(&app, "/api/favorites", &blank).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
