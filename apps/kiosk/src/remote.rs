//! # Order Server Clients
//!
//! The kiosk's view of its collaborators: where orders go, where the menu
//! comes from, where favorites are kept. Each is a trait so commands can be
//! driven by mocks; [`HttpClient`] implements all three against the order
//! server.
//!
//! ```text
//! commands ──► OrderSink::place_order      ──► POST   /api/orders
//!          ──► CatalogSource::menu         ──► GET    /api/menu
//!          ──► FavoritesStore::list        ──► GET    /api/favorites?customer=
//!          ──► FavoritesStore::save        ──► POST   /api/favorites
//!          ──► FavoritesStore::delete      ──► DELETE /api/favorites/{id}
//! ```

use async_trait::async_trait;
use boba_core::catalog::{DrinksResponse, MenuResponse};
use boba_core::{FavoriteRecord, FavoriteSaved, FavoritesResponse, NewFavorite, OrderReceipt, OrderRequest};
use mockall::automock;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use url::Url;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    /// The server refused the request as invalid (400/422).
    #[error("order server rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("unexpected response from order server: {0}")]
    UnexpectedResponse(String),

    #[error("invalid server URL: {0}")]
    InvalidUrl(String),
}

pub type RemoteResult<T> = Result<T, RemoteError>;

#[automock]
#[async_trait]
pub trait OrderSink: Send + Sync {
    async fn place_order(&self, request: &OrderRequest) -> RemoteResult<OrderReceipt>;
}

#[automock]
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn menu(&self) -> RemoteResult<MenuResponse>;
}

#[automock]
#[async_trait]
pub trait FavoritesStore: Send + Sync {
    async fn list(&self, customer_name: &str) -> RemoteResult<Vec<FavoriteRecord>>;

    async fn save(&self, favorite: &NewFavorite) -> RemoteResult<FavoriteRecord>;

    async fn delete(&self, id: i64) -> RemoteResult<()>;
}

// =============================================================================
// HTTP Client
// =============================================================================

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HealthBody {
    ok: bool,
}

/// reqwest client for the order server.
#[derive(Debug, Clone)]
pub struct HttpClient {
    base: Url,
    http: Client,
}

impl HttpClient {
    pub fn new(base: Url, timeout: Duration) -> RemoteResult<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(HttpClient { base, http })
    }

    fn endpoint(&self, path: &str) -> RemoteResult<Url> {
        self.base
            .join(path)
            .map_err(|e| RemoteError::InvalidUrl(format!("{}{}: {}", self.base, path, e)))
    }

    /// Decodes a success body, or turns the status and error body into a
    /// [`RemoteError`].
    async fn read<T: DeserializeOwned>(response: Response) -> RemoteResult<T> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .ok()
            .and_then(|body| body.error)
            .unwrap_or(text);

        Err(match status {
            StatusCode::NOT_FOUND => RemoteError::NotFound(message),
            StatusCode::CONFLICT => RemoteError::Conflict(message),
            s if s.is_client_error() => RemoteError::Rejected {
                status: s.as_u16(),
                message,
            },
            s => RemoteError::UnexpectedResponse(format!("status {s}: {message}")),
        })
    }

    /// `GET /healthz`
    pub async fn health(&self) -> RemoteResult<bool> {
        let response = self.http.get(self.endpoint("healthz")?).send().await?;
        let body: HealthBody = Self::read(response).await?;
        Ok(body.ok)
    }

    /// `GET /api/drinks`, optionally for one series.
    pub async fn drinks(&self, series: Option<&str>) -> RemoteResult<DrinksResponse> {
        let mut url = self.endpoint("api/drinks")?;
        if let Some(series) = series {
            url.query_pairs_mut().append_pair("series", series);
        }
        let response = self.http.get(url).send().await?;
        Self::read(response).await
    }
}

#[async_trait]
impl OrderSink for HttpClient {
    async fn place_order(&self, request: &OrderRequest) -> RemoteResult<OrderReceipt> {
        debug!(lines = request.orders.len(), "POST /api/orders");
        let response = self
            .http
            .post(self.endpoint("api/orders")?)
            .json(request)
            .send()
            .await?;
        Self::read(response).await
    }
}

#[async_trait]
impl CatalogSource for HttpClient {
    async fn menu(&self) -> RemoteResult<MenuResponse> {
        let response = self.http.get(self.endpoint("api/menu")?).send().await?;
        Self::read(response).await
    }
}

#[async_trait]
impl FavoritesStore for HttpClient {
    async fn list(&self, customer_name: &str) -> RemoteResult<Vec<FavoriteRecord>> {
        let mut url = self.endpoint("api/favorites")?;
        url.query_pairs_mut().append_pair("customer", customer_name);
        let response = self.http.get(url).send().await?;
        let body: FavoritesResponse = Self::read(response).await?;
        Ok(body.favorites)
    }

    async fn save(&self, favorite: &NewFavorite) -> RemoteResult<FavoriteRecord> {
        let response = self
            .http
            .post(self.endpoint("api/favorites")?)
            .json(favorite)
            .send()
            .await?;
        let body: FavoriteSaved = Self::read(response).await?;
        Ok(body.favorite)
    }

    async fn delete(&self, id: i64) -> RemoteResult<()> {
        let response = self
            .http
            .delete(self.endpoint(&format!("api/favorites/{id}"))?)
            .send()
            .await?;
        let _: serde_json::Value = Self::read(response).await?;
        Ok(())
    }
}
