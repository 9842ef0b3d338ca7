//! # Boba Order Server
//!
//! HTTP API the kiosks talk to: the menu, order acceptance and favorites,
//! over one SQLite database.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Order Server                                     │
//! │                                                                         │
//! │  Kiosk ───► HTTP (3000) ───► CORS ─► Trace ─► routes/* ───► SQLite     │
//! │                                                   │                     │
//! │                                                   ▼                     │
//! │                                    boba-core validation + pricing       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod routes;

use axum::http::{header::CONTENT_TYPE, Method};
use axum::Router;
use boba_core::TaxRate;
use boba_db::{Database, DbConfig};
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use config::ServerConfig;

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
    /// Applied to every accepted order
    pub tax_rate: TaxRate,
}

/// The full application: routes plus CORS and request tracing.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Opens the database, binds and serves until Ctrl+C or SIGTERM.
pub async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let db = Database::new(DbConfig::new(config.database_path.clone())).await?;
    info!(path = %config.database_path.display(), "Database ready");

    let state = AppState {
        db: db.clone(),
        tax_rate: config.tax_rate,
    };

    let address = config.socket_addr();
    let listener = TcpListener::bind(address).await?;
    info!(%address, tax_rate = %config.tax_rate.percentage(), "Order server listening");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_cors_preflight() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let app = app(AppState {
            db,
            tax_rate: TaxRate::default(),
        });

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/api/orders")
                    .header("origin", "http://kiosk.local")
                    .header("access-control-request-method", "POST")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response
            .headers()
            .contains_key("access-control-allow-origin"));
    }
}
