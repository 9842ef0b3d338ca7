//! # Server Error Type
//!
//! Every handler returns `Result<_, ServerError>`; failures reach the kiosk
//! as a status code and `{ "ok": false, "error": "..." }`.
//!
//! ```text
//! CoreError::EmptyCart / Validation / CartTooLarge  ──► 400 Bad Request
//! CoreError::DrinkNotFound / OutOfStock /
//!           InsufficientStock / UnsupportedOption /
//!           InvalidLine                             ──► 422 Unprocessable
//! CoreError::DuplicateFavorite                      ──► 409 Conflict
//! DbError::NotFound                                 ──► 404 Not Found
//! DbError::InsufficientStock                        ──► 422 Unprocessable
//! DbError::* (other)                                ──► 500, logged
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use boba_core::{CoreError, ValidationError};
use boba_db::DbError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ServerError {
    /// The request body is missing something or malformed.
    #[error("{0}")]
    BadRequest(String),

    /// Well-formed, but the catalog or pricing rules reject it.
    #[error("{0}")]
    Unprocessable(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Database query failed")]
    Database(#[source] DbError),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::Conflict(_) => StatusCode::CONFLICT,
            ServerError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<CoreError> for ServerError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::EmptyCart => ServerError::BadRequest("No orders provided".to_string()),
            CoreError::Validation(_) | CoreError::CartTooLarge { .. } => {
                ServerError::BadRequest(err.to_string())
            }
            CoreError::DuplicateFavorite { .. } => ServerError::Conflict(err.to_string()),
            CoreError::Serialization(_) => ServerError::BadRequest(err.to_string()),
            _ => ServerError::Unprocessable(err.to_string()),
        }
    }
}

impl From<ValidationError> for ServerError {
    fn from(err: ValidationError) -> Self {
        ServerError::BadRequest(err.to_string())
    }
}

impl From<DbError> for ServerError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { .. } => ServerError::NotFound(err.to_string()),
            DbError::UniqueViolation { .. } => ServerError::Conflict(err.to_string()),
            DbError::InsufficientStock { .. } => ServerError::Unprocessable(err.to_string()),
            other => ServerError::Database(other),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let ServerError::Database(e) = &self {
            error!(error = %e, "Database error while handling request");
        }

        (status, Json(json!({ "ok": false, "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_error_statuses() {
        assert_eq!(ServerError::from(CoreError::EmptyCart).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ServerError::from(CoreError::unsupported("Mango Smoothie", "hot")).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ServerError::from(CoreError::DuplicateFavorite { name: "Matcha".into() }).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ServerError::from(CoreError::Validation(ValidationError::required("customer_name")))
                .status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_db_error_statuses() {
        assert_eq!(
            ServerError::from(DbError::not_found("Favorite", "9")).status(),
            StatusCode::NOT_FOUND
        );
        let err = DbError::InsufficientStock {
            drink: "Mango Smoothie".into(),
            requested: 2,
            remaining: 1,
        };
        assert_eq!(ServerError::from(err).status(), StatusCode::UNPROCESSABLE_ENTITY);
        let err = ServerError::from(DbError::QueryFailed("disk I/O error".into()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Database query failed");
    }
}
