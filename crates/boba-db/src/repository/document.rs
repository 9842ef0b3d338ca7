//! # Document Repository
//!
//! Durable key → JSON storage. The kiosk keeps its cart here under
//! [`boba_core::CART_STORAGE_KEY`].

use chrono::Utc;
use serde_json::Value;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;

#[derive(Debug, Clone)]
pub struct DocumentRepository {
    pool: SqlitePool,
}

impl DocumentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        DocumentRepository { pool }
    }

    /// Reads a document. A body that is not valid JSON reads as a JSON
    /// string so callers can treat it as malformed instead of failing.
    pub async fn load(&self, key: &str) -> DbResult<Option<Value>> {
        let body: Option<String> = sqlx::query_scalar("SELECT body FROM documents WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(body.map(|body| serde_json::from_str(&body).unwrap_or(Value::String(body))))
    }

    /// Writes a document, replacing any previous body.
    pub async fn save(&self, key: &str, document: &Value) -> DbResult<()> {
        let body = serde_json::to_string(document)?;
        debug!(key, bytes = body.len(), "Saving document");

        sqlx::query(
            r#"
            INSERT INTO documents (key, body, updated_at) VALUES (?1, ?2, ?3)
            ON CONFLICT (key) DO UPDATE SET
                body = excluded.body,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(body)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Returns whether a document existed.
    pub async fn remove(&self, key: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM documents WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use serde_json::json;

    #[tokio::test]
    async fn test_save_load_remove() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let docs = db.documents();

        assert_eq!(docs.load("cart").await.unwrap(), None);

        docs.save("cart", &json!([{"name": "Taro", "lineTotal": 2.75}])).await.unwrap();
        docs.save("cart", &json!([])).await.unwrap();
        assert_eq!(docs.load("cart").await.unwrap(), Some(json!([])));

        assert!(docs.remove("cart").await.unwrap());
        assert!(!docs.remove("cart").await.unwrap());
    }

    #[tokio::test]
    async fn test_unparseable_body_reads_as_string() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        sqlx::query("INSERT INTO documents (key, body, updated_at) VALUES ('cart', '{oops', '')")
            .execute(db.pool())
            .await
            .unwrap();

        assert_eq!(
            db.documents().load("cart").await.unwrap(),
            Some(Value::String("{oops".into()))
        );
    }
}
