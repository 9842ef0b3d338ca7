use axum::Json;
use serde_json::{json, Value};

pub async fn healthz() -> Json<Value> {
    Json(json!({ "ok": true, "message": "server up" }))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{app, get};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_healthz() {
        let (app, _) = app().await;
        let (status, body) = get(&app, "/healthz").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
        assert_eq!(body["message"], "server up");
    }
}
