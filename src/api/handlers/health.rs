use axum::Json;
use serde_json::{Value, json};

/// Liveness check. Does not touch the database.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
