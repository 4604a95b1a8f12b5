//! Liveness check.

use axum::Json;
use serde_json::{Value, json};

/// Returns `{"ok":true}` while the process is serving. Does not call Shopify.
pub async fn health() -> Json<Value> {
    Json(json!({ "ok": true }))
}
