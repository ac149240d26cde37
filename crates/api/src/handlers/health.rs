//! Liveness endpoint.

use axum::Json;
use serde_json::{json, Value};

/// GET /health
///
/// Liveness only -- deliberately does not touch the database, so the
/// process answers even while its dependencies are down.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
