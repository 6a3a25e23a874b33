use axum::response::Json;
use chrono::Utc;
use serde_json::{Value, json};

/// Liveness check shared by the web app and the CLI callback server.
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "time": Utc::now().to_rfc3339(),
    }))
}
