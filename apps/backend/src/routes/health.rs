//! Health check endpoint.

use std::sync::Arc;
use axum::{Router, Json, extract::State, routing::get};
use serde_json::{json, Value};
use crate::state::AppState;

async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    let cached_at = state.api.price_service().cache().latest().map(|s| s.timestamp);
    Json(json!({
        "status": "ok",
        "service": "chainfolio-backend",
        "version": env!("CARGO_PKG_VERSION"),
        "pricesCachedAt": cached_at,
    }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(health))
}
