//! API routes for the Chainfolio backend.

pub mod health;
pub mod portfolio;

use std::sync::Arc;
use axum::Router;
use crate::state::AppState;

/// Build the API router with all routes.
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        .merge(health::router())
        .merge(portfolio::router())
}
