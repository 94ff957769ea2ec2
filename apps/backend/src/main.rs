//! Chainfolio Backend: REST API for the portfolio dashboard.
//!
//! Responsibilities:
//! - wallet portfolio, token table and profile queries
//! - cached USD prices
//! - stubbed NFT/DeFi collections and bundled activity history

mod error;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::EnvFilter;

use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    chainfolio_core::init_workspace()?;
    let mut config = chainfolio_core::workspace::load_config()?;
    config.apply_env();

    let default_level = if config.general.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    tracing::info!("Chainfolio backend starting...");

    let state = Arc::new(AppState::from_config(&config)?);
    let app = app(state);

    let addr: SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("Invalid server bind address: {}", config.server.bind))?;
    tracing::info!("Listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api", routes::api_router())
        .layer(cors)
        .with_state(state)
}
