//! Shared application state for the API server.

use chainfolio_core::config::AppConfig;
use chainfolio_core::PortfolioApi;

/// Backend application state, shared across all request handlers.
pub struct AppState {
    pub api: PortfolioApi,
}

impl AppState {
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        Ok(Self {
            api: chainfolio_core::factory::from_config(config)?,
        })
    }
}
