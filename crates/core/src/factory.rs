//! API factory: wires the data-source modules into the query layer.
//!
//! Both binaries build their [`PortfolioApi`] here.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use chainfolio_mod_coingecko::{CoinGeckoClient, CoinGeckoTier};
use chainfolio_mod_evm::EvmRpcClient;

use crate::aggregator::PortfolioAggregator;
use crate::api::PortfolioApi;
use crate::config::AppConfig;
use crate::price_cache::PriceService;

/// Build the query API from config.
pub fn from_config(config: &AppConfig) -> Result<PortfolioApi> {
    let tier: CoinGeckoTier = config
        .prices
        .tier
        .parse()
        .with_context(|| format!("Invalid [prices] tier in config: {}", config.prices.tier))?;

    let mut coingecko = CoinGeckoClient::new(config.prices.api_key.as_deref(), tier, config.prices.timeout());
    if let Some(url) = &config.prices.base_url {
        coingecko = coingecko.with_base_url(url.as_str());
    }
    info!(tier = ?coingecko.tier(), ttl_secs = config.prices.cache_ttl_secs, "price oracle: coingecko");

    let prices = PriceService::new(Arc::new(coingecko), config.prices.cache_ttl());
    let reader = Arc::new(EvmRpcClient::new(config.rpc.timeout()));
    let aggregator = PortfolioAggregator::new(reader, config.chains(), config.rpc.timeout());
    info!(chains = aggregator.chains().len(), rpc_timeout_secs = config.rpc.timeout_secs, "chain reader: evm json-rpc");

    Ok(PortfolioApi::new(prices, aggregator, config.general.default_address.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_builds() {
        let api = from_config(&AppConfig::default()).unwrap();
        assert_eq!(api.default_address(), AppConfig::default().general.default_address);
    }

    #[test]
    fn test_unknown_tier_rejected() {
        let mut config = AppConfig::default();
        config.prices.tier = "platinum".into();
        let Err(err) = from_config(&config) else { panic!("expected error for unknown tier") };
        assert!(err.to_string().contains("platinum"));
    }
}
