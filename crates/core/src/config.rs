use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use chainfolio_common::constants::{
    DEFAULT_ADDRESS, PRICE_CACHE_TTL_SECS, RPC_TIMEOUT_SECS, SUPPORTED_CHAINS,
};
use chainfolio_common::types::ChainConfig;

// ═══════════════════════════════════════════════════════════════════════
//  APP CONFIG, stored at ~/.chainfolio/config.toml
// ═══════════════════════════════════════════════════════════════════════

/// Top-level configuration stored in `$HOME/.chainfolio/config.toml`.
///
/// ```toml
/// [general]
/// default_address = "0xf7b10d603907658f690da534e9b7dbc4dab3e2d6"
/// verbose = false
///
/// [server]
/// bind = "0.0.0.0:3001"
///
/// [prices]
/// tier = "public"
/// cache_ttl_secs = 60
/// timeout_secs = 10
///
/// [rpc]
/// timeout_secs = 8
///
/// [rpc.endpoints]
/// "56" = "https://bsc-rpc.example"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub server: ServerConfig,
    pub prices: PricesConfig,
    pub rpc: RpcConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Wallet used when a query names no address.
    pub default_address: String,
    /// Enable verbose tracing output.
    #[serde(default)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address for `chainfolio-server`.
    pub bind: String,
}

/// Price oracle settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricesConfig {
    /// CoinGecko tier: "public", "demo" or "pro".
    pub tier: String,
    /// Overridden by `COINGECKO_API_KEY`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    pub cache_ttl_secs: u64,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    /// Upper bound for a single balance/decimals read.
    pub timeout_secs: u64,
    /// Per-chain endpoint overrides, keyed by chain id.
    #[serde(default)]
    pub endpoints: BTreeMap<String, String>,
}

// ═══════════════════════════════════════════════════════════════════════
//  DEFAULTS
// ═══════════════════════════════════════════════════════════════════════

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_address: DEFAULT_ADDRESS.into(),
            verbose: false,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:3001".into(),
        }
    }
}

impl Default for PricesConfig {
    fn default() -> Self {
        Self {
            tier: "public".into(),
            api_key: None,
            base_url: None,
            cache_ttl_secs: PRICE_CACHE_TTL_SECS,
            timeout_secs: 10,
        }
    }
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            timeout_secs: RPC_TIMEOUT_SECS,
            endpoints: BTreeMap::new(),
        }
    }
}

impl PricesConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

impl RpcConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

impl AppConfig {
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Chain registry in output order, with configured RPC endpoints applied.
    pub fn chains(&self) -> Vec<ChainConfig> {
        SUPPORTED_CHAINS
            .iter()
            .map(|spec| {
                let endpoint = self.rpc.endpoints.get(&spec.chain_id.to_string());
                ChainConfig::from_spec(spec, endpoint.map(String::as_str))
            })
            .collect()
    }

    /// Apply `COINGECKO_API_KEY` and `CHAINFOLIO_BIND` when set.
    pub fn apply_env(&mut self) {
        self.apply_overrides(
            std::env::var("COINGECKO_API_KEY").ok(),
            std::env::var("CHAINFOLIO_BIND").ok(),
        );
    }

    fn apply_overrides(&mut self, api_key: Option<String>, bind: Option<String>) {
        if let Some(key) = api_key.filter(|k| !k.trim().is_empty()) {
            self.prices.api_key = Some(key);
        }
        if let Some(bind) = bind.filter(|b| !b.trim().is_empty()) {
            self.server.bind = bind;
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  TESTS
// ═══════════════════════════════════════════════════════════════════════
