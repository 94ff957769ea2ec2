//! CoinGecko API client: Public/Demo/Pro tiers, `simple/price` only.
//!
//! Public and Demo share api.coingecko.com; Demo and Pro send their key in
//! a tier-specific header. Rate-limit responses (429) are not retried:
//! the caller serves its stale cache instead.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use chainfolio_common::error::{FolioError, FolioResult};
use chainfolio_common::traits::PriceOracle;
use chainfolio_common::types::OracleQuote;

/// CoinGecko API tier; determines base URL and auth header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoinGeckoTier {
    /// Keyless free API: api.coingecko.com/api/v3
    Public,
    /// Demo (free, keyed) API: api.coingecko.com/api/v3
    Demo,
    /// Pro (paid) API: pro-api.coingecko.com/api/v3
    Pro,
}

impl std::str::FromStr for CoinGeckoTier {
    type Err = FolioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "public" | "free" => Ok(CoinGeckoTier::Public),
            "demo" => Ok(CoinGeckoTier::Demo),
            "pro" => Ok(CoinGeckoTier::Pro),
            other => Err(FolioError::Config(format!("unknown CoinGecko tier: {other}"))),
        }
    }
}

/// CoinGecko HTTP client.
#[derive(Clone)]
pub struct CoinGeckoClient {
    http: Client,
    api_key: Option<String>,
    tier: CoinGeckoTier,
    base_url: Option<String>,
}

impl CoinGeckoClient {
    /// Create a new CoinGecko client. A missing key forces the public tier.
    pub fn new(api_key: Option<&str>, tier: CoinGeckoTier, timeout: Duration) -> Self {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build CoinGecko HTTP client");

        let api_key = api_key.filter(|k| !k.is_empty()).map(str::to_string);
        let tier = if api_key.is_none() { CoinGeckoTier::Public } else { tier };

        Self {
            http,
            api_key,
            tier,
            base_url: None,
        }
    }

    /// Point the client at another host (mirrors, local stubs).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into().trim_end_matches('/').to_string());
        self
    }

    pub fn tier(&self) -> CoinGeckoTier {
        self.tier
    }

    /// Base URL for CoinGecko v3 API.
    fn base_url(&self) -> &str {
        if let Some(url) = &self.base_url {
            return url;
        }
        match self.tier {
            CoinGeckoTier::Public | CoinGeckoTier::Demo => "https://api.coingecko.com/api/v3",
            CoinGeckoTier::Pro => "https://pro-api.coingecko.com/api/v3",
        }
    }

    /// Auth header name, if the tier sends one.
    fn auth_header(&self) -> Option<&'static str> {
        match self.tier {
            CoinGeckoTier::Public => None,
            CoinGeckoTier::Demo => Some("x-cg-demo-api-key"),
            CoinGeckoTier::Pro => Some("x-cg-pro-api-key"),
        }
    }

    /// Execute a GET request and decode the JSON body.
    async fn get<T: for<'de> serde::Deserialize<'de>>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> FolioResult<T> {
        let mut req = self
            .http
            .get(url)
            .header("Accept", "application/json")
            .query(query);
        if let (Some(header), Some(key)) = (self.auth_header(), &self.api_key) {
            req = req.header(header, key);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| FolioError::Network(format!("CoinGecko request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(FolioError::Oracle(format!("CoinGecko API error {status}: {body}")));
        }

        resp.json()
            .await
            .map_err(|e| FolioError::Oracle(format!("Parse CoinGecko response: {e}")))
    }

    /// `GET /simple/price` for a batch of coin ids in USD with 24h change.
    pub async fn simple_price_usd(&self, ids: &[&str]) -> FolioResult<HashMap<String, OracleQuote>> {
        let url = format!("{}/simple/price", self.base_url());
        let ids = ids.join(",");
        let query = [
            ("ids", ids.as_str()),
            ("vs_currencies", "usd"),
            ("include_24hr_change", "true"),
        ];
        debug!(ids = %ids, tier = ?self.tier, "fetching CoinGecko prices");
        self.get(&url, &query).await
    }
}

#[async_trait]
impl PriceOracle for CoinGeckoClient {
    fn name(&self) -> &str {
        "coingecko"
    }

    async fn simple_prices(&self, ids: &[&str]) -> FolioResult<HashMap<String, OracleQuote>> {
        self.simple_price_usd(ids).await
    }
}
