//! Universal types shared across the data sources and the query layer.
//!
//! Data sources convert their wire formats into these types. The CLI and
//! the REST API serialize only these, never source-specific structs.
//! Decimals serialize as JSON numbers so the dashboard can format them.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::{token_icon, ChainSpec, TokenContract};

// ── Prices ──────────────────────────────────────────────────────────

/// USD price snapshot for one symbol.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPrice {
    #[serde(with = "rust_decimal::serde::float")]
    pub usd: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub change24h: Decimal,
}

/// Prices keyed by ticker symbol.
pub type PriceMap = BTreeMap<String, TokenPrice>;

/// One entry of an oracle's batched price response, keyed by external id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OracleQuote {
    pub usd: Option<f64>,
    pub usd_24h_change: Option<f64>,
}

// ── Chains ──────────────────────────────────────────────────────────

/// Runtime configuration of one chain: static registry data plus the RPC
/// endpoint actually used.
#[derive(Debug, Clone)]
pub struct ChainConfig {
    pub chain_id: u64,
    pub name: String,
    pub native_symbol: String,
    pub icon: String,
    pub rpc_url: String,
    pub tokens: Vec<TokenContract>,
}

impl ChainConfig {
    /// Build from a registry entry, optionally overriding the RPC endpoint.
    pub fn from_spec(spec: &ChainSpec, rpc_override: Option<&str>) -> Self {
        Self {
            chain_id: spec.chain_id,
            name: spec.name.to_string(),
            native_symbol: spec.native_symbol.to_string(),
            icon: token_icon(spec.native_symbol),
            rpc_url: rpc_override.unwrap_or(spec.default_rpc).to_string(),
            tokens: spec.tokens.to_vec(),
        }
    }
}

// ── Portfolio ───────────────────────────────────────────────────────

/// One ERC20 holding within a chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainAssetBalance {
    pub symbol: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub usd_value: Decimal,
    pub icon: String,
}

/// Native balance plus non-zero token holdings on one chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainPortfolio {
    pub chain: String,
    pub chain_id: u64,
    pub symbol: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub usd_value: Decimal,
    pub icon: String,
    pub assets: Vec<ChainAssetBalance>,
}

impl ChainPortfolio {
    /// Native value plus every asset's value.
    pub fn total_usd(&self) -> Decimal {
        self.usd_value + self.assets.iter().map(|a| a.usd_value).sum::<Decimal>()
    }
}

/// What a degraded read was trying to fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "symbol", rename_all = "lowercase")]
pub enum ReadTarget {
    Native,
    Token(String),
    Decimals(String),
    Address,
}

impl std::fmt::Display for ReadTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReadTarget::Native => write!(f, "native balance"),
            ReadTarget::Token(s) => write!(f, "{s} balance"),
            ReadTarget::Decimals(s) => write!(f, "{s} decimals"),
            ReadTarget::Address => write!(f, "owner address"),
        }
    }
}

/// A read that failed and was replaced by zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadWarning {
    pub chain_id: u64,
    pub target: ReadTarget,
    pub message: String,
}

/// Aggregator output: chains in configured order plus degraded-read record.
#[derive(Debug, Clone, Default)]
pub struct PortfolioFetch {
    pub chains: Vec<ChainPortfolio>,
    pub warnings: Vec<ReadWarning>,
}

/// Flattened holding row for token tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRow {
    pub chain: String,
    pub chain_id: u64,
    pub chain_icon: String,
    pub symbol: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub usd_value: Decimal,
    pub icon: String,
}

// ── Profile ─────────────────────────────────────────────────────────

/// Per-chain contribution to net worth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainBreakdown {
    pub chain_id: u64,
    #[serde(with = "rust_decimal::serde::float")]
    pub tokens: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub defi: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub nfts: Decimal,
}

/// Net worth split by holding kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorthBreakdown {
    #[serde(with = "rust_decimal::serde::float")]
    pub tokens: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub defi: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub nfts: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetWorth {
    #[serde(with = "rust_decimal::serde::float")]
    pub usd: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub change_percent: Decimal,
    pub breakdown: WorthBreakdown,
    pub chains: Vec<ChainBreakdown>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SocialLinks {
    pub x: Option<String>,
    pub telegram: Option<String>,
}

/// Static identity fields of a profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileInfo {
    pub display_name: String,
    pub ens: Option<String>,
    pub bio: Option<String>,
    pub avatar: Option<String>,
    #[serde(default)]
    pub links: SocialLinks,
    pub following: u64,
    pub followers: u64,
    #[serde(with = "rust_decimal::serde::float")]
    pub earnings: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub address: String,
    #[serde(flatten)]
    pub info: ProfileInfo,
    pub net_worth: NetWorth,
}

// ── Stubbed collections ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftItem {
    pub collection: String,
    pub token_id: String,
    pub chain_id: u64,
    pub image: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub usd_value: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefiPosition {
    pub protocol: String,
    pub chain_id: u64,
    pub position: String,
    pub icon: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub usd_value: Decimal,
}

// ── Activity ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityChain {
    pub id: u64,
    pub name: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityUser {
    pub address: String,
    pub ens: Option<String>,
}

/// One entry of the wallet's activity history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub tx_hash: String,
    pub chain: ActivityChain,
    pub user: ActivityUser,
    pub action: String,
    pub details: String,
    /// RFC 3339 timestamp.
    pub timestamp: String,
}
