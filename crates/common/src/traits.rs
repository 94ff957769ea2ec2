//! Data-source traits: the contract between the core and its modules.
//!
//! The core never talks HTTP or JSON-RPC itself. It drives these traits,
//! and the modules (`chainfolio-mod-coingecko`, `chainfolio-mod-evm`)
//! implement them. Tests substitute in-memory implementations.

use std::collections::HashMap;

use alloy::primitives::{Address, U256};
use async_trait::async_trait;

use crate::error::FolioResult;
use crate::types::{ChainConfig, OracleQuote};

/// Batched USD price feed keyed by the oracle's own ids.
#[async_trait]
pub trait PriceOracle: Send + Sync {
    /// Source name for logs.
    fn name(&self) -> &str;

    /// Fetch USD price and 24h change for every id in one request.
    /// Ids the oracle does not know are simply absent from the result.
    async fn simple_prices(&self, ids: &[&str]) -> FolioResult<HashMap<String, OracleQuote>>;
}

/// Read-only on-chain balance access.
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Native currency balance of `owner`, in wei-like base units.
    async fn native_balance(&self, chain: &ChainConfig, owner: Address) -> FolioResult<U256>;

    /// ERC20 `balanceOf(owner)` in base units.
    async fn erc20_balance(
        &self,
        chain: &ChainConfig,
        token: Address,
        owner: Address,
    ) -> FolioResult<U256>;

    /// ERC20 `decimals()`.
    async fn erc20_decimals(&self, chain: &ChainConfig, token: Address) -> FolioResult<u8>;
}
