//! Multi-chain wallet aggregation: native + ERC20 balances priced in USD.
//!
//! Chains are read concurrently; within a chain the native balance comes
//! first, then every registered token (balance and decimals together).
//! A failed or timed-out read never fails the request: it becomes a zero
//! balance plus a [`ReadWarning`].

use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{Address, U256};
use futures::future::join_all;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use chainfolio_common::constants::{token_icon, TokenContract, NATIVE_DECIMALS};
use chainfolio_common::error::{FolioError, FolioResult};
use chainfolio_common::traits::ChainReader;
use chainfolio_common::types::{
    ChainAssetBalance, ChainConfig, ChainPortfolio, PortfolioFetch, PriceMap, ReadTarget,
    ReadWarning, TokenPrice,
};

use crate::units::format_units;

/// Builds per-chain portfolios from direct RPC reads.
pub struct PortfolioAggregator {
    reader: Arc<dyn ChainReader>,
    chains: Vec<ChainConfig>,
    rpc_timeout: Duration,
}

impl PortfolioAggregator {
    pub fn new(reader: Arc<dyn ChainReader>, chains: Vec<ChainConfig>, rpc_timeout: Duration) -> Self {
        Self {
            reader,
            chains,
            rpc_timeout,
        }
    }

    /// Chains in output order.
    pub fn chains(&self) -> &[ChainConfig] {
        &self.chains
    }

    /// One [`ChainPortfolio`] per configured chain, in configured order.
    pub async fn fetch_wallet_portfolio(&self, address: &str, prices: &PriceMap) -> PortfolioFetch {
        let owner = Address::from_str(address.trim())
            .map_err(|e| FolioError::InvalidAddress(format!("{address}: {e}")));

        let per_chain = join_all(
            self.chains
                .iter()
                .map(|chain| self.fetch_chain(chain, &owner, prices)),
        )
        .await;

        let mut fetch = PortfolioFetch::default();
        for (portfolio, warnings) in per_chain {
            fetch.chains.push(portfolio);
            fetch.warnings.extend(warnings);
        }
        debug!(
            address,
            chains = fetch.chains.len(),
            degraded_reads = fetch.warnings.len(),
            "wallet portfolio assembled"
        );
        fetch
    }

    async fn fetch_chain(
        &self,
        chain: &ChainConfig,
        owner: &FolioResult<Address>,
        prices: &PriceMap,
    ) -> (ChainPortfolio, Vec<ReadWarning>) {
        let mut warnings = Vec::new();

        let owner = match owner {
            Ok(owner) => *owner,
            Err(e) => {
                warnings.push(degrade(chain, ReadTarget::Address, e));
                return (build_chain(chain, Decimal::ZERO, Vec::new(), prices), warnings);
            }
        };

        let native_raw = match self.bounded(chain, self.reader.native_balance(chain, owner)).await {
            Ok(raw) => raw,
            Err(e) => {
                warnings.push(degrade(chain, ReadTarget::Native, &e));
                U256::ZERO
            }
        };
        let native = format_units(native_raw, NATIVE_DECIMALS);

        let reads = join_all(
            chain
                .tokens
                .iter()
                .map(|token| self.read_token(chain, token, owner)),
        )
        .await;

        let mut assets = Vec::new();
        for (token, read) in chain.tokens.iter().zip(reads) {
            let balance = match read {
                Ok(balance) => balance,
                Err(warning) => {
                    warnings.push(warning);
                    Decimal::ZERO
                }
            };
            if balance > Decimal::ZERO {
                assets.push(ChainAssetBalance {
                    symbol: token.symbol.to_string(),
                    balance,
                    usd_value: usd_value(balance, prices.get(token.symbol)),
                    icon: token_icon(token.symbol),
                });
            }
        }

        (build_chain(chain, native, assets, prices), warnings)
    }

    /// `balanceOf` and `decimals` issued together; either failing zeroes the token.
    async fn read_token(
        &self,
        chain: &ChainConfig,
        token: &TokenContract,
        owner: Address,
    ) -> Result<Decimal, ReadWarning> {
        let (balance, decimals) = futures::join!(
            self.bounded(chain, self.reader.erc20_balance(chain, token.address, owner)),
            self.bounded(chain, self.reader.erc20_decimals(chain, token.address)),
        );
        let balance = balance
            .map_err(|e| degrade(chain, ReadTarget::Token(token.symbol.to_string()), &e))?;
        let decimals = decimals
            .map_err(|e| degrade(chain, ReadTarget::Decimals(token.symbol.to_string()), &e))?;
        Ok(format_units(balance, decimals))
    }

    /// Apply the per-call RPC timeout.
    async fn bounded<T>(
        &self,
        chain: &ChainConfig,
        read: impl Future<Output = FolioResult<T>>,
    ) -> FolioResult<T> {
        match tokio::time::timeout(self.rpc_timeout, read).await {
            Ok(result) => result,
            Err(_) => Err(FolioError::Timeout {
                what: format!("RPC read on {} ({})", chain.name, chain.chain_id),
                after: self.rpc_timeout,
            }),
        }
    }
}

fn build_chain(
    chain: &ChainConfig,
    native: Decimal,
    assets: Vec<ChainAssetBalance>,
    prices: &PriceMap,
) -> ChainPortfolio {
    ChainPortfolio {
        chain: chain.name.clone(),
        chain_id: chain.chain_id,
        symbol: chain.native_symbol.clone(),
        balance: native,
        usd_value: usd_value(native, prices.get(&chain.native_symbol)),
        icon: chain.icon.clone(),
        assets,
    }
}

/// `balance * price.usd`, zero when the price is unknown.
pub fn usd_value(balance: Decimal, price: Option<&TokenPrice>) -> Decimal {
    price
        .and_then(|p| balance.checked_mul(p.usd))
        .unwrap_or_default()
}

fn degrade(chain: &ChainConfig, target: ReadTarget, error: &FolioError) -> ReadWarning {
    warn!(
        chain_id = chain.chain_id,
        chain = %chain.name,
        target = %target,
        error = %error,
        "read failed, using zero"
    );
    ReadWarning {
        chain_id: chain.chain_id,
        target,
        message: error.to_string(),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chainfolio_common::constants::{DEFAULT_ADDRESS, SUPPORTED_CHAINS};

    /// In-memory chain state keyed by chain id and token symbol.
    #[derive(Default)]
    pub(crate) struct StubReader {
        native: HashMap<u64, U256>,
        tokens: HashMap<(u64, &'static str), (U256, u8)>,
        fail_native: HashSet<u64>,
        fail_balance: HashSet<(u64, &'static str)>,
        fail_decimals: HashSet<(u64, &'static str)>,
        slow_native: HashSet<u64>,
        calls: AtomicUsize,
    }

    impl StubReader {
        pub(crate) fn with_native(mut self, chain_id: u64, raw: U256) -> Self {
            self.native.insert(chain_id, raw);
            self
        }

        pub(crate) fn with_token(mut self, chain_id: u64, symbol: &'static str, raw: U256, decimals: u8) -> Self {
            self.tokens.insert((chain_id, symbol), (raw, decimals));
            self
        }

        pub(crate) fn failing_native(mut self, chain_id: u64) -> Self {
            self.fail_native.insert(chain_id);
            self
        }

        pub(crate) fn failing_balance(mut self, chain_id: u64, symbol: &'static str) -> Self {
            self.fail_balance.insert((chain_id, symbol));
            self
        }

        pub(crate) fn failing_decimals(mut self, chain_id: u64, symbol: &'static str) -> Self {
            self.fail_decimals.insert((chain_id, symbol));
            self
        }

        pub(crate) fn slow_native(mut self, chain_id: u64) -> Self {
            self.slow_native.insert(chain_id);
            self
        }

        fn symbol(chain: &ChainConfig, token: Address) -> &'static str {
            chain
                .tokens
                .iter()
                .find(|t| t.address == token)
                .map(|t| t.symbol)
                .unwrap_or("?")
        }
    }

    #[async_trait]
    impl ChainReader for StubReader {
        async fn native_balance(&self, chain: &ChainConfig, _owner: Address) -> FolioResult<U256> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.slow_native.contains(&chain.chain_id) {
                tokio::time::sleep(Duration::from_secs(5)).await;
            }
            if self.fail_native.contains(&chain.chain_id) {
                return Err(FolioError::Rpc { chain_id: chain.chain_id, message: "connection reset".into() });
            }
            Ok(self.native.get(&chain.chain_id).copied().unwrap_or_default())
        }

        async fn erc20_balance(&self, chain: &ChainConfig, token: Address, _owner: Address) -> FolioResult<U256> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let symbol = Self::symbol(chain, token);
            if self.fail_balance.contains(&(chain.chain_id, symbol)) {
                return Err(FolioError::Rpc { chain_id: chain.chain_id, message: "header not found".into() });
            }
            Ok(self
                .tokens
                .get(&(chain.chain_id, symbol))
                .map(|(raw, _)| *raw)
                .unwrap_or_default())
        }

        async fn erc20_decimals(&self, chain: &ChainConfig, token: Address) -> FolioResult<u8> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let symbol = Self::symbol(chain, token);
            if self.fail_decimals.contains(&(chain.chain_id, symbol)) {
                return Err(FolioError::Rpc { chain_id: chain.chain_id, message: "execution reverted".into() });
            }
            Ok(self
                .tokens
                .get(&(chain.chain_id, symbol))
                .map(|(_, decimals)| *decimals)
                .unwrap_or(18))
        }
    }

    /// `units * 10^decimals`.
    pub(crate) fn raw(units: u64, decimals: u8) -> U256 {
        U256::from(units) * U256::from(10u64).pow(U256::from(decimals))
    }

    pub(crate) fn default_chains() -> Vec<ChainConfig> {
        SUPPORTED_CHAINS
            .iter()
            .map(|spec| ChainConfig::from_spec(spec, None))
            .collect()
    }

    pub(crate) fn prices(entries: &[(&str, &str)]) -> PriceMap {
        entries
            .iter()
            .map(|(symbol, usd)| {
                (
                    symbol.to_string(),
                    TokenPrice { usd: usd.parse().unwrap(), change24h: Decimal::ZERO },
                )
            })
            .collect()
    }

    fn aggregator(reader: StubReader) -> PortfolioAggregator {
        PortfolioAggregator::new(Arc::new(reader), default_chains(), Duration::from_secs(2))
    }

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn test_one_entry_per_chain_in_order() {
        let agg = aggregator(StubReader::default());
        let fetch = agg.fetch_wallet_portfolio(DEFAULT_ADDRESS, &PriceMap::new()).await;

        let ids: Vec<u64> = fetch.chains.iter().map(|c| c.chain_id).collect();
        assert_eq!(ids, vec![1, 56, 43114, 42161]);
        assert!(fetch.chains.iter().all(|c| c.assets.is_empty()));
        assert!(fetch.chains.iter().all(|c| c.balance.is_zero()));
        assert!(fetch.warnings.is_empty());
    }

    #[tokio::test]
    async fn test_eth_priced_and_zero_tokens_excluded() {
        let reader = StubReader::default()
            .with_native(1, raw(25, 17))
            .with_token(1, "USDC", raw(100, 6), 6);
        let agg = aggregator(reader);
        let fetch = agg
            .fetch_wallet_portfolio(DEFAULT_ADDRESS, &prices(&[("ETH", "2000"), ("USDC", "1")]))
            .await;

        let eth = &fetch.chains[0];
        assert_eq!(eth.chain, "Ethereum");
        assert_eq!(eth.balance, d("2.5"));
        assert_eq!(eth.usd_value, d("5000"));
        assert_eq!(eth.assets.len(), 1);
        assert_eq!(eth.assets[0].symbol, "USDC");
        assert_eq!(eth.assets[0].balance, d("100"));
        assert_eq!(eth.assets[0].usd_value, d("100"));
        assert_eq!(eth.assets[0].icon, "/media/token/usdc.svg");
    }

    #[tokio::test]
    async fn test_assets_follow_registry_order() {
        let reader = StubReader::default()
            .with_token(1, "LINK", raw(3, 18), 18)
            .with_token(1, "USDT", raw(10, 6), 6)
            .with_token(1, "DAI", raw(7, 18), 18);
        let fetch = aggregator(reader)
            .fetch_wallet_portfolio(DEFAULT_ADDRESS, &PriceMap::new())
            .await;

        let symbols: Vec<&str> = fetch.chains[0].assets.iter().map(|a| a.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["USDT", "DAI", "LINK"]);
    }

    #[tokio::test]
    async fn test_unknown_price_values_zero_but_keeps_asset() {
        let reader = StubReader::default().with_token(42161, "MAGIC", raw(50, 18), 18);
        let fetch = aggregator(reader)
            .fetch_wallet_portfolio(DEFAULT_ADDRESS, &PriceMap::new())
            .await;

        let arb = &fetch.chains[3];
        assert_eq!(arb.assets.len(), 1);
        assert_eq!(arb.assets[0].balance, d("50"));
        assert!(arb.assets[0].usd_value.is_zero());
    }

    #[tokio::test]
    async fn test_native_failure_is_isolated() {
        let reader = StubReader::default()
            .with_native(1, raw(1, 18))
            .with_native(56, raw(4, 18))
            .failing_native(56)
            .with_token(56, "CAKE", raw(20, 18), 18);
        let fetch = aggregator(reader)
            .fetch_wallet_portfolio(DEFAULT_ADDRESS, &prices(&[("BNB", "600"), ("CAKE", "2")]))
            .await;

        let bsc = &fetch.chains[1];
        assert!(bsc.balance.is_zero());
        assert!(bsc.usd_value.is_zero());
        assert_eq!(bsc.assets.len(), 1);
        assert_eq!(bsc.assets[0].usd_value, d("40"));
        assert_eq!(fetch.chains[0].balance, d("1"));

        assert_eq!(fetch.warnings.len(), 1);
        assert_eq!(fetch.warnings[0].chain_id, 56);
        assert_eq!(fetch.warnings[0].target, ReadTarget::Native);
        assert!(fetch.warnings[0].message.contains("connection reset"));
    }

    #[tokio::test]
    async fn test_decimals_failure_zeroes_token() {
        let reader = StubReader::default()
            .with_token(43114, "JOE", raw(9, 18), 18)
            .with_token(43114, "USDC", raw(5, 6), 6)
            .failing_decimals(43114, "JOE");
        let fetch = aggregator(reader)
            .fetch_wallet_portfolio(DEFAULT_ADDRESS, &PriceMap::new())
            .await;

        let avax = &fetch.chains[2];
        let symbols: Vec<&str> = avax.assets.iter().map(|a| a.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["USDC"]);
        assert_eq!(fetch.warnings.len(), 1);
        assert_eq!(fetch.warnings[0].target, ReadTarget::Decimals("JOE".into()));
    }

    #[tokio::test]
    async fn test_balance_failure_zeroes_token() {
        let reader = StubReader::default()
            .with_token(1, "USDT", raw(10, 6), 6)
            .with_token(1, "DAI", raw(7, 18), 18)
            .with_token(1, "LINK", raw(3, 18), 18)
            .failing_balance(1, "DAI");
        let fetch = aggregator(reader)
            .fetch_wallet_portfolio(DEFAULT_ADDRESS, &PriceMap::new())
            .await;

        let symbols: Vec<&str> = fetch.chains[0].assets.iter().map(|a| a.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["USDT", "LINK"]);
        assert_eq!(fetch.warnings.len(), 1);
        assert_eq!(fetch.warnings[0].chain_id, 1);
        assert_eq!(fetch.warnings[0].target, ReadTarget::Token("DAI".into()));
        assert!(fetch.warnings[0].message.contains("header not found"));
    }

    #[tokio::test]
    async fn test_malformed_address_degrades_without_reads() {
        let reader = Arc::new(StubReader::default().with_native(1, raw(1, 18)));
        let agg = PortfolioAggregator::new(reader.clone(), default_chains(), Duration::from_secs(2));
        let fetch = agg.fetch_wallet_portfolio("0xnot-an-address", &PriceMap::new()).await;

        assert_eq!(fetch.chains.len(), 4);
        assert!(fetch.chains.iter().all(|c| c.balance.is_zero() && c.assets.is_empty()));
        assert_eq!(fetch.warnings.len(), 4);
        assert!(fetch.warnings.iter().all(|w| w.target == ReadTarget::Address));
        assert!(fetch.warnings[0].message.starts_with("Invalid address: 0xnot-an-address"));
        assert_eq!(reader.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_slow_read_times_out_to_zero() {
        let reader = StubReader::default()
            .with_native(43114, raw(3, 18))
            .slow_native(43114)
            .with_native(1, raw(2, 18));
        let agg = PortfolioAggregator::new(Arc::new(reader), default_chains(), Duration::from_millis(50));
        let fetch = agg.fetch_wallet_portfolio(DEFAULT_ADDRESS, &PriceMap::new()).await;

        assert!(fetch.chains[2].balance.is_zero());
        assert_eq!(fetch.chains[0].balance, d("2"));
        assert_eq!(fetch.warnings.len(), 1);
        assert!(fetch.warnings[0].message.contains("Timed out after 50ms"));
    }

    #[test]
    fn test_usd_value_without_price() {
        assert!(usd_value(d("10"), None).is_zero());
        let price = TokenPrice { usd: d("1.5"), change24h: Decimal::ZERO };
        assert_eq!(usd_value(d("10"), Some(&price)), d("15"));
    }
}
