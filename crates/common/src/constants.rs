//! Universal constants for Chainfolio: chain and price registries.

use alloy::primitives::{address, Address};

/// Wallet shown when a query carries no address.
pub const DEFAULT_ADDRESS: &str = "0xf7b10d603907658f690da534e9b7dbc4dab3e2d6";

/// Native currencies on every supported chain use 18 decimals.
pub const NATIVE_DECIMALS: u8 = 18;

/// Price cache lifetime in seconds.
pub const PRICE_CACHE_TTL_SECS: u64 = 60;

/// Default per-call RPC timeout in seconds.
pub const RPC_TIMEOUT_SECS: u64 = 8;

/// Ticker symbol → CoinGecko id. Declaration order is the registry order.
pub const PRICE_IDS: &[(&str, &str)] = &[
    ("ETH", "ethereum"),
    ("BNB", "binancecoin"),
    ("AVAX", "avalanche-2"),
    ("ARB", "arbitrum"),
    ("SUI", "sui"),
    ("USDT", "tether"),
    ("USDC", "usd-coin"),
    ("DAI", "dai"),
    ("LINK", "chainlink"),
    ("CAKE", "pancakeswap-token"),
    ("BUSD", "binance-usd"),
    ("JOE", "joe"),
    ("GMX", "gmx"),
    ("MAGIC", "magic"),
    ("CETUS", "cetus-protocol"),
    ("NAVX", "navi-protocol"),
];

/// One ERC20 contract in a chain's token registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenContract {
    pub symbol: &'static str,
    pub address: Address,
}

/// Static description of a supported chain. Runtime RPC endpoints live in
/// [`crate::types::ChainConfig`], built from these.
#[derive(Debug, Clone, Copy)]
pub struct ChainSpec {
    pub chain_id: u64,
    pub name: &'static str,
    pub native_symbol: &'static str,
    pub default_rpc: &'static str,
    pub tokens: &'static [TokenContract],
}

const ETHEREUM_TOKENS: &[TokenContract] = &[
    TokenContract { symbol: "USDT", address: address!("dac17f958d2ee523a2206206994597c13d831ec7") },
    TokenContract { symbol: "USDC", address: address!("a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48") },
    TokenContract { symbol: "DAI", address: address!("6b175474e89094c44da98b954eedeac495271d0f") },
    TokenContract { symbol: "LINK", address: address!("514910771af9ca656af840dff83e8264ecf986ca") },
];

const BSC_TOKENS: &[TokenContract] = &[
    TokenContract { symbol: "CAKE", address: address!("0e09fabb73bd3ade0a17ecc321fd13a19e81ce82") },
    TokenContract { symbol: "USDT", address: address!("55d398326f99059ff775485246999027b3197955") },
    TokenContract { symbol: "BUSD", address: address!("e9e7cea3dedca5984780bafc599bd69add087d56") },
];

const AVALANCHE_TOKENS: &[TokenContract] = &[
    TokenContract { symbol: "JOE", address: address!("6e84a6216ea6dacc71ee8e6b0a5b7322eebc0fdd") },
    TokenContract { symbol: "USDT", address: address!("9702230a8ea53601f5cd2dc00fdbc13d4df4a8c7") },
    TokenContract { symbol: "USDC", address: address!("b97ef9ef8734c71904d8002f8b6bc66dd9c48a6e") },
];

const ARBITRUM_TOKENS: &[TokenContract] = &[
    TokenContract { symbol: "GMX", address: address!("fc5a1a6eb076a2c7ad06ed22c90d7e710e35ad0a") },
    TokenContract { symbol: "MAGIC", address: address!("539bde0d7dbd336b79148aa742883198bbf60342") },
    TokenContract { symbol: "USDC", address: address!("af88d065e77c8cc2239327c5edb3a432268e5831") },
];

/// Supported chains, in output order.
pub const SUPPORTED_CHAINS: &[ChainSpec] = &[
    ChainSpec {
        chain_id: 1,
        name: "Ethereum",
        native_symbol: "ETH",
        default_rpc: "https://eth.llamarpc.com",
        tokens: ETHEREUM_TOKENS,
    },
    ChainSpec {
        chain_id: 56,
        name: "Binance Smart Chain",
        native_symbol: "BNB",
        default_rpc: "https://bsc-dataseed.bnbchain.org",
        tokens: BSC_TOKENS,
    },
    ChainSpec {
        chain_id: 43114,
        name: "Avalanche",
        native_symbol: "AVAX",
        default_rpc: "https://api.avax.network/ext/bc/C/rpc",
        tokens: AVALANCHE_TOKENS,
    },
    ChainSpec {
        chain_id: 42161,
        name: "Arbitrum One",
        native_symbol: "ARB",
        default_rpc: "https://arb1.arbitrum.io/rpc",
        tokens: ARBITRUM_TOKENS,
    },
];

/// Icon path served by the dashboard for a token symbol.
pub fn token_icon(symbol: &str) -> String {
    format!("/media/token/{}.svg", symbol.to_lowercase())
}
