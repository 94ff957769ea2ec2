//! CoinGecko price source for Chainfolio.

pub mod client;

pub use client::{CoinGeckoClient, CoinGeckoTier};
