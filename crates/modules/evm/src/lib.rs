//! EVM JSON-RPC balance reader for Chainfolio.
//!
//! Talks plain JSON-RPC over HTTP (`eth_getBalance`, `eth_call`); ABI
//! encoding and decoding come from alloy's `sol!` bindings.

pub mod client;
pub mod erc20;

pub use client::EvmRpcClient;
