//! JSON-RPC client for EVM chains.
//!
//! One client serves every chain: the endpoint comes from the
//! [`ChainConfig`] passed to each call. No retries; callers decide how a
//! failed read degrades.

use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use alloy::primitives::{Address, Bytes, U256};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use chainfolio_common::error::{FolioError, FolioResult};
use chainfolio_common::traits::ChainReader;
use chainfolio_common::types::ChainConfig;

use crate::erc20;

/// EVM JSON-RPC client.
pub struct EvmRpcClient {
    http: Client,
    next_id: AtomicU64,
}

// ── JSON-RPC Types ──────────────────────────────────────────────────

#[derive(Serialize)]
struct JsonRpcRequest<'a, T: Serialize> {
    jsonrpc: &'a str,
    method: &'a str,
    params: T,
    id: u64,
}

#[derive(Deserialize, Debug)]
pub struct JsonRpcResponse<T> {
    pub result: Option<T>,
    pub error: Option<JsonRpcError>,
}

#[derive(Deserialize, Debug)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
}

#[derive(Serialize)]
struct CallRequest {
    to: String,
    data: String,
}

impl EvmRpcClient {
    /// Create a client whose HTTP requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Self {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            http,
            next_id: AtomicU64::new(1),
        }
    }

    /// Request envelope carrying the next request id.
    fn request<'a, P: Serialize>(&self, method: &'a str, params: P) -> JsonRpcRequest<'a, P> {
        JsonRpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Execute a JSON-RPC call against the chain's endpoint.
    async fn rpc_call<P: Serialize, R: for<'de> Deserialize<'de>>(
        &self,
        chain: &ChainConfig,
        method: &str,
        params: P,
    ) -> FolioResult<R> {
        let body = self.request(method, params);

        let resp = self
            .http
            .post(&chain.rpc_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| rpc_error(chain, format!("{method} request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(rpc_error(chain, format!("{method} HTTP {status}: {text}")));
        }

        let result: JsonRpcResponse<R> = resp
            .json()
            .await
            .map_err(|e| rpc_error(chain, format!("{method} response: {e}")))?;

        into_result(chain, method, result)
    }

    /// `eth_getBalance(owner, "latest")`.
    pub async fn get_balance(&self, chain: &ChainConfig, owner: Address) -> FolioResult<U256> {
        let hex: String = self
            .rpc_call(chain, "eth_getBalance", (owner.to_string(), "latest"))
            .await?;
        parse_quantity(chain, &hex)
    }

    /// `eth_call({to, data}, "latest")`, returning the raw return data.
    pub async fn eth_call(&self, chain: &ChainConfig, to: Address, data: Bytes) -> FolioResult<Bytes> {
        let call = CallRequest {
            to: to.to_string(),
            data: alloy::primitives::hex::encode_prefixed(&data),
        };
        let hex: String = self.rpc_call(chain, "eth_call", (call, "latest")).await?;
        alloy::primitives::hex::decode(&hex)
            .map(Bytes::from)
            .map_err(|e| rpc_error(chain, format!("eth_call returned bad hex: {e}")))
    }
}

#[async_trait]
impl ChainReader for EvmRpcClient {
    async fn native_balance(&self, chain: &ChainConfig, owner: Address) -> FolioResult<U256> {
        debug!(chain_id = chain.chain_id, %owner, "eth_getBalance");
        self.get_balance(chain, owner).await
    }

    async fn erc20_balance(
        &self,
        chain: &ChainConfig,
        token: Address,
        owner: Address,
    ) -> FolioResult<U256> {
        let data = self.eth_call(chain, token, erc20::balance_of_calldata(owner)).await?;
        erc20::decode_balance(&data)
            .map_err(|e| rpc_error(chain, format!("decode balanceOf from {token}: {e}")))
    }

    async fn erc20_decimals(&self, chain: &ChainConfig, token: Address) -> FolioResult<u8> {
        let data = self.eth_call(chain, token, erc20::decimals_calldata()).await?;
        erc20::decode_decimals(&data)
            .map_err(|e| rpc_error(chain, format!("decode decimals from {token}: {e}")))
    }
}

fn rpc_error(chain: &ChainConfig, message: String) -> FolioError {
    FolioError::Rpc {
        chain_id: chain.chain_id,
        message,
    }
}

fn into_result<R>(chain: &ChainConfig, method: &str, resp: JsonRpcResponse<R>) -> FolioResult<R> {
    if let Some(err) = resp.error {
        return Err(rpc_error(chain, format!("{method} error {}: {}", err.code, err.message)));
    }
    resp.result
        .ok_or_else(|| rpc_error(chain, format!("{method} returned null result")))
}

/// Parse a JSON-RPC hex quantity (`"0x1bc16d674ec80000"`).
fn parse_quantity(chain: &ChainConfig, hex: &str) -> FolioResult<U256> {
    U256::from_str(hex).map_err(|e| rpc_error(chain, format!("bad quantity {hex}: {e}")))
}
