//! Portfolio API routes.
//!
//! GET /api/profile?address=
//! GET /api/portfolio?address=&chainId=
//! GET /api/prices
//! GET /api/tokens?address=&chainId=&count=&sortBy=&order=
//! GET /api/nfts?address=&chainId=
//! GET /api/defi?address=&chainId=
//! GET /api/activities?address=&chainId=&limit=

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    routing::get,
};
use serde::Deserialize;

use chainfolio_common::error::FolioError;
use chainfolio_common::types::{
    Activity, ChainPortfolio, DefiPosition, NftItem, PriceMap, Profile, TokenRow,
};
use chainfolio_core::{SortKey, SortOrder, TokenQuery};

use crate::error::ApiError;
use crate::state::AppState;

type ApiResult<T> = Result<Json<T>, ApiError>;

// ── Query Params ────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct AddressQuery {
    address: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletQuery {
    address: Option<String>,
    /// 0 or absent = all chains
    chain_id: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokensQuery {
    address: Option<String>,
    chain_id: Option<u64>,
    count: Option<usize>,
    /// usdValue | balance | price | symbol
    sort_by: Option<String>,
    /// asc | desc
    order: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivitiesQuery {
    address: Option<String>,
    chain_id: Option<u64>,
    limit: Option<usize>,
}

impl TokensQuery {
    fn to_token_query(&self) -> Result<TokenQuery, FolioError> {
        Ok(TokenQuery {
            chain_id: self.chain_id,
            count: self.count,
            sort_by: non_empty(&self.sort_by).map(str::parse::<SortKey>).transpose()?,
            order: non_empty(&self.order).map(str::parse::<SortOrder>).transpose()?,
        })
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/profile", get(get_profile))
        .route("/portfolio", get(get_portfolio))
        .route("/prices", get(get_prices))
        .route("/tokens", get(get_tokens))
        .route("/nfts", get(get_nfts))
        .route("/defi", get(get_defi))
        .route("/activities", get(get_activities))
}

// ── Handlers ────────────────────────────────────────────────────────

/// GET /api/profile?address=0x...
async fn get_profile(
    State(state): State<Arc<AppState>>,
    query: Result<Query<AddressQuery>, QueryRejection>,
) -> ApiResult<Profile> {
    let Query(q) = query?;
    Ok(Json(state.api.get_profile(q.address.as_deref()).await?))
}

/// GET /api/portfolio?address=0x...&chainId=56
async fn get_portfolio(
    State(state): State<Arc<AppState>>,
    query: Result<Query<WalletQuery>, QueryRejection>,
) -> ApiResult<Vec<ChainPortfolio>> {
    let Query(q) = query?;
    Ok(Json(state.api.get_portfolio(q.address.as_deref(), q.chain_id).await?))
}

/// GET /api/prices
async fn get_prices(State(state): State<Arc<AppState>>) -> ApiResult<PriceMap> {
    Ok(Json(state.api.get_prices().await?))
}

/// GET /api/tokens?address=0x...&chainId=1&count=10&sortBy=usdValue&order=desc
async fn get_tokens(
    State(state): State<Arc<AppState>>,
    query: Result<Query<TokensQuery>, QueryRejection>,
) -> ApiResult<Vec<TokenRow>> {
    let Query(q) = query?;
    let token_query = q.to_token_query()?;
    Ok(Json(state.api.get_tokens(q.address.as_deref(), &token_query).await?))
}

/// GET /api/nfts?address=0x...&chainId=1
async fn get_nfts(
    State(state): State<Arc<AppState>>,
    query: Result<Query<WalletQuery>, QueryRejection>,
) -> ApiResult<Vec<NftItem>> {
    let Query(q) = query?;
    Ok(Json(state.api.get_nfts(q.address.as_deref(), q.chain_id)))
}

/// GET /api/defi?address=0x...&chainId=1
async fn get_defi(
    State(state): State<Arc<AppState>>,
    query: Result<Query<WalletQuery>, QueryRejection>,
) -> ApiResult<Vec<DefiPosition>> {
    let Query(q) = query?;
    Ok(Json(state.api.get_defi(q.address.as_deref(), q.chain_id)))
}

/// GET /api/activities?address=0x...&chainId=1&limit=5
async fn get_activities(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ActivitiesQuery>, QueryRejection>,
) -> ApiResult<Vec<Activity>> {
    let Query(q) = query?;
    Ok(Json(state.api.get_activities(q.address.as_deref(), q.chain_id, q.limit)?))
}
