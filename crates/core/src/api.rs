//! Query layer shared by the REST server and the CLI.
//!
//! Prices come from fresh cache, then the oracle, then the stale cache,
//! then the bundled fixture. With no prices at all, portfolio-shaped
//! queries answer from the fixture portfolio instead of failing.

use std::cmp::{Ordering, Reverse};
use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::{debug, warn};

use chainfolio_common::error::{FolioError, FolioResult};
use chainfolio_common::types::{
    Activity, ChainBreakdown, ChainPortfolio, DefiPosition, NetWorth, NftItem, PriceMap, Profile,
    TokenRow, WorthBreakdown,
};

use crate::aggregator::PortfolioAggregator;
use crate::fixtures;
use crate::price_cache::PriceService;

// ═══════════════════════════════════════════════════════════════════════
//  QUERY TYPES
// ═══════════════════════════════════════════════════════════════════════

/// Column a token table is sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    UsdValue,
    Balance,
    Price,
    Symbol,
}

impl FromStr for SortKey {
    type Err = FolioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "usdvalue" | "usd_value" | "value" => Ok(SortKey::UsdValue),
            "balance" => Ok(SortKey::Balance),
            "price" => Ok(SortKey::Price),
            "symbol" => Ok(SortKey::Symbol),
            other => Err(FolioError::InvalidQuery(format!(
                "unknown sortBy '{other}' (expected usdValue, balance, price or symbol)"
            ))),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortKey::UsdValue => write!(f, "usdValue"),
            SortKey::Balance => write!(f, "balance"),
            SortKey::Price => write!(f, "price"),
            SortKey::Symbol => write!(f, "symbol"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl FromStr for SortOrder {
    type Err = FolioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(FolioError::InvalidQuery(format!(
                "unknown order '{other}' (expected asc or desc)"
            ))),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Asc => write!(f, "asc"),
            SortOrder::Desc => write!(f, "desc"),
        }
    }
}

/// Filters and ordering for [`PortfolioApi::get_tokens`].
#[derive(Debug, Clone, Default)]
pub struct TokenQuery {
    /// `None` or `Some(0)` selects every chain.
    pub chain_id: Option<u64>,
    /// Applied after sorting.
    pub count: Option<usize>,
    pub sort_by: Option<SortKey>,
    /// Only meaningful with `sort_by`; defaults to descending.
    pub order: Option<SortOrder>,
}

/// Wallet balances plus the prices they were valued with.
struct Holdings {
    chains: Vec<ChainPortfolio>,
    prices: PriceMap,
}

// ═══════════════════════════════════════════════════════════════════════
//  API
// ═══════════════════════════════════════════════════════════════════════

pub struct PortfolioApi {
    prices: PriceService,
    aggregator: PortfolioAggregator,
    default_address: String,
    fixture_prices: bool,
}

impl PortfolioApi {
    pub fn new(prices: PriceService, aggregator: PortfolioAggregator, default_address: impl Into<String>) -> Self {
        Self {
            prices,
            aggregator,
            default_address: default_address.into(),
            fixture_prices: true,
        }
    }

    /// Disable the bundled price list as the last price source.
    pub fn without_fixture_prices(mut self) -> Self {
        self.fixture_prices = false;
        self
    }

    pub fn price_service(&self) -> &PriceService {
        &self.prices
    }

    pub fn default_address(&self) -> &str {
        &self.default_address
    }

    /// The requested address, or the default when absent or blank.
    pub fn resolve_address<'a>(&'a self, address: Option<&'a str>) -> &'a str {
        match address.map(str::trim) {
            Some(a) if !a.is_empty() => a,
            _ => &self.default_address,
        }
    }

    pub async fn get_prices(&self) -> FolioResult<PriceMap> {
        match self.prices.get_prices().await {
            Ok(prices) => Ok(prices),
            Err(e) if self.fixture_prices => {
                warn!(error = %e, "no live or cached prices, serving bundled prices");
                fixtures::prices().map_err(|fixture_err| {
                    warn!(error = %fixture_err, "bundled prices unreadable");
                    e
                })
            }
            Err(e) => Err(e),
        }
    }

    pub async fn get_portfolio(&self, address: Option<&str>, chain_id: Option<u64>) -> FolioResult<Vec<ChainPortfolio>> {
        let holdings = self.holdings(address).await?;
        Ok(holdings
            .chains
            .into_iter()
            .filter(|c| chain_selected(chain_id, c.chain_id))
            .collect())
    }

    /// Flattened non-zero holdings, native balance first within each chain.
    pub async fn get_tokens(&self, address: Option<&str>, query: &TokenQuery) -> FolioResult<Vec<TokenRow>> {
        let holdings = self.holdings(address).await?;
        let mut rows = token_rows(&holdings, query.chain_id);

        if let Some(key) = query.sort_by {
            sort_rows(&mut rows, key, query.order.unwrap_or_default());
        }
        if let Some(count) = query.count {
            rows.truncate(count);
        }
        Ok(rows)
    }

    pub async fn get_profile(&self, address: Option<&str>) -> FolioResult<Profile> {
        let address = self.resolve_address(address).to_string();
        let info = fixtures::profile_info()?;
        let holdings = self.holdings(Some(&address)).await?;
        Ok(Profile {
            address,
            info,
            net_worth: net_worth(&holdings),
        })
    }

    /// NFT ingestion is not wired up; always empty.
    pub fn get_nfts(&self, address: Option<&str>, chain_id: Option<u64>) -> Vec<NftItem> {
        debug!(address = self.resolve_address(address), ?chain_id, "nfts requested");
        Vec::new()
    }

    /// DeFi ingestion is not wired up; always empty.
    pub fn get_defi(&self, address: Option<&str>, chain_id: Option<u64>) -> Vec<DefiPosition> {
        debug!(address = self.resolve_address(address), ?chain_id, "defi positions requested");
        Vec::new()
    }

    /// Bundled activity history, newest first.
    pub fn get_activities(
        &self,
        address: Option<&str>,
        chain_id: Option<u64>,
        limit: Option<usize>,
    ) -> FolioResult<Vec<Activity>> {
        debug!(address = self.resolve_address(address), ?chain_id, ?limit, "activities requested");
        let mut activities: Vec<Activity> = fixtures::activities()?
            .into_iter()
            .filter(|a| chain_selected(chain_id, a.chain.id))
            .collect();
        activities.sort_by_key(|a| Reverse(DateTime::parse_from_rfc3339(&a.timestamp).ok()));
        if let Some(limit) = limit {
            activities.truncate(limit);
        }
        Ok(activities)
    }

    async fn holdings(&self, address: Option<&str>) -> FolioResult<Holdings> {
        let address = self.resolve_address(address);
        match self.get_prices().await {
            Ok(prices) => {
                let fetch = self.aggregator.fetch_wallet_portfolio(address, &prices).await;
                if !fetch.warnings.is_empty() {
                    debug!(address, degraded_reads = fetch.warnings.len(), "portfolio has zeroed reads");
                }
                Ok(Holdings {
                    chains: fetch.chains,
                    prices,
                })
            }
            Err(e) => {
                warn!(address, error = %e, "prices unavailable, serving bundled portfolio");
                Ok(Holdings {
                    chains: fixtures::portfolio()?,
                    prices: PriceMap::new(),
                })
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  SHAPING
// ═══════════════════════════════════════════════════════════════════════

/// `None` and `0` select every chain.
fn chain_selected(filter: Option<u64>, chain_id: u64) -> bool {
    match filter {
        None | Some(0) => true,
        Some(id) => id == chain_id,
    }
}

fn token_rows(holdings: &Holdings, chain_id: Option<u64>) -> Vec<TokenRow> {
    let price_of = |symbol: &str| {
        holdings
            .prices
            .get(symbol)
            .map(|p| p.usd)
            .unwrap_or_default()
    };

    let mut rows = Vec::new();
    for chain in holdings
        .chains
        .iter()
        .filter(|c| chain_selected(chain_id, c.chain_id))
    {
        if chain.balance > Decimal::ZERO {
            rows.push(TokenRow {
                chain: chain.chain.clone(),
                chain_id: chain.chain_id,
                chain_icon: chain.icon.clone(),
                symbol: chain.symbol.clone(),
                balance: chain.balance,
                price: price_of(&chain.symbol),
                usd_value: chain.usd_value,
                icon: chain.icon.clone(),
            });
        }
        for asset in &chain.assets {
            rows.push(TokenRow {
                chain: chain.chain.clone(),
                chain_id: chain.chain_id,
                chain_icon: chain.icon.clone(),
                symbol: asset.symbol.clone(),
                balance: asset.balance,
                price: price_of(&asset.symbol),
                usd_value: asset.usd_value,
                icon: asset.icon.clone(),
            });
        }
    }
    rows
}

/// Stable: rows with equal keys keep their relative order in either direction.
fn sort_rows(rows: &mut [TokenRow], key: SortKey, order: SortOrder) {
    let compare = |a: &TokenRow, b: &TokenRow| -> Ordering {
        match key {
            SortKey::UsdValue => a.usd_value.cmp(&b.usd_value),
            SortKey::Balance => a.balance.cmp(&b.balance),
            SortKey::Price => a.price.cmp(&b.price),
            SortKey::Symbol => a.symbol.cmp(&b.symbol),
        }
    };
    match order {
        SortOrder::Asc => rows.sort_by(compare),
        SortOrder::Desc => rows.sort_by(|a, b| compare(b, a)),
    }
}

fn net_worth(holdings: &Holdings) -> NetWorth {
    let mut total = Decimal::ZERO;
    let mut weighted_change = Decimal::ZERO;
    let mut chains = Vec::with_capacity(holdings.chains.len());

    for chain in &holdings.chains {
        let mut chain_total = Decimal::ZERO;
        let positions = std::iter::once((chain.symbol.as_str(), chain.usd_value))
            .chain(chain.assets.iter().map(|a| (a.symbol.as_str(), a.usd_value)));
        for (symbol, usd) in positions {
            chain_total = chain_total.saturating_add(usd);
            if let Some(price) = holdings.prices.get(symbol) {
                weighted_change = weighted_change.saturating_add(usd.saturating_mul(price.change24h));
            }
        }
        total = total.saturating_add(chain_total);
        chains.push(ChainBreakdown {
            chain_id: chain.chain_id,
            tokens: chain_total,
            defi: Decimal::ZERO,
            nfts: Decimal::ZERO,
        });
    }

    let change_percent = weighted_change
        .checked_div(total)
        .unwrap_or_default()
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

    NetWorth {
        usd: total,
        change_percent,
        breakdown: WorthBreakdown {
            tokens: total,
            defi: Decimal::ZERO,
            nfts: Decimal::ZERO,
        },
        chains,
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  TESTS
// ═══════════════════════════════════════════════════════════════════════
