//! USD price cache: one snapshot slot with time-based expiry.
//!
//! [`PriceCache`] is the slot itself: no I/O, time supplied by the caller.
//! [`PriceService`] drives it with an injected [`PriceOracle`] and
//! [`Clock`]:
//!
//! 1. fresh snapshot → served without a network call
//! 2. otherwise one batched oracle request for every registered id
//! 3. oracle failure → previous snapshot (any age), else the error

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, warn};

use chainfolio_common::constants::PRICE_IDS;
use chainfolio_common::error::FolioResult;
use chainfolio_common::traits::PriceOracle;
use chainfolio_common::types::{OracleQuote, PriceMap, TokenPrice};

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Prices as fetched at `timestamp`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSnapshot {
    pub data: PriceMap,
    pub timestamp: DateTime<Utc>,
}

impl PriceSnapshot {
    /// A snapshot stamped in the future (clock skew) counts as fresh.
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        match now.signed_duration_since(self.timestamp).to_std() {
            Ok(age) => age < ttl,
            Err(_) => true,
        }
    }
}

/// Single-slot price cache.
pub struct PriceCache {
    slot: RwLock<Option<PriceSnapshot>>,
    ttl: Duration,
}

impl PriceCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            slot: RwLock::new(None),
            ttl,
        }
    }

    /// The snapshot if it is younger than the TTL at `now`.
    pub fn get(&self, now: DateTime<Utc>) -> Option<PriceSnapshot> {
        self.latest().filter(|s| s.is_fresh(now, self.ttl))
    }

    /// The snapshot regardless of age.
    pub fn latest(&self) -> Option<PriceSnapshot> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the slot. Timestamps never move backwards.
    pub fn set(&self, now: DateTime<Utc>, data: PriceMap) -> PriceSnapshot {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        let timestamp = match slot.as_ref() {
            Some(prev) if prev.timestamp > now => prev.timestamp,
            _ => now,
        };
        let snapshot = PriceSnapshot { data, timestamp };
        *slot = Some(snapshot.clone());
        snapshot
    }

    pub fn clear(&self) {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

/// Cached access to the price oracle for a fixed symbol registry.
pub struct PriceService {
    cache: PriceCache,
    oracle: Arc<dyn PriceOracle>,
    clock: Arc<dyn Clock>,
    registry: Vec<(String, String)>,
}

impl PriceService {
    /// Service over the default registry, using wall-clock time.
    pub fn new(oracle: Arc<dyn PriceOracle>, ttl: Duration) -> Self {
        Self {
            cache: PriceCache::new(ttl),
            oracle,
            clock: Arc::new(SystemClock),
            registry: PRICE_IDS
                .iter()
                .map(|(symbol, id)| (symbol.to_string(), id.to_string()))
                .collect(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the `symbol → oracle id` registry.
    pub fn with_registry(mut self, registry: &[(&str, &str)]) -> Self {
        self.registry = registry
            .iter()
            .map(|(symbol, id)| (symbol.to_string(), id.to_string()))
            .collect();
        self
    }

    pub fn cache(&self) -> &PriceCache {
        &self.cache
    }

    /// Prices keyed by registry symbol.
    pub async fn get_prices(&self) -> FolioResult<PriceMap> {
        Ok(self.get_snapshot().await?.data)
    }

    /// Like [`get_prices`](Self::get_prices), keeping the fetch timestamp.
    pub async fn get_snapshot(&self) -> FolioResult<PriceSnapshot> {
        let now = self.clock.now();
        if let Some(snapshot) = self.cache.get(now) {
            debug!("returning cached prices");
            return Ok(snapshot);
        }

        info!(source = self.oracle.name(), "fetching fresh prices");
        let ids: Vec<&str> = self.registry.iter().map(|(_, id)| id.as_str()).collect();

        match self.oracle.simple_prices(&ids).await {
            Ok(quotes) => {
                let data = self.to_price_map(&quotes);
                Ok(self.cache.set(self.clock.now(), data))
            }
            Err(e) => match self.cache.latest() {
                Some(stale) => {
                    warn!(
                        source = self.oracle.name(),
                        error = %e,
                        fetched_at = %stale.timestamp,
                        "price fetch failed, returning stale cached prices"
                    );
                    Ok(stale)
                }
                None => {
                    warn!(source = self.oracle.name(), error = %e, "price fetch failed with empty cache");
                    Err(e)
                }
            },
        }
    }

    /// Price for one symbol, if the oracle knows it.
    pub async fn get_token_price(&self, symbol: &str) -> FolioResult<Option<TokenPrice>> {
        Ok(self.get_prices().await?.get(symbol).copied())
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Re-key oracle quotes by registry symbol, dropping ids without a USD price.
    fn to_price_map(&self, quotes: &std::collections::HashMap<String, OracleQuote>) -> PriceMap {
        self.registry
            .iter()
            .filter_map(|(symbol, id)| {
                let quote = quotes.get(id)?;
                let usd = quote.usd.and_then(Decimal::from_f64)?;
                let change24h = quote
                    .usd_24h_change
                    .and_then(Decimal::from_f64)
                    .unwrap_or_default();
                Some((symbol.clone(), TokenPrice { usd, change24h }))
            })
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chainfolio_common::error::FolioError;

    /// Clock that only moves when told to.
    pub(crate) struct ManualClock(Mutex<DateTime<Utc>>);

    impl ManualClock {
        pub(crate) fn new() -> Self {
            Self(Mutex::new(Utc::now()))
        }

        pub(crate) fn advance(&self, secs: i64) {
            *self.0.lock().unwrap() += chrono::Duration::seconds(secs);
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock().unwrap()
        }
    }

    /// Oracle returning fixed quotes, counting calls, optionally failing.
    pub(crate) struct StubOracle {
        pub(crate) quotes: Mutex<HashMap<String, OracleQuote>>,
        pub(crate) calls: AtomicUsize,
        pub(crate) failing: AtomicBool,
    }

    impl StubOracle {
        pub(crate) fn new(quotes: &[(&str, f64, f64)]) -> Self {
            let quotes = quotes
                .iter()
                .map(|(id, usd, chg)| {
                    (
                        id.to_string(),
                        OracleQuote { usd: Some(*usd), usd_24h_change: Some(*chg) },
                    )
                })
                .collect();
            Self {
                quotes: Mutex::new(quotes),
                calls: AtomicUsize::new(0),
                failing: AtomicBool::new(false),
            }
        }

        pub(crate) fn failing() -> Self {
            let oracle = Self::new(&[]);
            oracle.failing.store(true, Ordering::SeqCst);
            oracle
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PriceOracle for StubOracle {
        fn name(&self) -> &str {
            "stub"
        }

        async fn simple_prices(&self, _ids: &[&str]) -> FolioResult<HashMap<String, OracleQuote>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.failing.load(Ordering::SeqCst) {
                return Err(FolioError::Oracle("HTTP 503".into()));
            }
            Ok(self.quotes.lock().unwrap().clone())
        }
    }

    fn service(oracle: Arc<StubOracle>, clock: Arc<ManualClock>) -> PriceService {
        PriceService::new(oracle, Duration::from_secs(60)).with_clock(clock)
    }

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_cache_get_respects_ttl() {
        let cache = PriceCache::new(Duration::from_secs(60));
        let t0 = Utc::now();
        assert!(cache.get(t0).is_none());

        cache.set(t0, PriceMap::new());
        assert!(cache.get(t0 + chrono::Duration::seconds(59)).is_some());
        assert!(cache.get(t0 + chrono::Duration::seconds(60)).is_none());
        // Expired snapshots stay reachable for fallback.
        assert!(cache.latest().is_some());
    }

    #[test]
    fn test_cache_timestamp_monotonic() {
        let cache = PriceCache::new(Duration::from_secs(60));
        let t0 = Utc::now();
        cache.set(t0, PriceMap::new());
        let snap = cache.set(t0 - chrono::Duration::seconds(5), PriceMap::new());
        assert_eq!(snap.timestamp, t0);
    }

    #[test]
    fn test_cache_clear() {
        let cache = PriceCache::new(Duration::from_secs(60));
        cache.set(Utc::now(), PriceMap::new());
        cache.clear();
        assert!(cache.latest().is_none());
    }

    #[tokio::test]
    async fn test_second_call_within_ttl_hits_cache() {
        let oracle = Arc::new(StubOracle::new(&[("ethereum", 2000.0, 1.5)]));
        let clock = Arc::new(ManualClock::new());
        let svc = service(oracle.clone(), clock.clone());

        let first = svc.get_prices().await.unwrap();
        clock.advance(30);
        let second = svc.get_prices().await.unwrap();

        assert_eq!(oracle.calls(), 1);
        assert_eq!(first, second);
        assert_eq!(first["ETH"].usd, d("2000"));
        assert_eq!(first["ETH"].change24h, d("1.5"));
    }

    #[tokio::test]
    async fn test_expired_cache_refetches() {
        let oracle = Arc::new(StubOracle::new(&[("ethereum", 2000.0, 0.0)]));
        let clock = Arc::new(ManualClock::new());
        let svc = service(oracle.clone(), clock.clone());

        svc.get_prices().await.unwrap();
        clock.advance(61);
        svc.get_prices().await.unwrap();
        assert_eq!(oracle.calls(), 2);
    }

    #[tokio::test]
    async fn test_failure_after_success_returns_stale_unchanged() {
        let oracle = Arc::new(StubOracle::new(&[("ethereum", 2000.0, 0.0)]));
        let clock = Arc::new(ManualClock::new());
        let svc = service(oracle.clone(), clock.clone());

        let fresh = svc.get_snapshot().await.unwrap();
        oracle.failing.store(true, Ordering::SeqCst);
        clock.advance(120);

        let stale = svc.get_snapshot().await.unwrap();
        assert_eq!(stale, fresh);
        assert_eq!(svc.cache().latest().unwrap().timestamp, fresh.timestamp);
        assert_eq!(oracle.calls(), 2);
    }

    #[tokio::test]
    async fn test_cold_start_failure_is_error() {
        let oracle = Arc::new(StubOracle::failing());
        let svc = service(oracle, Arc::new(ManualClock::new()));
        let err = svc.get_prices().await.unwrap_err();
        assert!(matches!(err, FolioError::Oracle(_)));
        assert!(svc.cache().latest().is_none());
    }

    #[tokio::test]
    async fn test_keys_by_symbol_and_skips_missing() {
        let oracle = Arc::new(StubOracle::new(&[("tether", 1.0, 0.01), ("unknown-coin", 5.0, 0.0)]));
        oracle.quotes.lock().unwrap().insert(
            "usd-coin".into(),
            OracleQuote { usd: None, usd_24h_change: Some(0.2) },
        );
        let svc = service(oracle, Arc::new(ManualClock::new()));

        let prices = svc.get_prices().await.unwrap();
        assert_eq!(prices.len(), 1);
        assert!(prices.contains_key("USDT"));
        assert!(!prices.contains_key("USDC"));
        assert!(!prices.contains_key("tether"));
    }

    #[tokio::test]
    async fn test_missing_change_defaults_to_zero() {
        let oracle = Arc::new(StubOracle::new(&[]));
        oracle.quotes.lock().unwrap().insert(
            "binancecoin".into(),
            OracleQuote { usd: Some(600.0), usd_24h_change: None },
        );
        let svc = service(oracle, Arc::new(ManualClock::new()));
        let bnb = svc.get_token_price("BNB").await.unwrap().unwrap();
        assert_eq!(bnb.usd, d("600"));
        assert_eq!(bnb.change24h, Decimal::ZERO);
        assert!(svc.get_token_price("DOGE").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_clear_cache_forces_refetch() {
        let oracle = Arc::new(StubOracle::new(&[("ethereum", 2000.0, 0.0)]));
        let svc = service(oracle.clone(), Arc::new(ManualClock::new()));
        svc.get_prices().await.unwrap();
        svc.clear_cache();
        svc.get_prices().await.unwrap();
        assert_eq!(oracle.calls(), 2);
    }

    #[tokio::test]
    async fn test_custom_registry() {
        let oracle = Arc::new(StubOracle::new(&[("bitcoin", 60000.0, 2.0)]));
        let svc = service(oracle, Arc::new(ManualClock::new())).with_registry(&[("BTC", "bitcoin")]);
        let prices = svc.get_prices().await.unwrap();
        assert_eq!(prices["BTC"].usd, d("60000"));
    }
}
