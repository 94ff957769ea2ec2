//! Static dashboard data compiled into the binary.

use serde::de::DeserializeOwned;

use chainfolio_common::error::{FolioError, FolioResult};
use chainfolio_common::types::{Activity, ChainPortfolio, PriceMap, ProfileInfo};

const PROFILE: &str = include_str!("../fixtures/profile.json");
const PRICES: &str = include_str!("../fixtures/prices.json");
const PORTFOLIO: &str = include_str!("../fixtures/portfolio.json");
const ACTIVITIES: &str = include_str!("../fixtures/activities.json");

pub fn profile_info() -> FolioResult<ProfileInfo> {
    parse("profile.json", PROFILE)
}

/// Last-resort prices when neither the oracle nor the cache can answer.
pub fn prices() -> FolioResult<PriceMap> {
    parse("prices.json", PRICES)
}

/// Sample wallet served when no prices are available at all.
pub fn portfolio() -> FolioResult<Vec<ChainPortfolio>> {
    parse("portfolio.json", PORTFOLIO)
}

pub fn activities() -> FolioResult<Vec<Activity>> {
    parse("activities.json", ACTIVITIES)
}

fn parse<T: DeserializeOwned>(name: &str, raw: &str) -> FolioResult<T> {
    serde_json::from_str(raw).map_err(|e| FolioError::Fixture(format!("{name}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainfolio_common::constants::{PRICE_IDS, SUPPORTED_CHAINS};
    use chrono::DateTime;

    #[test]
    fn test_profile_parses() {
        let info = profile_info().unwrap();
        assert!(!info.display_name.is_empty());
        assert!(info.links.x.is_some());
    }

    #[test]
    fn test_prices_cover_registry() {
        let prices = prices().unwrap();
        for (symbol, _) in PRICE_IDS {
            assert!(prices.contains_key(*symbol), "missing fixture price for {symbol}");
        }
    }

    #[test]
    fn test_portfolio_matches_chain_registry() {
        let chains = portfolio().unwrap();
        let ids: Vec<u64> = chains.iter().map(|c| c.chain_id).collect();
        let expected: Vec<u64> = SUPPORTED_CHAINS.iter().map(|c| c.chain_id).collect();
        assert_eq!(ids, expected);
        assert!(chains
            .iter()
            .flat_map(|c| &c.assets)
            .all(|a| !a.balance.is_zero()));
    }

    #[test]
    fn test_activity_timestamps_are_rfc3339() {
        for activity in activities().unwrap() {
            assert!(
                DateTime::parse_from_rfc3339(&activity.timestamp).is_ok(),
                "{}",
                activity.timestamp
            );
        }
    }

    #[test]
    fn test_bad_fixture_is_fixture_error() {
        let err = parse::<PriceMap>("broken.json", "{").unwrap_err();
        assert!(matches!(err, FolioError::Fixture(ref m) if m.starts_with("broken.json")));
    }
}
