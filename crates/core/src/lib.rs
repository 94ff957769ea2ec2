pub mod aggregator;
pub mod api;
pub mod config;
pub mod factory;
pub mod fixtures;
pub mod fmt;
pub mod output;
pub mod price_cache;
pub mod units;
pub mod workspace;

pub use aggregator::PortfolioAggregator;
pub use api::{PortfolioApi, SortKey, SortOrder, TokenQuery};
pub use config::AppConfig;
pub use price_cache::{Clock, PriceCache, PriceService, SystemClock};
pub use workspace::init_workspace;
