//! Read-only wallet queries: prices, portfolio, tokens, profile, activities.

use anyhow::Result;
use rust_decimal::Decimal;

use chainfolio_core::fmt::format_usd_full;
use chainfolio_core::output::{
    render, ActivitiesOutput, OutputFormat, PortfolioOutput, PricesOutput, ProfileOutput,
    TokensOutput,
};
use chainfolio_core::{PortfolioApi, TokenQuery};

/// `chainfolio prices`
pub async fn prices(api: &PortfolioApi, fmt: OutputFormat) -> Result<()> {
    let prices = api.get_prices().await?;
    render(fmt, &PricesOutput { prices })
}

/// `chainfolio portfolio [--address] [--chain]`
pub async fn portfolio(api: &PortfolioApi, address: Option<&str>, chain_id: Option<u64>, fmt: OutputFormat) -> Result<()> {
    let chains = api.get_portfolio(address, chain_id).await?;
    let output = PortfolioOutput {
        address: api.resolve_address(address).to_string(),
        chains,
    };
    render(fmt, &output)?;

    if fmt == OutputFormat::Table {
        let total: Decimal = output.chains.iter().map(|c| c.total_usd()).sum();
        println!();
        println!("Net worth: {}", format_usd_full(total));
    }
    Ok(())
}

/// `chainfolio tokens [--address] [--chain] [--count] [--sort-by] [--order]`
pub async fn tokens(api: &PortfolioApi, address: Option<&str>, query: &TokenQuery, fmt: OutputFormat) -> Result<()> {
    let tokens = api.get_tokens(address, query).await?;
    render(
        fmt,
        &TokensOutput {
            address: api.resolve_address(address).to_string(),
            tokens,
        },
    )
}

/// `chainfolio profile [--address]`
pub async fn profile(api: &PortfolioApi, address: Option<&str>, fmt: OutputFormat) -> Result<()> {
    let profile = api.get_profile(address).await?;
    render(fmt, &ProfileOutput { profile })
}

/// `chainfolio activities [--address] [--chain] [--limit]`
pub fn activities(
    api: &PortfolioApi,
    address: Option<&str>,
    chain_id: Option<u64>,
    limit: Option<usize>,
    fmt: OutputFormat,
) -> Result<()> {
    let activities = api.get_activities(address, chain_id, limit)?;
    render(fmt, &ActivitiesOutput { activities })
}
