// Structured output types for JSON/table rendering.
//
// Every data-producing command returns one of these types.
// They all derive `Serialize` for JSON output, and implement
// `TableDisplay` for human-readable table rendering.

use serde::Serialize;

use chainfolio_common::types::{Activity, ChainPortfolio, PriceMap, Profile, TokenRow};

use crate::config::AppConfig;
use crate::fmt::{
    format_amount, format_change_pct, format_usd, format_usd_full, truncate_address, truncate_str,
};

// ─── Prices ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct PricesOutput {
    pub prices: PriceMap,
}

// ─── Portfolio ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioOutput {
    pub address: String,
    pub chains: Vec<ChainPortfolio>,
}

// ─── Tokens ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct TokensOutput {
    pub address: String,
    pub tokens: Vec<TokenRow>,
}

// ─── Profile ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct ProfileOutput {
    #[serde(flatten)]
    pub profile: Profile,
}

// ─── Activities ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct ActivitiesOutput {
    pub activities: Vec<Activity>,
}

// ─── Config ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct ConfigOutput {
    pub path: String,
    pub config: AppConfig,
}

// Unified output rendering: JSON or human-readable table.
//
// Usage:
// ```ignore
// use crate::output::{OutputFormat, render};
//
// let data = PricesOutput { ... };
// render(format, &data)?;
// ```

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table (default).
    Table,
    /// Compact JSON (for piping to jq, scripts).
    Json,
    /// Pretty-printed JSON (for reading).
    JsonPretty,
}

/// Types that can render as a human-readable table.
pub trait TableDisplay {
    fn table_lines(&self) -> Vec<String>;

    fn print_table(&self) {
        for line in self.table_lines() {
            println!("{line}");
        }
    }
}

/// Envelope for JSON output: `{"ok":true,"data":...}` or `{"ok":false,"error":...}`.
#[derive(Serialize)]
pub struct ApiResponse<T> {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<serde_json::Value>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn failure(code: &str, message: &str) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(serde_json::json!({ "code": code, "message": message })),
        }
    }
}

/// Serialize without printing.
pub fn to_json<T: Serialize>(format: OutputFormat, response: &ApiResponse<T>) -> anyhow::Result<String> {
    Ok(match format {
        OutputFormat::JsonPretty => serde_json::to_string_pretty(response)?,
        _ => serde_json::to_string(response)?,
    })
}

/// Render structured output: JSON envelope or table depending on format.
pub fn render<T: Serialize + TableDisplay>(format: OutputFormat, data: &T) -> anyhow::Result<()> {
    match format {
        OutputFormat::Table => {
            data.print_table();
            Ok(())
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            println!("{}", to_json(format, &ApiResponse::success(data))?);
            Ok(())
        }
    }
}

/// Render an error in the requested format.
pub fn render_error(format: OutputFormat, code: &str, message: &str) -> anyhow::Result<()> {
    match format {
        OutputFormat::Table => eprintln!("Error: {message}"),
        OutputFormat::Json | OutputFormat::JsonPretty => {
            println!("{}", to_json(format, &ApiResponse::failure(code, message))?);
        }
    }
    Ok(())
}

// ─── TableDisplay implementations for output types ──────────────────

impl TableDisplay for PricesOutput {
    fn table_lines(&self) -> Vec<String> {
        if self.prices.is_empty() {
            return vec!["No prices available.".into()];
        }
        let mut lines = vec![
            "┌────────┬──────────────────┬──────────┐".to_string(),
            "│ Symbol │ Price            │ 24h      │".to_string(),
            "├────────┼──────────────────┼──────────┤".to_string(),
        ];
        for (symbol, price) in &self.prices {
            lines.push(format!(
                "│ {:<6} │ {:>16} │ {:>8} │",
                truncate_str(symbol, 6),
                format_usd_full(price.usd),
                format_change_pct(price.change24h),
            ));
        }
        lines.push("└────────┴──────────────────┴──────────┘".into());
        lines
    }
}

impl TableDisplay for PortfolioOutput {
    fn table_lines(&self) -> Vec<String> {
        let mut lines = vec![format!("Wallet {}", truncate_address(&self.address))];
        if self.chains.is_empty() {
            lines.push("No chains matched.".into());
            return lines;
        }
        for chain in &self.chains {
            lines.push(String::new());
            lines.push(format!(
                "{} ({})  total {}",
                chain.chain,
                chain.chain_id,
                format_usd_full(chain.total_usd())
            ));
            lines.push(format!(
                "  {:<6} {:>18} {:>14}",
                chain.symbol,
                format_amount(chain.balance),
                format_usd_full(chain.usd_value)
            ));
            for asset in &chain.assets {
                lines.push(format!(
                    "  {:<6} {:>18} {:>14}",
                    truncate_str(&asset.symbol, 6),
                    format_amount(asset.balance),
                    format_usd_full(asset.usd_value)
                ));
            }
        }
        lines
    }
}

impl TableDisplay for TokensOutput {
    fn table_lines(&self) -> Vec<String> {
        if self.tokens.is_empty() {
            return vec![format!("No token holdings for {}.", truncate_address(&self.address))];
        }
        let mut lines = vec![
            "┌──────────────────────┬────────┬────────────────────┬────────────────┬────────────────┐".to_string(),
            "│ Chain                │ Symbol │ Balance            │ Price          │ Value          │".to_string(),
            "├──────────────────────┼────────┼────────────────────┼────────────────┼────────────────┤".to_string(),
        ];
        for row in &self.tokens {
            lines.push(format!(
                "│ {:<20} │ {:<6} │ {:>18} │ {:>14} │ {:>14} │",
                truncate_str(&row.chain, 20),
                truncate_str(&row.symbol, 6),
                format_amount(row.balance),
                format_usd_full(row.price),
                format_usd_full(row.usd_value),
            ));
        }
        lines.push(
            "└──────────────────────┴────────┴────────────────────┴────────────────┴────────────────┘".into(),
        );
        lines
    }
}

impl TableDisplay for ProfileOutput {
    fn table_lines(&self) -> Vec<String> {
        let p = &self.profile;
        let dash = "—";
        let worth = &p.net_worth;
        let mut lines = vec![
            format!("Name      : {}", p.info.ens.as_deref().unwrap_or(&p.info.display_name)),
            format!("Address   : {}", p.address),
            format!("Bio       : {}", p.info.bio.as_deref().unwrap_or(dash)),
            format!("Followers : {}   Following: {}", p.info.followers, p.info.following),
            format!("Earnings  : {}", format_usd_full(p.info.earnings)),
            format!(
                "Net worth : {} ({})",
                format_usd_full(worth.usd),
                format_change_pct(worth.change_percent)
            ),
            format!(
                "  tokens {}  defi {}  nfts {}",
                format_usd(worth.breakdown.tokens),
                format_usd(worth.breakdown.defi),
                format_usd(worth.breakdown.nfts)
            ),
        ];
        for chain in &worth.chains {
            lines.push(format!("  chain {:<6} {:>14}", chain.chain_id, format_usd_full(chain.tokens)));
        }
        lines
    }
}

impl TableDisplay for ActivitiesOutput {
    fn table_lines(&self) -> Vec<String> {
        if self.activities.is_empty() {
            return vec!["No activity.".into()];
        }
        self.activities
            .iter()
            .map(|a| {
                let who = a
                    .user
                    .ens
                    .clone()
                    .unwrap_or_else(|| truncate_address(&a.user.address));
                format!(
                    "{}  {:<20}  {:<14}  {} {}  {}",
                    a.timestamp,
                    truncate_str(&a.chain.name, 20),
                    who,
                    a.action,
                    a.details,
                    truncate_address(&a.tx_hash)
                )
            })
            .collect()
    }
}

impl TableDisplay for ConfigOutput {
    fn table_lines(&self) -> Vec<String> {
        let c = &self.config;
        let mut lines = vec![
            format!("Config file     : {}", self.path),
            format!("Default address : {}", c.general.default_address),
            format!("Verbose         : {}", c.general.verbose),
            format!("Server bind     : {}", c.server.bind),
            format!(
                "Prices          : {} tier, ttl {}s, timeout {}s, key {}",
                c.prices.tier,
                c.prices.cache_ttl_secs,
                c.prices.timeout_secs,
                if c.prices.api_key.is_some() { "set" } else { "unset" }
            ),
            format!("RPC timeout     : {}s", c.rpc.timeout_secs),
        ];
        for chain in c.chains() {
            lines.push(format!("  {:<6} {:<20} {}", chain.chain_id, chain.name, chain.rpc_url));
        }
        lines
    }
}
