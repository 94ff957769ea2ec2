mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use chainfolio_common::error::FolioError;
use chainfolio_core::output::{render_error, OutputFormat};
use chainfolio_core::{SortKey, SortOrder, TokenQuery};

#[derive(Parser)]
#[command(
    name = "chainfolio",
    about = "Chainfolio: multi-chain wallet portfolio tracker.\nNative + ERC20 balances on Ethereum, BSC, Avalanche and Arbitrum, priced in USD.",
    version,
    propagate_version = true
)]
struct Cli {
    #[arg(long, short = 'o', global = true, default_value = "table")]
    output: CliOutputFormat,

    /// Debug-level logging (overridden by RUST_LOG).
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliOutputFormat { Table, Json, JsonPretty }

impl From<CliOutputFormat> for OutputFormat {
    fn from(f: CliOutputFormat) -> OutputFormat {
        match f {
            CliOutputFormat::Table => OutputFormat::Table,
            CliOutputFormat::Json => OutputFormat::Json,
            CliOutputFormat::JsonPretty => OutputFormat::JsonPretty,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  TOP-LEVEL
// ═══════════════════════════════════════════════════════════════════════

#[derive(Subcommand)]
enum Commands {
    /// USD prices and 24h change for every tracked token.
    Prices,

    /// Per-chain balances for a wallet.
    Portfolio {
        /// Wallet address (defaults to general.default_address).
        #[arg(long, short = 'a')]
        address: Option<String>,
        /// Restrict to one chain id (0 = all).
        #[arg(long, short = 'c')]
        chain: Option<u64>,
    },

    /// Flat token table across chains.
    Tokens {
        #[arg(long, short = 'a')]
        address: Option<String>,
        #[arg(long, short = 'c')]
        chain: Option<u64>,
        /// Keep only the first N rows after sorting.
        #[arg(long, short = 'n')]
        count: Option<usize>,
        /// usdValue, balance, price or symbol.
        #[arg(long)]
        sort_by: Option<SortKey>,
        /// asc or desc (default desc).
        #[arg(long)]
        order: Option<SortOrder>,
    },

    /// Profile card with net worth breakdown.
    Profile {
        #[arg(long, short = 'a')]
        address: Option<String>,
    },

    /// Recent wallet activity, newest first.
    Activities {
        #[arg(long, short = 'a')]
        address: Option<String>,
        #[arg(long, short = 'c')]
        chain: Option<u64>,
        #[arg(long, short = 'l')]
        limit: Option<usize>,
    },

    /// Inspect or initialise ~/.chainfolio/config.toml.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show the effective configuration.
    Show,
    /// Print the config file path.
    Path,
    /// Create the workspace and default config if missing.
    Init,
}

// ═══════════════════════════════════════════════════════════════════════
//  ENTRYPOINT
// ═══════════════════════════════════════════════════════════════════════

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let fmt: OutputFormat = cli.output.into();

    chainfolio_core::init_workspace()?;
    let mut config = chainfolio_core::workspace::load_config()?;
    config.apply_env();

    let default_level = if cli.verbose || config.general.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let api = chainfolio_core::factory::from_config(&config)?;

    let result = match cli.command {
        Commands::Prices => commands::portfolio::prices(&api, fmt).await,
        Commands::Portfolio { address, chain } => {
            commands::portfolio::portfolio(&api, address.as_deref(), chain, fmt).await
        }
        Commands::Tokens { address, chain, count, sort_by, order } => {
            let query = TokenQuery { chain_id: chain, count, sort_by, order };
            commands::portfolio::tokens(&api, address.as_deref(), &query, fmt).await
        }
        Commands::Profile { address } => commands::portfolio::profile(&api, address.as_deref(), fmt).await,
        Commands::Activities { address, chain, limit } => {
            commands::portfolio::activities(&api, address.as_deref(), chain, limit, fmt)
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::show(fmt),
            ConfigAction::Path => commands::config::path(),
            ConfigAction::Init => commands::config::init(),
        },
    };

    if let Err(e) = &result {
        if fmt != OutputFormat::Table {
            let code = e.downcast_ref::<FolioError>().map_or("UNKNOWN", FolioError::code);
            render_error(fmt, code, &format!("{e:#}"))?;
            std::process::exit(1);
        }
    }
    result
}
