use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use walletfolio::config::{default_config_path, ResolvedConfig};
use walletfolio::duration::format_duration;
use walletfolio::format::DisplayFormat;
use walletfolio::{AssetRegistry, PortfolioValuation, WalletValuationEngine};

#[derive(Parser)]
#[command(name = "walletfolio")]
#[command(about = "USD valuation of a Solana wallet")]
struct Cli {
    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines on stderr
    #[arg(long)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Value a wallet's native and allow-listed token holdings
    Balance {
        /// Base58 wallet address
        address: String,

        /// Print the valuation as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the recognized tokens
    Tokens,
    /// Show current configuration
    Config,
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(layer.json())
            .init();
    } else {
        tracing_subscriber::registry().with(filter).with(layer).init();
    }
}

fn print_valuation(valuation: &PortfolioValuation, display: DisplayFormat) {
    println!("Wallet: {}", valuation.wallet_address);
    println!("As of:  {}", valuation.as_of.to_rfc3339());
    println!();
    println!(
        "{:<10} {:>24} {:>16}",
        "SOL",
        display.quantity(valuation.native_quantity),
        display.usd(valuation.native_usd_value)
    );
    for holding in &valuation.holdings {
        println!(
            "{:<10} {:>24} {:>16}",
            holding.symbol,
            display.quantity(holding.quantity),
            display.usd(holding.usd_value)
        );
    }
    println!();
    println!("{:<10} {:>41}", "Total", display.usd(valuation.total_usd_value));
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let config = ResolvedConfig::load_or_default(&config_path)
        .with_context(|| format!("Failed to load config: {}", config_path.display()))?;

    match cli.command {
        Command::Balance { address, json } => {
            let registry = Arc::new(AssetRegistry::load(&config.allow_list)?);
            let engine = WalletValuationEngine::from_config(&config, registry)?;

            let valuation = engine.get_wallet_balance(&address).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&valuation)?);
            } else {
                print_valuation(&valuation, DisplayFormat::from(&config.display));
            }
        }
        Command::Tokens => {
            let registry = AssetRegistry::load(&config.allow_list)?;
            let mut entries: Vec<_> = registry.all_entries().iter().collect();
            entries.sort_by(|a, b| a.1.symbol.cmp(&b.1.symbol));

            for (mint, info) in entries {
                println!(
                    "{:<10} {:<46} {:>3}  {}",
                    info.symbol, mint, info.precision, info.price_lookup_key
                );
            }
        }
        Command::Config => {
            println!("Config file: {}", config_path.display());
            println!("RPC URL: {}", config.rpc_url);
            println!("Price API: {}", config.price_api_url);
            println!("Request timeout: {}", format_duration(config.request_timeout));
            println!("Allow-list: {}", config.allow_list.display());
            println!("Native price key: {}", config.native_price_key);
            println!("Token programs: {}", config.token_programs.join(", "));
        }
    }

    Ok(())
}
