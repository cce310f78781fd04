//! Scalper CLI: run a trading cycle, check liquidity, show the account.
//!
//! Commands:
//! - `run`: load candles, build the series table, write the dump, gate transitions
//! - `liquidity`: summarise the last few one-minute candles
//! - `account`: list non-zero balances (needs credentials)
//!
//! Logging goes to stderr through `tracing`; set `RUST_LOG` to change the level.

mod chart;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use scalper_core::config::{Credentials, TraderConfig};
use scalper_core::cycle::{run_cycle, CycleReport};
use scalper_core::data::{check_liquidity, MarketData, SyntheticMarket, DEFAULT_LIQUIDITY_CANDLES};
use scalper_core::exchange::{AccountSummary, BinanceClient};
use scalper_core::orders::{OrderGateway, PaperBroker};

#[derive(Parser)]
#[command(
    name = "scalper",
    about = "Scalper CLI: intraday crypto signal engine"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one trading cycle for the configured symbol.
    Run {
        /// Path to a TOML config file. Defaults apply when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Override the configured symbol.
        #[arg(long)]
        symbol: Option<String>,

        /// Route orders to the paper broker regardless of the config.
        #[arg(long, default_value_t = false)]
        dry_run: bool,

        /// Use the seeded synthetic market instead of the exchange (implies --dry-run).
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// Seed for the synthetic market.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Draw the close / stop-loss chart in the terminal.
        #[arg(long, default_value_t = false)]
        plot: bool,

        /// Print the cycle report as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Summarise recent one-minute volume and taker flow.
    Liquidity {
        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Override the configured symbol.
        #[arg(long)]
        symbol: Option<String>,

        /// Number of one-minute candles to inspect.
        #[arg(long, default_value_t = DEFAULT_LIQUIDITY_CANDLES)]
        candles: usize,

        /// Use the seeded synthetic market.
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// Seed for the synthetic market.
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
    /// Show non-zero account balances.
    Account {
        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            symbol,
            dry_run,
            synthetic,
            seed,
            plot,
            json,
        } => run_cmd(config.as_deref(), symbol, dry_run, synthetic, seed, plot, json),
        Commands::Liquidity {
            config,
            symbol,
            candles,
            synthetic,
            seed,
        } => liquidity_cmd(config.as_deref(), symbol, candles, synthetic, seed),
        Commands::Account { config } => account_cmd(config.as_deref()),
    }
}

fn load_config(path: Option<&Path>, symbol: Option<String>) -> Result<TraderConfig> {
    let mut config = match path {
        Some(path) => TraderConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => TraderConfig::default(),
    };
    if let Some(symbol) = symbol {
        config.market.symbol = symbol;
        config.validate()?;
    }
    Ok(config)
}

fn exchange_client(config: &TraderConfig, credentials: Option<Credentials>) -> Result<BinanceClient> {
    BinanceClient::new(&config.market, credentials).context("creating exchange client")
}

fn run_cmd(
    config_path: Option<&Path>,
    symbol: Option<String>,
    dry_run: bool,
    synthetic: bool,
    seed: u64,
    plot: bool,
    json: bool,
) -> Result<()> {
    let mut config = load_config(config_path, symbol)?;
    if dry_run || synthetic {
        config.trade.dry_run = true;
    }

    let paper = PaperBroker::new();
    let (table, report) = if synthetic {
        let market = SyntheticMarket::new(seed)
            .tracking(config.market.interval, config.market.lookback());
        run_cycle(&market, &paper, &config)?
    } else if config.trade.dry_run {
        let client = exchange_client(&config, Credentials::from_env().ok())?;
        run_cycle(&client, &paper, &config)?
    } else {
        let credentials = Credentials::from_env()
            .context("live trading needs exchange credentials (or pass --dry-run)")?;
        let client = exchange_client(&config, Some(credentials))?;
        print_account(&client.account().context("fetching account")?);
        let gateway: &dyn OrderGateway = &client;
        run_cycle(&client, gateway, &config)?
    };

    if plot {
        chart::plot_inline(&table).context("drawing chart")?;
    }

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("serializing cycle report")?
        );
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &CycleReport) {
    println!();
    println!("=== Cycle: {} ===", report.symbol);
    println!("  Market:       {}", report.market);
    println!("  Gateway:      {}", report.gateway);
    println!("  Candles:      {}", report.candles);
    println!("  Transitions:  {}", report.transitions);
    println!("  Rejected:     {}", report.rejected.len());
    println!("  Orders:       {}", report.orders.len());
    for order in &report.orders {
        let d = &order.decision;
        println!(
            "    #{} {} {} @ row {}: stop-loss {:.2}, risk {:.2}, risk amount {:.4} [{}]",
            order.confirmation.order_id,
            d.side.position_label(),
            d.quantity,
            d.row,
            d.stop_loss,
            d.risk,
            d.risk_amount,
            order.confirmation.status,
        );
    }
    if report.is_idle() {
        println!("  No action required.");
    }
}

fn liquidity_cmd(
    config_path: Option<&Path>,
    symbol: Option<String>,
    candles: usize,
    synthetic: bool,
    seed: u64,
) -> Result<()> {
    let config = load_config(config_path, symbol)?;
    let symbol = &config.market.symbol;

    let synthetic_market;
    let client;
    let market: &dyn MarketData = if synthetic {
        synthetic_market = SyntheticMarket::new(seed);
        &synthetic_market
    } else {
        client = exchange_client(&config, None)?;
        &client
    };

    let report = check_liquidity(market, symbol, candles)
        .with_context(|| format!("checking liquidity for {symbol}"))?;

    println!("=== Liquidity: {symbol} (last {} x 1m) ===", report.candles);
    println!("  Average volume:  {:.4}", report.average_volume);
    println!("  Last volume:     {:.4}", report.last_volume);
    println!("  Volume change:   {:+.4}", report.volume_change);
    match report.taker_buy_ratio {
        Some(ratio) => println!("  Taker buy ratio: {ratio:.6}"),
        None => println!("  Taker buy ratio: n/a"),
    }
    println!(
        "  Liquidity sweep: {}",
        if report.liquidity_sweep { "YES" } else { "no" }
    );
    if report.liquidity_sweep {
        info!(symbol = %symbol, "liquidity sweep detected");
    }
    Ok(())
}

fn account_cmd(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path, None)?;
    let credentials = Credentials::from_env()?;
    let client = exchange_client(&config, Some(credentials))?;
    let account = client.account().context("fetching account")?;
    print_account(&account);
    Ok(())
}

fn print_account(account: &AccountSummary) {
    println!("=== Account ===");
    println!("  Can trade: {}", account.can_trade);
    if account.balances.is_empty() {
        warn!("account holds no balances");
    }
    for balance in &account.balances {
        println!(
            "  {:<8} free {:>18.8}  locked {:>18.8}",
            balance.asset, balance.free, balance.locked
        );
    }
}
