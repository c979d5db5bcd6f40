use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use std::env;
use std::sync::Arc;

use cointrack::api::client::ListingsClient;
use cointrack::commands;
use cointrack::config::Config;
use cointrack::refresh::RefreshLoop;
use cointrack::state::TickerCache;
use cointrack::store::Store;
use cointrack::types::RefreshEvent;

#[derive(Debug, Parser)]
#[command(name = "cointrack", about = "CLI crypto portfolio tracker")]
struct Cli {
    /// How many coins to track, by market-cap rank.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    coins: Option<u64>,

    /// Coins fetched per API request.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    page_size: Option<u64>,

    /// Path to the transaction database.
    #[arg(long)]
    db: Option<String>,

    /// Listings API base URL (override for testing).
    #[arg(long)]
    api_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Basic logging: set RUST_LOG=info (or debug) to see output.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let mut cfg = Config::default();
    if let Some(coins) = cli.coins {
        cfg.total_coins = coins as usize;
    }
    if let Some(page_size) = cli.page_size {
        cfg.page_size = page_size as usize;
    }
    if let Some(db) = cli.db {
        cfg.db_path = db;
    }
    if let Some(api_url) = cli.api_url {
        cfg.api_base_url = api_url;
    }

    let api_key = env::var("CMC_API_KEY").context("CMC_API_KEY not set (add it to .env)")?;

    let store = Store::open(&cfg.db_path)?;
    let cache = TickerCache::new();
    let client = Arc::new(ListingsClient::new(&cfg.api_base_url, &api_key));

    let refresh = RefreshLoop::new(&cfg, cache.clone(), client);

    // Log-only subscriber: announce once when every tracked coin is cached.
    {
        let mut events = refresh.subscribe();
        tokio::spawn(async move {
            while let Some(ev) = events.recv().await {
                match ev {
                    RefreshEvent::WindowUpdated { low, high } => {
                        debug!(low, high, "ticker window updated");
                    }
                    RefreshEvent::CacheReady => {
                        println!("(price data loaded for all tracked coins)");
                    }
                }
            }
        });
    }

    refresh.start()?;

    // REPL runs on the main task until quit/EOF.
    commands::run_repl(cache, store).await?;

    refresh.stop();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_counts_are_rejected_at_the_flag() {
        assert!(Cli::try_parse_from(["cointrack", "--coins", "0"]).is_err());
        assert!(Cli::try_parse_from(["cointrack", "--page-size", "0"]).is_err());
    }

    #[test]
    fn positive_counts_parse() {
        let cli = Cli::try_parse_from(["cointrack", "--coins", "50", "--page-size", "10"]).unwrap();
        assert_eq!(cli.coins, Some(50));
        assert_eq!(cli.page_size, Some(10));
    }
}
