//! Line-oriented command loop on stdin.
//!
//! Command errors print and continue; only `quit` (or EOF) ends the loop.

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;

use crate::portfolio;
use crate::render;
use crate::state::TickerCache;
use crate::store::{Store, Transaction};
use crate::types::TxKind;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Top(usize),
    Coin(String),
    Buy { symbol: String, quantity: f64 },
    Sell { symbol: String, quantity: f64 },
    Portfolio,
    Transactions,
    Undo,
    Help,
    Quit,
    Empty,
}

pub fn parse(line: &str) -> Result<Command, String> {
    let mut parts = line.split_whitespace();
    let Some(cmd) = parts.next() else {
        return Ok(Command::Empty);
    };
    let args: Vec<&str> = parts.collect();

    match (cmd.to_ascii_lowercase().as_str(), args.as_slice()) {
        ("top", []) => Ok(Command::Top(10)),
        ("top", [n]) => n
            .parse::<usize>()
            .ok()
            .filter(|&n| n > 0)
            .map(Command::Top)
            .ok_or_else(|| format!("top: '{n}' is not a positive count")),
        ("coin", [symbol]) => Ok(Command::Coin(symbol.to_string())),
        ("buy", [symbol, qty]) => parse_qty(qty).map(|quantity| Command::Buy {
            symbol: symbol.to_string(),
            quantity,
        }),
        ("sell", [symbol, qty]) => parse_qty(qty).map(|quantity| Command::Sell {
            symbol: symbol.to_string(),
            quantity,
        }),
        ("portfolio", []) | ("pf", []) => Ok(Command::Portfolio),
        ("tx", []) | ("history", []) => Ok(Command::Transactions),
        ("undo", []) => Ok(Command::Undo),
        ("help", []) => Ok(Command::Help),
        ("quit", []) | ("exit", []) => Ok(Command::Quit),
        _ => Err(format!("unrecognized command '{line}' (try 'help')")),
    }
}

fn parse_qty(s: &str) -> Result<f64, String> {
    match s.parse::<f64>() {
        Ok(q) if q > 0.0 && q.is_finite() => Ok(q),
        _ => Err(format!("'{s}' is not a positive quantity")),
    }
}

fn print_help() {
    println!("commands:");
    println!("  top [n]            top n tracked coins by rank (default 10)");
    println!("  coin <symbol>      full snapshot for one coin");
    println!("  buy <symbol> <qty> record a buy at the current cached price");
    println!("  sell <symbol> <qty> record a sell at the current cached price");
    println!("  portfolio          holdings valued at cached prices");
    println!("  tx                 transaction history");
    println!("  undo               remove the most recent transaction");
    println!("  quit               exit");
}

/// Run one parsed command. Returns false when the REPL should exit.
fn execute(cmd: Command, cache: &TickerCache, store: &Store) -> Result<bool> {
    match cmd {
        Command::Empty => {}
        Command::Quit => return Ok(false),
        Command::Help => print_help(),
        Command::Top(n) => {
            let mut coins = cache.sorted_by_id();
            coins.truncate(n);
            render::print_ticker_table(&coins);
        }
        Command::Coin(symbol) => match cache.snapshot_of(&symbol) {
            Some(snap) => render::print_coin_detail(&snap),
            None => println!("'{symbol}' is not cached (yet?) — try 'top' to see what is"),
        },
        Command::Buy { symbol, quantity } => {
            trade(TxKind::Buy, &symbol, quantity, cache, store)?;
        }
        Command::Sell { symbol, quantity } => {
            trade(TxKind::Sell, &symbol, quantity, cache, store)?;
        }
        Command::Portfolio => {
            let holdings = store.holdings()?;
            render::print_portfolio(&portfolio::value_holdings(&holdings, cache));
        }
        Command::Transactions => {
            render::print_transactions(&store.transactions()?);
        }
        Command::Undo => match store.undo_last()? {
            Some(tx) => println!(
                "removed: {} {} {} @ {}",
                tx.kind.as_str(),
                tx.quantity,
                tx.symbol,
                render::fmt_usd(Some(tx.price_usd))
            ),
            None => println!("nothing to undo"),
        },
    }
    Ok(true)
}

fn trade(
    kind: TxKind,
    symbol: &str,
    quantity: f64,
    cache: &TickerCache,
    store: &Store,
) -> Result<()> {
    let Some(snap) = cache.snapshot_of(symbol) else {
        println!("'{symbol}' has no cached data yet; wait for the next refresh");
        return Ok(());
    };
    let Some(price) = snap.price_usd else {
        println!("no price available for {} right now", snap.symbol);
        return Ok(());
    };

    if kind == TxKind::Sell {
        let held = store.position(snap.id)?;
        if held < quantity {
            println!("cannot sell {quantity} {}: only {held} held", snap.symbol);
            return Ok(());
        }
    }

    let tx = Transaction::new(kind, snap.id, &snap.symbol, quantity, price);
    store.record(&tx)?;
    println!(
        "{} {} {} @ {} = {}",
        tx.kind.as_str(),
        tx.quantity,
        tx.symbol,
        render::fmt_usd(Some(price)),
        render::fmt_usd(Some(price * quantity)),
    );
    Ok(())
}

pub async fn run_repl(cache: TickerCache, store: Store) -> Result<()> {
    println!("cointrack ready — 'help' lists commands");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let keep_going = match parse(&line) {
            Ok(cmd) => match execute(cmd, &cache, &store) {
                Ok(keep) => keep,
                Err(e) => {
                    // Store errors (disk full, locked db) shouldn't kill the
                    // session.
                    warn!(error = %e, "command failed");
                    println!("command failed: {e}");
                    true
                }
            },
            Err(msg) => {
                println!("{msg}");
                true
            }
        };
        if !keep_going {
            break;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_basic_commands() {
        assert_eq!(parse("top"), Ok(Command::Top(10)));
        assert_eq!(parse("top 25"), Ok(Command::Top(25)));
        assert_eq!(parse("  portfolio  "), Ok(Command::Portfolio));
        assert_eq!(parse("coin btc"), Ok(Command::Coin("btc".to_string())));
        assert_eq!(parse("QUIT"), Ok(Command::Quit));
        assert_eq!(parse(""), Ok(Command::Empty));
    }

    #[test]
    fn parses_trades() {
        assert_eq!(
            parse("buy BTC 0.5"),
            Ok(Command::Buy {
                symbol: "BTC".to_string(),
                quantity: 0.5
            })
        );
        assert_eq!(
            parse("sell eth 10"),
            Ok(Command::Sell {
                symbol: "eth".to_string(),
                quantity: 10.0
            })
        );
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse("top zero").is_err());
        assert!(parse("top 0").is_err());
        assert!(parse("buy BTC").is_err());
        assert!(parse("buy BTC -1").is_err());
        assert!(parse("sell BTC nan").is_err());
        assert!(parse("frobnicate").is_err());
    }
}
