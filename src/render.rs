//! Fixed-width console rendering. Nothing clever: `format!` width
//! specifiers and a handful of number helpers.

use chrono::{DateTime, Utc};

use crate::portfolio::PortfolioView;
use crate::store::Transaction;
use crate::types::CoinSnapshot;

/// Dollar amount with precision that follows magnitude (sub-dollar coins
/// need more digits than BTC does).
pub fn fmt_usd(v: Option<f64>) -> String {
    match v {
        Some(v) if v >= 1.0 => format!("${:.2}", v),
        Some(v) => format!("${:.6}", v),
        None => "-".to_string(),
    }
}

/// Large counts (market cap, volume, supply) with a magnitude suffix.
pub fn fmt_big(v: Option<f64>) -> String {
    match v {
        Some(v) if v >= 1e12 => format!("{:.2}T", v / 1e12),
        Some(v) if v >= 1e9 => format!("{:.2}B", v / 1e9),
        Some(v) if v >= 1e6 => format!("{:.2}M", v / 1e6),
        Some(v) if v >= 1e3 => format!("{:.2}K", v / 1e3),
        Some(v) => format!("{:.2}", v),
        None => "-".to_string(),
    }
}

pub fn fmt_pct(v: Option<f64>) -> String {
    match v {
        Some(v) => format!("{:+.2}%", v),
        None => "-".to_string(),
    }
}

fn fmt_ts(epoch_s: i64) -> String {
    match DateTime::<Utc>::from_timestamp(epoch_s, 0) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => format!("@{epoch_s}"),
    }
}

pub fn print_ticker_table(snapshots: &[CoinSnapshot]) {
    if snapshots.is_empty() {
        println!("no ticker data yet (first fetch still in flight)");
        return;
    }
    println!(
        "{:>5}  {:<20} {:<8} {:>14} {:>9} {:>10} {:>10}",
        "id", "name", "symbol", "price", "24h", "mkt cap", "volume"
    );
    for s in snapshots {
        println!(
            "{:>5}  {:<20} {:<8} {:>14} {:>9} {:>10} {:>10}",
            s.id,
            truncate(&s.name, 20),
            s.symbol,
            fmt_usd(s.price_usd),
            fmt_pct(s.percent_change_24h),
            fmt_big(s.market_cap),
            fmt_big(s.volume_24h),
        );
    }
}

pub fn print_coin_detail(s: &CoinSnapshot) {
    println!("{} ({})  [id {}]", s.name, s.symbol, s.id);
    println!("  price:              {}", fmt_usd(s.price_usd));
    println!("  24h change:         {}", fmt_pct(s.percent_change_24h));
    println!("  market cap:         {}", fmt_big(s.market_cap));
    println!("  24h volume:         {}", fmt_big(s.volume_24h));
    println!("  circulating supply: {}", fmt_big(s.circulating_supply));
    println!("  total supply:       {}", fmt_big(s.total_supply));
    println!("  max supply:         {}", fmt_big(s.max_supply));
    println!("  fetched:            {}", fmt_ts(s.fetched_at));
}

pub fn print_portfolio(view: &PortfolioView) {
    if view.positions.is_empty() {
        println!("portfolio is empty (try: buy BTC 0.1)");
        return;
    }
    println!(
        "{:<8} {:>14} {:>14} {:>14} {:>14}",
        "symbol", "quantity", "avg buy", "price", "value"
    );
    for p in &view.positions {
        println!(
            "{:<8} {:>14.6} {:>14} {:>14} {:>14}",
            p.symbol,
            p.quantity,
            fmt_usd(p.avg_buy_price),
            fmt_usd(p.price_usd),
            fmt_usd(p.value_usd),
        );
    }
    println!("{:<8} {:>14} {:>14} {:>14} {:>14}", "", "", "", "total", fmt_usd(Some(view.total_usd)));
    if view.unpriced > 0 {
        println!("({} position(s) not priced yet)", view.unpriced);
    }
}

pub fn print_transactions(txs: &[Transaction]) {
    if txs.is_empty() {
        println!("no transactions recorded");
        return;
    }
    println!(
        "{:<23} {:<5} {:<8} {:>14} {:>14}",
        "when", "kind", "symbol", "quantity", "unit price"
    );
    for tx in txs {
        println!(
            "{:<23} {:<5} {:<8} {:>14.6} {:>14}",
            fmt_ts(tx.created_at),
            tx.kind.as_str(),
            tx.symbol,
            tx.quantity,
            fmt_usd(Some(tx.price_usd)),
        );
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usd_precision_follows_magnitude() {
        assert_eq!(fmt_usd(Some(50_123.456)), "$50123.46");
        assert_eq!(fmt_usd(Some(0.00012345)), "$0.000123");
        assert_eq!(fmt_usd(None), "-");
    }

    #[test]
    fn big_numbers_get_suffixes() {
        assert_eq!(fmt_big(Some(1_910_000_000_000.0)), "1.91T");
        assert_eq!(fmt_big(Some(2_500_000_000.0)), "2.50B");
        assert_eq!(fmt_big(Some(21_000_000.0)), "21.00M");
        assert_eq!(fmt_big(Some(950.0)), "950.00");
        assert_eq!(fmt_big(None), "-");
    }

    #[test]
    fn truncate_handles_any_width() {
        assert_eq!(truncate("Bitcoin", 20), "Bitcoin");
        assert_eq!(truncate("Wrapped Bitcoin Cash", 10), "Wrapped B…");
        assert_eq!(truncate("BTC", 1), "…");
        assert_eq!(truncate("BTC", 0), "…");
        assert_eq!(truncate("", 0), "");
    }

    #[test]
    fn pct_is_signed() {
        assert_eq!(fmt_pct(Some(3.2)), "+3.20%");
        assert_eq!(fmt_pct(Some(-0.5)), "-0.50%");
    }
}
