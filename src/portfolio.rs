//! Valuation of stored holdings against the live ticker cache.

use crate::state::TickerCache;
use crate::store::Holding;

#[derive(Debug, Clone, PartialEq)]
pub struct PositionView {
    pub coin_id: u32,
    pub symbol: String,
    pub quantity: f64,
    pub avg_buy_price: Option<f64>,
    /// Current unit price, `None` while the coin's window has not been
    /// fetched yet (or the API served no price for it).
    pub price_usd: Option<f64>,
    pub value_usd: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioView {
    pub positions: Vec<PositionView>,
    /// Sum over priced positions only.
    pub total_usd: f64,
    /// How many positions are still waiting on price data.
    pub unpriced: usize,
}

/// Pure join of holdings and cache. No staleness tracking: whatever price
/// is cached is the price used.
pub fn value_holdings(holdings: &[Holding], cache: &TickerCache) -> PortfolioView {
    let mut positions = Vec::with_capacity(holdings.len());
    let mut total_usd = 0.0;
    let mut unpriced = 0;

    for h in holdings {
        let price_usd = cache.get(h.coin_id).ok().and_then(|s| s.price_usd);
        let value_usd = price_usd.map(|p| p * h.quantity);
        match value_usd {
            Some(v) => total_usd += v,
            None => unpriced += 1,
        }
        positions.push(PositionView {
            coin_id: h.coin_id,
            symbol: h.symbol.clone(),
            quantity: h.quantity,
            avg_buy_price: h.avg_buy_price,
            price_usd,
            value_usd,
        });
    }

    PortfolioView {
        positions,
        total_usd,
        unpriced,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CoinSnapshot;

    fn snap(id: u32, symbol: &str, price: Option<f64>) -> CoinSnapshot {
        CoinSnapshot {
            id,
            name: symbol.to_string(),
            symbol: symbol.to_string(),
            circulating_supply: None,
            total_supply: None,
            max_supply: None,
            price_usd: price,
            volume_24h: None,
            market_cap: None,
            percent_change_24h: None,
            fetched_at: 0,
        }
    }

    fn holding(coin_id: u32, symbol: &str, quantity: f64) -> Holding {
        Holding {
            coin_id,
            symbol: symbol.to_string(),
            quantity,
            avg_buy_price: None,
        }
    }

    #[test]
    fn totals_cover_only_priced_positions() {
        let cache = TickerCache::new();
        cache.merge_window(&[snap(1, "BTC", Some(50_000.0)), snap(3, "XYZ", None)]);

        let holdings = vec![
            holding(1, "BTC", 0.5),     // priced
            holding(2, "ETH", 10.0),    // not cached yet
            holding(3, "XYZ", 100.0),   // cached but no price
        ];
        let view = value_holdings(&holdings, &cache);

        assert_eq!(view.positions.len(), 3);
        assert_eq!(view.positions[0].value_usd, Some(25_000.0));
        assert_eq!(view.positions[1].value_usd, None);
        assert_eq!(view.positions[2].value_usd, None);
        assert_eq!(view.total_usd, 25_000.0);
        assert_eq!(view.unpriced, 2);
    }

    #[test]
    fn empty_holdings_value_to_zero() {
        let cache = TickerCache::new();
        let view = value_holdings(&[], &cache);
        assert!(view.positions.is_empty());
        assert_eq!(view.total_usd, 0.0);
        assert_eq!(view.unpriced, 0);
    }
}
