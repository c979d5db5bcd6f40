/// Latest known market data for one coin, as of one fetch.
///
/// Every snapshot in a page shares the same `fetched_at` (stamped once per
/// page by the API client). The refresh loop is the only writer, so a
/// snapshot for a given `id` always replaces an older one.
#[derive(Debug, Clone, PartialEq)]
pub struct CoinSnapshot {
    /// Stable positive identifier assigned by the listings API. Cache key.
    pub id: u32,
    pub name: String,
    pub symbol: String,

    // The API omits any of these for newer / thinly traded coins.
    pub circulating_supply: Option<f64>,
    pub total_supply: Option<f64>,
    pub max_supply: Option<f64>,
    pub price_usd: Option<f64>,
    pub volume_24h: Option<f64>,
    pub market_cap: Option<f64>,
    pub percent_change_24h: Option<f64>,

    // UTC epoch seconds
    pub fetched_at: i64,
}

/// Notifications pushed from the refresh loop to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshEvent {
    /// A window of coins was fetched and merged. `low..=high` are coin
    /// offsets within the tracked universe (inclusive).
    WindowUpdated { low: usize, high: usize },
    /// The first full pass over the tracked universe completed; every
    /// tracked coin now has a cached snapshot. Fires once per process.
    CacheReady,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxKind {
    Buy,
    Sell,
}

impl TxKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TxKind::Buy => "buy",
            TxKind::Sell => "sell",
        }
    }

    pub fn parse(s: &str) -> Option<TxKind> {
        match s {
            "buy" => Some(TxKind::Buy),
            "sell" => Some(TxKind::Sell),
            _ => None,
        }
    }
}
