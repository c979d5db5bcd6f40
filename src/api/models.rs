//! Wire models for the listings endpoint.
//!
//! Only the fields we cache are declared; serde drops the rest. Every
//! numeric field is optional because the API omits them for coins without
//! reliable supply or quote data.

use serde::Deserialize;

use crate::types::CoinSnapshot;

#[derive(Debug, Deserialize)]
pub struct ListingsResponse {
    pub data: Vec<Listing>,
}

#[derive(Debug, Deserialize)]
pub struct Listing {
    pub id: u32,
    pub name: String,
    pub symbol: String,
    #[serde(default)]
    pub circulating_supply: Option<f64>,
    #[serde(default)]
    pub total_supply: Option<f64>,
    #[serde(default)]
    pub max_supply: Option<f64>,
    #[serde(default)]
    pub quote: Quote,
}

#[derive(Debug, Deserialize, Default)]
pub struct Quote {
    #[serde(rename = "USD", default)]
    pub usd: Option<UsdQuote>,
}

#[derive(Debug, Deserialize)]
pub struct UsdQuote {
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub volume_24h: Option<f64>,
    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub percent_change_24h: Option<f64>,
}

impl Listing {
    /// Flatten into a cacheable snapshot, stamped with the page's fetch time.
    pub fn into_snapshot(self, fetched_at: i64) -> CoinSnapshot {
        let usd = self.quote.usd;
        let (price_usd, volume_24h, market_cap, percent_change_24h) = match usd {
            Some(q) => (q.price, q.volume_24h, q.market_cap, q.percent_change_24h),
            None => (None, None, None, None),
        };
        CoinSnapshot {
            id: self.id,
            name: self.name,
            symbol: self.symbol,
            circulating_supply: self.circulating_supply,
            total_supply: self.total_supply,
            max_supply: self.max_supply,
            price_usd,
            volume_24h,
            market_cap,
            percent_change_24h,
            fetched_at,
        }
    }
}
