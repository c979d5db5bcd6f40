/// Runtime tuning for the tracker.
///
/// Defaults are reasonable for the free CoinMarketCap tier (rate limited,
/// so we rest between full passes rather than hammering the API).
#[derive(Debug, Clone)]
pub struct Config {
    // How many coins we track, by market-cap rank. Fixed for the process
    // lifetime; the cache never shrinks below what was merged.
    pub total_coins: usize,

    // Coins fetched per request. The API caps page size well above this;
    // smaller pages keep individual requests cheap.
    pub page_size: usize,

    // Delay before retrying the same window after a failed fetch.
    // Fixed, no backoff: the upstream either recovers or it doesn't,
    // and stale-but-served beats clever.
    pub fetch_retry_ms: u64,

    // Rest between full passes over the universe. This dominates request
    // rate: requests per hour ~= ceil(total/page_size) * 3600 / cycle_rest_s.
    pub cycle_rest_s: u64,

    pub api_base_url: String,

    // SQLite file for the transaction log.
    pub db_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            total_coins: 100,
            page_size: 20,
            fetch_retry_ms: 5_000,
            cycle_rest_s: 300,
            api_base_url: "https://pro-api.coinmarketcap.com".to_string(),
            db_path: "cointrack.db".to_string(),
        }
    }
}
