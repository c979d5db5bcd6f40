use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;

use crate::types::CoinSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheError {
    /// No snapshot has ever been merged for this coin id.
    NotFound(u32),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheError::NotFound(id) => write!(f, "no cached snapshot for coin id {}", id),
        }
    }
}

impl std::error::Error for CacheError {}

/// Shared map of coin id -> latest snapshot.
///
/// The refresh loop is the sole writer; readers (REPL, valuation) run on
/// other tasks concurrently. The DashMap is the only synchronization point:
/// each snapshot is replaced as a whole value, so readers never see a torn
/// one. Entries are only ever replaced, never removed.
#[derive(Clone, Debug)]
pub struct TickerCache {
    coins: Arc<DashMap<u32, CoinSnapshot>>,
}

impl TickerCache {
    pub fn new() -> Self {
        Self {
            coins: Arc::new(DashMap::new()),
        }
    }

    /// True once a snapshot for `id` has ever been merged. Never reverts.
    pub fn contains(&self, id: u32) -> bool {
        self.coins.contains_key(&id)
    }

    pub fn get(&self, id: u32) -> Result<CoinSnapshot, CacheError> {
        self.coins
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or(CacheError::NotFound(id))
    }

    /// Bulk upsert one fetched window. Last write wins per key; the batch
    /// as a whole is not atomic (readers may see it half-applied), which is
    /// fine because each entry is internally consistent.
    pub fn merge_window(&self, snapshots: &[CoinSnapshot]) {
        for snap in snapshots {
            self.coins.insert(snap.id, snap.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.coins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coins.is_empty()
    }

    /// Case-insensitive symbol lookup. Linear over the (small) universe;
    /// first match wins if symbols ever collide.
    pub fn snapshot_of(&self, symbol: &str) -> Option<CoinSnapshot> {
        self.coins
            .iter()
            .find(|entry| entry.value().symbol.eq_ignore_ascii_case(symbol))
            .map(|entry| entry.value().clone())
    }

    /// All cached snapshots ordered by coin id (the API's rank order).
    pub fn sorted_by_id(&self) -> Vec<CoinSnapshot> {
        let mut all: Vec<CoinSnapshot> =
            self.coins.iter().map(|e| e.value().clone()).collect();
        all.sort_by_key(|s| s.id);
        all
    }
}

impl Default for TickerCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(id: u32, symbol: &str, price: f64, fetched_at: i64) -> CoinSnapshot {
        CoinSnapshot {
            id,
            name: format!("coin-{id}"),
            symbol: symbol.to_string(),
            circulating_supply: None,
            total_supply: None,
            max_supply: None,
            price_usd: Some(price),
            volume_24h: None,
            market_cap: None,
            percent_change_24h: None,
            fetched_at,
        }
    }

    #[test]
    fn contains_becomes_true_and_stays_true() {
        let cache = TickerCache::new();
        assert!(!cache.contains(1));

        cache.merge_window(&[snap(1, "BTC", 50_000.0, 100)]);
        assert!(cache.contains(1));

        // Later merges of other windows never evict existing keys.
        cache.merge_window(&[snap(2, "ETH", 3_000.0, 101)]);
        cache.merge_window(&[snap(3, "SOL", 150.0, 102)]);
        assert!(cache.contains(1));
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn get_unknown_id_is_not_found() {
        let cache = TickerCache::new();
        assert_eq!(cache.get(42), Err(CacheError::NotFound(42)));
    }

    #[test]
    fn second_merge_of_same_id_wins() {
        let cache = TickerCache::new();
        cache.merge_window(&[snap(1, "BTC", 50_000.0, 100)]);
        cache.merge_window(&[snap(1, "BTC", 51_250.0, 200)]);

        let got = cache.get(1).unwrap();
        assert_eq!(got.price_usd, Some(51_250.0));
        assert_eq!(got.fetched_at, 200);
    }

    #[test]
    fn merge_is_idempotent() {
        let cache = TickerCache::new();
        let window = vec![snap(1, "BTC", 50_000.0, 100), snap(2, "ETH", 3_000.0, 100)];
        cache.merge_window(&window);
        cache.merge_window(&window);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(2).unwrap().price_usd, Some(3_000.0));
    }

    #[test]
    fn symbol_lookup_ignores_case() {
        let cache = TickerCache::new();
        cache.merge_window(&[snap(1, "BTC", 50_000.0, 100)]);
        assert_eq!(cache.snapshot_of("btc").unwrap().id, 1);
        assert!(cache.snapshot_of("DOGE").is_none());
    }

    #[test]
    fn sorted_by_id_is_rank_order() {
        let cache = TickerCache::new();
        cache.merge_window(&[
            snap(3, "SOL", 150.0, 100),
            snap(1, "BTC", 50_000.0, 100),
            snap(2, "ETH", 3_000.0, 100),
        ]);
        let ids: Vec<u32> = cache.sorted_by_id().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }
}
