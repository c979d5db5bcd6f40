pub mod client;
pub mod errors;
pub mod models;

use async_trait::async_trait;

use crate::api::errors::FetchError;
use crate::types::CoinSnapshot;

/// A source of coin listings, one window at a time.
///
/// `offset` is 0-based within the tracked universe; at most `limit`
/// snapshots come back, fewer when the window runs past the end of what the
/// source serves. All snapshots in one call share one fetch timestamp.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_window(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<CoinSnapshot>, FetchError>;
}
