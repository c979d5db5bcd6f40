use chrono::Utc;
use reqwest::Client;

use crate::api::errors::FetchError;
use crate::api::models::ListingsResponse;
use crate::api::PageFetcher;
use crate::types::CoinSnapshot;

const LISTINGS_LATEST: &str = "/v1/cryptocurrency/listings/latest";
const API_KEY_HEADER: &str = "X-CMC_PRO_API_KEY";

/// HTTP client for the CoinMarketCap-style listings API.
///
/// One instance per process; `reqwest::Client` pools connections internally.
pub struct ListingsClient {
    http_client: Client,
    base_url: String,
    api_key: String,
}

impl ListingsClient {
    pub fn new(base_url: &str, api_key: &str) -> ListingsClient {
        ListingsClient {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Fetch up to `limit` listings starting at 0-based `offset`.
    ///
    /// The remote API's `start` parameter is 1-based rank; the translation
    /// lives here so the rest of the program only ever sees offsets.
    pub async fn listings_window(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<CoinSnapshot>, FetchError> {
        let url = format!(
            "{}{}?start={}&limit={}",
            self.base_url,
            LISTINGS_LATEST,
            offset + 1,
            limit
        );

        let resp = self
            .http_client
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::BadStatus(status));
        }

        let body = resp.text().await?;
        let parsed: ListingsResponse = serde_json::from_str(&body)?;

        if parsed.data.is_empty() && offset > 0 {
            // Past the end of what the API serves; the cursor math should
            // keep us inside the universe, so surface it as a fetch error.
            return Err(FetchError::UnknownWindow { offset });
        }

        // One timestamp for the whole page; every snapshot in it shares it.
        let fetched_at = Utc::now().timestamp();
        Ok(parsed
            .data
            .into_iter()
            .map(|l| l.into_snapshot(fetched_at))
            .collect())
    }
}

#[async_trait::async_trait]
impl PageFetcher for ListingsClient {
    async fn fetch_window(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<CoinSnapshot>, FetchError> {
        self.listings_window(offset, limit).await
    }
}
