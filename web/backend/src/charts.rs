use crate::error::ProviderError;
use moka::future::Cache;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_APPLE_RSS_BASE_URL: &str = "https://rss.applemarketingtools.com";

const TOP_SONGS_PATH: &str = "/api/v2/us/music/most-played/100/songs.json";
const TOP_SONGS_KEY: &str = "top_songs";

/// Apple Marketing Tools chart feed, cached for an hour.
pub struct ChartClient {
    client: Client,
    base_url: String,
    cache: Cache<&'static str, Value>,
}

impl ChartClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        let cache = Cache::builder()
            .max_capacity(8)
            .time_to_live(Duration::from_secs(60 * 60))
            .build();

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            cache,
        })
    }

    pub async fn top_songs(&self) -> Result<Value, ProviderError> {
        if let Some(cached) = self.cache.get(TOP_SONGS_KEY).await {
            debug!("serving chart from cache");
            return Ok(cached);
        }

        let url = format!("{}{}", self.base_url, TOP_SONGS_PATH);
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(ProviderError::from_status(response.status()));
        }

        let body: Value = response.json().await?;
        self.cache.insert(TOP_SONGS_KEY, body.clone()).await;
        Ok(body)
    }
}
