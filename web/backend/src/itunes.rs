use crate::error::ProviderError;
use async_trait::async_trait;
use moka::future::Cache;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_ITUNES_BASE_URL: &str = "https://itunes.apple.com";

/// Entity kinds the resolver searches for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    Song,
    MusicVideo,
}

impl Entity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Entity::Song => "song",
            Entity::MusicVideo => "musicVideo",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ITunesSearchResponse {
    #[serde(default)]
    pub result_count: u32,
    #[serde(default)]
    pub results: Vec<ITunesItem>,
}

/// One search hit. Songs and music videos share this shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ITunesItem {
    #[serde(default)]
    pub track_id: Option<u64>,
    #[serde(default)]
    pub collection_id: Option<u64>,
    #[serde(default)]
    pub artist_name: String,
    #[serde(default)]
    pub track_name: Option<String>,
    #[serde(default)]
    pub primary_genre_name: Option<String>,
    #[serde(default)]
    pub artwork_url_100: Option<String>,
    #[serde(default)]
    pub preview_url: Option<String>,
}

impl ITunesItem {
    /// Collection id when present, otherwise the track id.
    pub fn provider_id(&self) -> Option<String> {
        self.collection_id
            .or(self.track_id)
            .map(|id| id.to_string())
    }
}

/// Text search over a catalog, returning the single best hit.
#[async_trait]
pub trait TrackSearch: Send + Sync {
    async fn search(&self, term: &str, entity: Entity) -> Result<Option<ITunesItem>, ProviderError>;
}

#[async_trait]
impl<T: TrackSearch + ?Sized> TrackSearch for Arc<T> {
    async fn search(
        &self,
        term: &str,
        entity: Entity,
    ) -> Result<Option<ITunesItem>, ProviderError> {
        (**self).search(term, entity).await
    }
}

pub struct ITunesClient {
    client: Client,
    base_url: String,
    lookups: Cache<String, Value>,
}

impl ITunesClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(concat!("melograph/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(10))
            .build()?;

        let lookups = Cache::builder()
            .max_capacity(1_000)
            .time_to_live(Duration::from_secs(60 * 60))
            .build();

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            lookups,
        })
    }

    /// Raw `/lookup?id=` passthrough, cached for an hour.
    pub async fn lookup(&self, id: &str) -> Result<Value, ProviderError> {
        if let Some(cached) = self.lookups.get(id).await {
            return Ok(cached);
        }

        let url = format!("{}/lookup?id={}", self.base_url, urlencoding::encode(id));
        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::from_status(response.status()));
        }

        let body: Value = response.json().await?;
        self.lookups.insert(id.to_string(), body.clone()).await;
        Ok(body)
    }
}

#[async_trait]
impl TrackSearch for ITunesClient {
    async fn search(
        &self,
        term: &str,
        entity: Entity,
    ) -> Result<Option<ITunesItem>, ProviderError> {
        let url = format!(
            "{}/search?term={}&entity={}&limit=1",
            self.base_url,
            urlencoding::encode(term),
            entity.as_str()
        );

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::from_status(status));
        }

        let body: ITunesSearchResponse = response.json().await?;
        debug!(term, entity = entity.as_str(), hits = body.result_count, "itunes search");
        Ok(body.results.into_iter().next())
    }
}
