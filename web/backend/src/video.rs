//! Video-platform lookups: a pinned table, YouTube Data API search, and
//! Invidious mirrors, tried in order until one returns an id.

use crate::call::with_timeout;
use crate::error::ProviderError;
use async_trait::async_trait;
use melograph_core::PinnedVideos;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_YOUTUBE_API_BASE_URL: &str = "https://www.googleapis.com";
pub const DEFAULT_VIDEO_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoMatch {
    pub video_id: String,
    pub source: String,
}

/// "Search for a video id given a text query."
#[async_trait]
pub trait VideoSearch: Send + Sync {
    async fn search(&self, query: &str) -> Result<Option<String>, ProviderError>;

    /// Label recorded on the candidate when this strategy wins.
    fn name(&self) -> &str;
}

#[async_trait]
impl<T: VideoSearch + ?Sized> VideoSearch for Arc<T> {
    async fn search(&self, query: &str) -> Result<Option<String>, ProviderError> {
        (**self).search(query).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

pub struct PinnedVideoSearch {
    pinned: PinnedVideos,
}

impl PinnedVideoSearch {
    pub fn new(pinned: PinnedVideos) -> Self {
        Self { pinned }
    }
}

#[async_trait]
impl VideoSearch for PinnedVideoSearch {
    async fn search(&self, query: &str) -> Result<Option<String>, ProviderError> {
        Ok(self.pinned.lookup(query).map(str::to_string))
    }

    fn name(&self) -> &str {
        "pinned"
    }
}

#[derive(Debug, Deserialize)]
struct YouTubeSearchResponse {
    #[serde(default)]
    items: Vec<YouTubeSearchItem>,
}

#[derive(Debug, Deserialize)]
struct YouTubeSearchItem {
    id: YouTubeItemId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YouTubeItemId {
    #[serde(default)]
    video_id: Option<String>,
}

/// YouTube Data API v3 `search.list`, restricted to videos.
pub struct YouTubeSearch {
    client: Client,
    base_url: String,
    api_key: String,
}

impl YouTubeSearch {
    pub fn new(client: Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl VideoSearch for YouTubeSearch {
    async fn search(&self, query: &str) -> Result<Option<String>, ProviderError> {
        let url = format!(
            "{}/youtube/v3/search?part=snippet&type=video&maxResults=1&q={}&key={}",
            self.base_url,
            urlencoding::encode(query),
            urlencoding::encode(&self.api_key)
        );

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(ProviderError::from_status(response.status()));
        }

        let body: YouTubeSearchResponse = response.json().await?;
        Ok(body.items.into_iter().find_map(|item| item.id.video_id))
    }

    fn name(&self) -> &str {
        "youtube"
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InvidiousResult {
    #[serde(default)]
    video_id: Option<String>,
}

/// One Invidious instance's `/api/v1/search`.
pub struct InvidiousSearch {
    client: Client,
    base_url: String,
    label: String,
}

impl InvidiousSearch {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let host = base_url
            .split("://")
            .nth(1)
            .unwrap_or(&base_url)
            .to_string();

        Self {
            client,
            label: format!("invidious:{host}"),
            base_url,
        }
    }
}

#[async_trait]
impl VideoSearch for InvidiousSearch {
    async fn search(&self, query: &str) -> Result<Option<String>, ProviderError> {
        let url = format!(
            "{}/api/v1/search?q={}&type=video",
            self.base_url,
            urlencoding::encode(query)
        );

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(ProviderError::from_status(response.status()));
        }

        let results: Vec<InvidiousResult> = response.json().await?;
        Ok(results.into_iter().find_map(|result| result.video_id))
    }

    fn name(&self) -> &str {
        &self.label
    }
}

/// Ordered strategy list. Each strategy gets `per_call_timeout`; the first
/// non-empty id wins.
pub struct VideoChain {
    strategies: Vec<Box<dyn VideoSearch>>,
    per_call_timeout: Duration,
}

impl VideoChain {
    pub fn new(per_call_timeout: Duration) -> Self {
        Self {
            strategies: Vec::new(),
            per_call_timeout,
        }
    }

    pub fn with_strategy(mut self, strategy: impl VideoSearch + 'static) -> Self {
        self.push(Box::new(strategy));
        self
    }

    pub fn push(&mut self, strategy: Box<dyn VideoSearch>) {
        self.strategies.push(strategy);
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.strategies.iter().map(|strategy| strategy.name()).collect()
    }

    pub async fn find(&self, query: &str) -> Option<VideoMatch> {
        for strategy in &self.strategies {
            let outcome = with_timeout(self.per_call_timeout, strategy.search(query)).await;
            match outcome.into_result() {
                Ok(Some(video_id)) if !video_id.is_empty() => {
                    debug!(source = strategy.name(), %video_id, query, "video found");
                    return Some(VideoMatch {
                        video_id,
                        source: strategy.name().to_string(),
                    });
                }
                Ok(_) => debug!(source = strategy.name(), query, "no video"),
                Err(err) => {
                    warn!(source = strategy.name(), query, error = %err, "video search failed")
                }
            }
        }
        None
    }
}
