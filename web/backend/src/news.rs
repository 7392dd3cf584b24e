//! Music news: NewsAPI when a key is configured, otherwise the NME music RSS feed.

use crate::error::{ConfigError, ProviderError};
use moka::future::Cache;
use regex::Regex;
use reqwest::Client;
use rss::{Channel, Item};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_NEWS_FEED_URL: &str = "https://www.nme.com/news/music/feed";
pub const DEFAULT_NEWS_API_BASE_URL: &str = "https://newsapi.org";

const NEWS_KEY: &str = "news";
const DEFAULT_AUTHOR: &str = "NME Staff";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewsSource {
    pub id: String,
    pub name: String,
}

/// Article in the NewsAPI shape, so both sources render the same way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsArticle {
    pub source: NewsSource,
    pub author: String,
    pub title: String,
    pub description: String,
    pub url: Option<String>,
    pub url_to_image: String,
    pub published_at: Option<String>,
    pub categories: Vec<String>,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewsFeed {
    pub status: &'static str,
    pub source: &'static str,
    pub articles: Vec<NewsArticle>,
}

impl NewsFeed {
    fn live(articles: Vec<NewsArticle>) -> Self {
        Self {
            status: "ok",
            source: "rss-live",
            articles,
        }
    }

    fn failed() -> Self {
        Self {
            status: "error",
            source: "rss-failed",
            articles: Vec::new(),
        }
    }
}

/// Turns an RSS channel into articles. Items without an inline image are dropped.
pub struct FeedParser {
    image: Regex,
    tags: Regex,
}

impl FeedParser {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            image: Regex::new(r#"<img[^>]+src="([^">]+)""#)?,
            tags: Regex::new(r"<[^>]*>")?,
        })
    }

    pub fn parse(&self, xml: &[u8]) -> Result<Vec<NewsArticle>, ProviderError> {
        let channel =
            Channel::read_from(xml).map_err(|err| ProviderError::Decode(err.to_string()))?;
        Ok(channel
            .items()
            .iter()
            .filter_map(|item| self.article(item))
            .collect())
    }

    fn article(&self, item: &Item) -> Option<NewsArticle> {
        let content = item.content().or(item.description()).unwrap_or_default();
        let image = self.image.captures(content)?.get(1)?.as_str().to_string();

        let author = item
            .dublin_core_ext()
            .and_then(|dc| dc.creators().first().map(String::as_str))
            .or(item.author())
            .unwrap_or(DEFAULT_AUTHOR);

        Some(NewsArticle {
            source: NewsSource {
                id: "nme".to_string(),
                name: "NME".to_string(),
            },
            author: author.to_string(),
            title: item.title().unwrap_or_default().to_string(),
            description: self.snippet(content),
            url: item.link().map(str::to_string),
            url_to_image: image,
            published_at: item.pub_date().map(str::to_string),
            categories: item
                .categories()
                .iter()
                .map(|category| category.name().to_string())
                .collect(),
            content: content.to_string(),
        })
    }

    /// Plain-text version of the HTML body.
    fn snippet(&self, html: &str) -> String {
        self.tags
            .replace_all(html, " ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// News for the `/api/news` route, cached for an hour.
pub struct NewsClient {
    client: Client,
    feed_url: String,
    api_base_url: String,
    api_key: Option<String>,
    parser: FeedParser,
    cache: Cache<&'static str, Value>,
}

impl NewsClient {
    pub fn new(
        feed_url: impl Into<String>,
        api_base_url: impl Into<String>,
        api_key: Option<String>,
    ) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .user_agent(concat!("melograph/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(10))
            .build()?;

        let cache = Cache::builder()
            .max_capacity(8)
            .time_to_live(Duration::from_secs(60 * 60))
            .build();

        Ok(Self {
            client,
            feed_url: feed_url.into(),
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
            api_key,
            parser: FeedParser::new()?,
            cache,
        })
    }

    /// The NewsAPI response verbatim, or a [`NewsFeed`] built from the RSS
    /// feed. A failed or image-less feed yields an `rss-failed` body rather
    /// than an error, and is not cached.
    pub async fn latest(&self) -> Result<Value, ProviderError> {
        if let Some(cached) = self.cache.get(NEWS_KEY).await {
            debug!("serving news from cache");
            return Ok(cached);
        }

        let body = match &self.api_key {
            Some(key) => self.fetch_news_api(key).await?,
            None => match self.fetch_feed().await {
                Ok(articles) if !articles.is_empty() => {
                    serde_json::to_value(NewsFeed::live(articles))?
                }
                Ok(_) => {
                    warn!(url = %self.feed_url, "news feed had no illustrated articles");
                    return Ok(serde_json::to_value(NewsFeed::failed())?);
                }
                Err(err) => {
                    warn!(url = %self.feed_url, error = %err, "news feed fetch failed");
                    return Ok(serde_json::to_value(NewsFeed::failed())?);
                }
            },
        };

        self.cache.insert(NEWS_KEY, body.clone()).await;
        Ok(body)
    }

    async fn fetch_feed(&self) -> Result<Vec<NewsArticle>, ProviderError> {
        let response = self.client.get(&self.feed_url).send().await?;
        if !response.status().is_success() {
            return Err(ProviderError::from_status(response.status()));
        }

        let xml = response.bytes().await?;
        self.parser.parse(&xml)
    }

    async fn fetch_news_api(&self, key: &str) -> Result<Value, ProviderError> {
        let url = format!(
            "{}/v2/everything?q=music&sortBy=publishedAt&language=en&apiKey={}",
            self.api_base_url,
            urlencoding::encode(key)
        );

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(ProviderError::from_status(response.status()));
        }
        Ok(response.json().await?)
    }
}
